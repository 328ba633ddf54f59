//! Balance mutations executed by the store itself.
//!
//! Every change is a single `UPDATE` relative to the stored value, so two
//! sessions spending the same balance can never both succeed.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ prelude::Decimal, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter };
use uuid::Uuid;

use crate::db::entity::{ profile, Profile };
use crate::error::{ AppError, Result };

/// Subtracts `amount` only if the balance covers it.
pub async fn debit<C: ConnectionTrait>(conn: &C, profile_id: Uuid, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidInput("Amount must be positive".to_string()));
    }

    let result = Profile::update_many()
        .col_expr(profile::Column::Balance, Expr::col(profile::Column::Balance).sub(amount))
        .col_expr(profile::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(profile::Column::Id.eq(profile_id))
        .filter(profile::Column::Balance.gte(amount))
        .exec(conn).await?;

    if result.rows_affected == 0 {
        return match Profile::find_by_id(profile_id).one(conn).await? {
            Some(_) => Err(AppError::InsufficientBalance),
            None => Err(AppError::NotFound("Profile".to_string())),
        };
    }

    Ok(())
}

pub async fn credit<C: ConnectionTrait>(conn: &C, profile_id: Uuid, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidInput("Amount must be positive".to_string()));
    }

    let result = Profile::update_many()
        .col_expr(profile::Column::Balance, Expr::col(profile::Column::Balance).add(amount))
        .col_expr(profile::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(profile::Column::Id.eq(profile_id))
        .exec(conn).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Profile".to_string()));
    }

    Ok(())
}
