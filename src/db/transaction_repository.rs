use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    prelude::Decimal,
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ transaction, Transaction };
use crate::enums::{ TransactionKind, TransactionStatus };
use crate::error::{ AppError, Result };

/// A ledger row about to be written.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub profile_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub network: Option<String>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub transaction_ref: Option<String>,
}

impl NewTransaction {
    pub fn new(
        profile_id: Uuid,
        kind: TransactionKind,
        amount: Decimal,
        status: TransactionStatus
    ) -> Self {
        Self {
            profile_id,
            kind,
            amount,
            status,
            network: None,
            account_name: None,
            account_number: None,
            phone: None,
            email: None,
            transaction_ref: None,
        }
    }
}

pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        new: NewTransaction
    ) -> Result<transaction::Model> {
        if new.amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput("Amount must be positive".to_string()));
        }

        let now = Utc::now();
        let transaction_model = transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            profile_id: Set(new.profile_id),
            kind: Set(new.kind.to_string()),
            amount: Set(new.amount),
            status: Set(new.status.to_string()),
            network: Set(new.network),
            account_name: Set(new.account_name),
            account_number: Set(new.account_number),
            phone: Set(new.phone),
            email: Set(new.email),
            transaction_ref: Set(new.transaction_ref),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let transaction = transaction_model.insert(conn).await?;
        Ok(transaction)
    }

    pub async fn create(&self, new: NewTransaction) -> Result<transaction::Model> {
        Self::insert(&self.db, new).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<transaction::Model> {
        Transaction::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))
    }

    pub async fn find_by_profile_id(
        &self,
        profile_id: Uuid,
        kind: Option<TransactionKind>,
        limit: Option<u64>,
        offset: Option<u64>
    ) -> Result<Vec<transaction::Model>> {
        let mut query = Transaction::find()
            .filter(transaction::Column::ProfileId.eq(profile_id))
            .order_by_desc(transaction::Column::CreatedAt);

        if let Some(kind) = kind {
            query = query.filter(transaction::Column::Kind.eq(kind.as_str()));
        }

        let transactions = query.limit(limit).offset(offset).all(&self.db).await?;

        Ok(transactions)
    }

    pub async fn find_all(
        &self,
        status: Option<TransactionStatus>,
        kind: Option<TransactionKind>
    ) -> Result<Vec<transaction::Model>> {
        let mut query = Transaction::find().order_by_desc(transaction::Column::CreatedAt);

        if let Some(status) = status {
            query = query.filter(transaction::Column::Status.eq(status.as_str()));
        }
        if let Some(kind) = kind {
            query = query.filter(transaction::Column::Kind.eq(kind.as_str()));
        }

        let transactions = query.all(&self.db).await?;

        Ok(transactions)
    }

    /// Moves a pending transaction to `status`. Returns false when the row
    /// was no longer pending.
    pub async fn resolve_pending<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        status: TransactionStatus
    ) -> Result<bool> {
        let result = Transaction::update_many()
            .col_expr(transaction::Column::Status, Expr::value(status.as_str()))
            .col_expr(transaction::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(transaction::Column::Id.eq(id))
            .filter(transaction::Column::Status.eq(TransactionStatus::Pending.as_str()))
            .exec(conn).await?;

        Ok(result.rows_affected == 1)
    }
}
