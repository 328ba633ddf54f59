mod common;

use common::*;
use invest_ledger::db::entity::Profile;
use invest_ledger::services::settings_service::SignupRewards;
use invest_ledger::services::{ InvestmentService, ReferralService, SettingsService };
use invest_ledger::AppError;
use sea_orm::{ EntityTrait, PaginatorTrait };

#[tokio::test]
async fn test_signup_creates_profile_with_referral_code() {
    let db = setup_db().await;

    let response = signup(&db, "alice").await;

    assert_eq!(response.token.len(), 64);
    assert_eq!(response.profile.username, "alice");
    assert_eq!(response.profile.referral_code.len(), 8);
    assert!(response.profile.referral_code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(response.profile.referred_by, None);
    assert_eq!(response.profile.balance, dec(0));
    assert!(!response.profile.is_admin);

    let session = auth_service(&db).authenticate(&response.token).await.unwrap();
    assert_eq!(session.profile_id, response.profile.id);
}

#[tokio::test]
async fn test_admin_emails_get_admin_role() {
    let db = setup_db().await;
    let auth = auth_service(&db);

    let mut input = signup_input("boss", None);
    input.email = "Admin@Example.com".to_string();
    let response = auth.signup(input).await.unwrap();

    assert!(response.profile.is_admin);
    assert!(auth.authenticate(&response.token).await.unwrap().is_admin);
}

#[tokio::test]
async fn test_signup_rejects_bad_phone_and_password() {
    let db = setup_db().await;
    let auth = auth_service(&db);

    let mut input = signup_input("bob", None);
    input.phone = "071234567".to_string();
    assert!(matches!(auth.signup(input).await, Err(AppError::InvalidInput(_))));

    let mut input = signup_input("bob", None);
    input.confirm_password = "secret2".to_string();
    assert!(matches!(auth.signup(input).await, Err(AppError::InvalidInput(_))));

    assert_eq!(Profile::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_referral_code_creates_nothing() {
    let db = setup_db().await;
    let auth = auth_service(&db);

    let result = auth.signup(signup_input("carol", Some("NOPE1234"))).await;

    match result {
        Err(e @ AppError::InvalidReferralCode) => {
            assert_eq!(e.to_string(), "Invalid referral code.");
        }
        other => panic!("expected invalid referral code, got {:?}", other.map(|r| r.profile.id)),
    }
    assert_eq!(Profile::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_referral_code_is_matched_case_insensitively() {
    let db = setup_db().await;
    let referrer = signup(&db, "dave").await.profile;

    let lowercase = referrer.referral_code.to_lowercase();
    let referred = auth_service(&db)
        .signup(signup_input("erin", Some(&format!("  {}  ", lowercase)))).await
        .unwrap()
        .profile;

    assert_eq!(referred.referred_by.as_deref(), Some(referrer.referral_code.as_str()));

    let referrals = ReferralService::new(db.clone());
    assert!(referrals.validate_referral_code(&lowercase).await.unwrap());
    assert!(!referrals.validate_referral_code("ZZZZZZZZ").await.unwrap());
    assert!(!referrals.validate_referral_code("   ").await.unwrap());
}

#[tokio::test]
async fn test_referral_bonus_credits_referrer() {
    let db = setup_db().await;
    SettingsService::new(db.clone())
        .update_signup_settings(SignupRewards {
            signup_bonus: dec(5),
            referral_bonus: dec(20),
            is_active: true,
        }).await
        .unwrap();

    let referrer = signup(&db, "frank").await.profile;
    assert_eq!(referrer.signup_bonus, dec(5));

    auth_service(&db)
        .signup(signup_input("grace", Some(&referrer.referral_code))).await
        .unwrap();

    assert_eq!(balance_of(&db, referrer.id).await, dec(20));
}

#[tokio::test]
async fn test_inactive_signup_settings_pay_nothing() {
    let db = setup_db().await;
    SettingsService::new(db.clone())
        .update_signup_settings(SignupRewards {
            signup_bonus: dec(5),
            referral_bonus: dec(20),
            is_active: false,
        }).await
        .unwrap();

    let referrer = signup(&db, "heidi").await.profile;
    assert_eq!(referrer.signup_bonus, dec(0));

    auth_service(&db)
        .signup(signup_input("ivan", Some(&referrer.referral_code))).await
        .unwrap();

    assert_eq!(balance_of(&db, referrer.id).await, dec(0));
}

#[tokio::test]
async fn test_duplicate_email_is_a_conflict() {
    let db = setup_db().await;
    signup(&db, "judy").await;

    let mut input = signup_input("judy2", None);
    input.email = "JUDY@example.com".to_string();

    assert!(matches!(
        auth_service(&db).signup(input).await,
        Err(AppError::Conflict(ref message)) if message == "Email is already registered"
    ));

    let mut input = signup_input("judy", None);
    input.email = "other@example.com".to_string();
    assert!(matches!(
        auth_service(&db).signup(input).await,
        Err(AppError::Conflict(ref message)) if message == "Username is already taken"
    ));
}

#[tokio::test]
async fn test_referral_statistics() {
    let db = setup_db().await;
    let referrer = signup(&db, "kate").await.profile;
    let auth = auth_service(&db);

    let investor = auth
        .signup(signup_input("leo", Some(&referrer.referral_code))).await
        .unwrap()
        .profile;
    auth.signup(signup_input("mia", Some(&referrer.referral_code))).await.unwrap();
    signup(&db, "ned").await;

    set_balance(&db, investor.id, 100).await;
    InvestmentService::new(db.clone(), test_config().investment_terms)
        .purchase(investor.id, dec(100)).await
        .unwrap();

    let stats = ReferralService::new(db.clone()).get_referral_statistics(referrer.id).await.unwrap();

    assert_eq!(stats.referral_code, referrer.referral_code);
    assert_eq!(stats.total_referrals, 2);
    assert_eq!(stats.active_investors, 1);

    let leo = stats.referrals
        .iter()
        .find(|r| r.username == "leo")
        .unwrap();
    assert!(leo.has_invested);
    let mia = stats.referrals
        .iter()
        .find(|r| r.username == "mia")
        .unwrap();
    assert!(!mia.has_invested);
}

#[tokio::test]
async fn test_sign_in_and_sign_out() {
    let db = setup_db().await;
    let auth = auth_service(&db);
    signup(&db, "olga").await;

    assert!(matches!(auth.sign_in("olga@example.com", "wrong!").await, Err(AppError::Unauthorized)));
    assert!(matches!(auth.sign_in("nobody@example.com", "secret1").await, Err(AppError::Unauthorized)));

    let session = auth.sign_in("OLGA@example.com", "secret1").await.unwrap();
    assert!(auth.authenticate(&session.token).await.is_ok());

    auth.sign_out(&session.token).await.unwrap();
    assert!(matches!(auth.authenticate(&session.token).await, Err(AppError::Unauthorized)));
}
