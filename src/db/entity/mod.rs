pub mod profile;
pub mod session;
pub mod transaction;
pub mod investment;
pub mod notification;
pub mod payment_settings;
pub mod withdrawal_settings;
pub mod signup_settings;

pub use profile::Entity as Profile;
pub use session::Entity as Session;
pub use transaction::Entity as Transaction;
pub use investment::Entity as Investment;
pub use notification::Entity as Notification;
pub use payment_settings::Entity as PaymentSettings;
pub use withdrawal_settings::Entity as WithdrawalSettings;
pub use signup_settings::Entity as SignupSettings;
