use std::env;

use sea_orm::prelude::Decimal;

/// Terms applied to every investment purchased.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvestmentTerms {
    pub term_days: i64,
    /// Daily interest rate in percent.
    pub daily_interest_percent: Decimal,
}

impl Default for InvestmentTerms {
    fn default() -> Self {
        Self {
            term_days: 14,
            daily_interest_percent: Decimal::from(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub session_ttl_secs: i64,
    pub settlement_interval_secs: u64,
    pub admin_poll_interval_secs: u64,
    pub investment_terms: InvestmentTerms,
    pub admin_emails: Vec<String>,
    pub functions_key: Option<String>,
}

impl Config {
    /// Defaults for everything except the database.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            session_ttl_secs: 7 * 24 * 3600,
            settlement_interval_secs: 3600,
            admin_poll_interval_secs: 5,
            investment_terms: InvestmentTerms::default(),
            admin_emails: Vec::new(),
            functions_key: None,
        }
    }

    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let mut config = Config::new(env::var("DATABASE_URL")?);

        if let Ok(host) = env::var("SERVER_HOST") {
            config.server_host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            config.server_port = port.parse()?;
        }
        if let Ok(ttl) = env::var("SESSION_TTL_SECS") {
            config.session_ttl_secs = ttl.parse()?;
        }
        if let Ok(interval) = env::var("SETTLEMENT_INTERVAL_SECS") {
            config.settlement_interval_secs = interval.parse()?;
        }
        if let Ok(interval) = env::var("ADMIN_POLL_INTERVAL_SECS") {
            config.admin_poll_interval_secs = interval.parse()?;
        }
        if let Ok(days) = env::var("INVESTMENT_TERM_DAYS") {
            config.investment_terms.term_days = days.parse()?;
        }
        if let Ok(rate) = env::var("DAILY_INTEREST_PERCENT") {
            config.investment_terms.daily_interest_percent = rate.parse()?;
        }
        if let Ok(emails) = env::var("ADMIN_EMAILS") {
            config.admin_emails = Self::parse_email_list(&emails);
        }
        config.functions_key = env::var("FUNCTIONS_KEY").ok().filter(|k| !k.is_empty());

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.session_ttl_secs <= 0 {
            return Err("SESSION_TTL_SECS must be positive".into());
        }
        if self.settlement_interval_secs == 0 {
            return Err("SETTLEMENT_INTERVAL_SECS must be positive".into());
        }
        if self.investment_terms.term_days <= 0 {
            return Err("INVESTMENT_TERM_DAYS must be positive".into());
        }
        if self.investment_terms.daily_interest_percent.is_sign_negative() {
            return Err("DAILY_INTEREST_PERCENT cannot be negative".into());
        }

        Ok(())
    }

    fn parse_email_list(emails: &str) -> Vec<String> {
        emails
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether a signup with this email gets the admin role.
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|e| *e == email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email_list() {
        let emails = Config::parse_email_list(" Admin@Example.com, ,ops@example.com ");
        assert_eq!(emails, vec!["admin@example.com", "ops@example.com"]);
    }

    #[test]
    fn test_admin_email_match_ignores_case() {
        let mut config = Config::new("postgres://localhost/test");
        config.admin_emails = vec!["admin@example.com".to_string()];

        assert!(config.is_admin_email("ADMIN@example.com "));
        assert!(!config.is_admin_email("user@example.com"));
    }

    #[test]
    fn test_default_terms() {
        let config = Config::new("postgres://localhost/test");
        assert_eq!(config.investment_terms.term_days, 14);
        assert_eq!(config.investment_terms.daily_interest_percent, Decimal::from(10));
        assert!(config.validate().is_ok());
    }
}
