use std::sync::Arc;

use chrono::Utc;
use tokio::time::{ interval, Duration, MissedTickBehavior };

use crate::services::{ AuthService, SettlementService };

/// Background loop that accrues returns and closes matured investments.
pub struct SettlementWorker {
    settlement_service: Arc<SettlementService>,
    auth_service: Arc<AuthService>,
    period: Duration,
}

impl SettlementWorker {
    pub fn new(
        settlement_service: Arc<SettlementService>,
        auth_service: Arc<AuthService>,
        period_secs: u64
    ) -> Self {
        Self {
            settlement_service,
            auth_service,
            period: Duration::from_secs(period_secs.max(1)),
        }
    }

    pub async fn start(self) {
        let mut interval = interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Settlement worker running every {:?}", self.period);

        loop {
            interval.tick().await;
            self.run_once().await;
        }
    }

    /// One pass. Failures are logged and the next tick tries again.
    pub async fn run_once(&self) {
        let now = Utc::now();

        if let Err(e) = self.settlement_service.calculate_daily_investment_returns(now).await {
            tracing::error!("Daily return calculation failed: {}", e);
        }

        if let Err(e) = self.settlement_service.update_completed_investments(now).await {
            tracing::error!("Investment completion failed: {}", e);
        }

        match self.auth_service.purge_expired_sessions().await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!("Purged {} expired session(s)", purged),
            Err(e) => tracing::warn!("Session purge failed: {}", e),
        }
    }
}
