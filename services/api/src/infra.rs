use card_rewards::config::RewardsConfig;
use card_rewards::ledger::{InMemoryTransactionRepository, RewardsLedgerService};
use card_rewards::rewards::BundleStrategy;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type MemoryLedger = RewardsLedgerService<InMemoryTransactionRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Ledger over a fresh in-memory repository, scoring with the configured engine.
pub(crate) fn memory_ledger(config: &RewardsConfig) -> Arc<MemoryLedger> {
    let repository = Arc::new(InMemoryTransactionRepository::default());
    Arc::new(RewardsLedgerService::new(repository, config.engine()))
}

pub(crate) fn parse_strategy(raw: &str) -> Result<BundleStrategy, String> {
    BundleStrategy::parse(raw)
        .ok_or_else(|| format!("unknown strategy '{raw}' (expected greedy or optimal)"))
}
