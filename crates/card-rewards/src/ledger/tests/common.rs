use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::ledger::domain::{PostingPeriod, TransactionSubmission};
use crate::ledger::repository::{
    InMemoryTransactionRepository, RepositoryError, TransactionRepository,
};
use crate::ledger::service::RewardsLedgerService;
use crate::rewards::{RewardsEngine, Transaction};

pub(super) fn submission(
    name: &str,
    merchant_code: &str,
    amount_cents: i64,
) -> TransactionSubmission {
    TransactionSubmission::new(name, "2021-05-09", merchant_code, amount_cents)
}

/// The ten-transaction May 2021 statement used across scenarios.
pub(super) fn mixed_month() -> Vec<TransactionSubmission> {
    vec![
        submission("T01", "sportcheck", 21000),
        submission("T02", "sportcheck", 8700),
        submission("T03", "tim_hortons", 323),
        submission("T04", "tim_hortons", 1267),
        submission("T05", "tim_hortons", 2116),
        submission("T06", "tim_hortons", 2211),
        submission("T07", "subway", 1853),
        submission("T08", "subway", 2153),
        submission("T09", "sportcheck", 7326),
        submission("T10", "tim_hortons", 1321),
    ]
}

pub(super) fn may_2021() -> PostingPeriod {
    PostingPeriod::new(2021, 5).expect("valid period")
}

pub(super) fn memory_service() -> (
    Arc<InMemoryTransactionRepository>,
    RewardsLedgerService<InMemoryTransactionRepository>,
) {
    let repository = Arc::new(InMemoryTransactionRepository::default());
    let service = RewardsLedgerService::new(repository.clone(), RewardsEngine::standard());
    (repository, service)
}

pub(super) struct UnavailableRepository;

impl TransactionRepository for UnavailableRepository {
    fn insert_all(&self, _transactions: Vec<Transaction>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_name(&self, _name: &str) -> Result<Option<Transaction>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_by_period(&self, _period: PostingPeriod) -> Result<Vec<Transaction>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Another poster stores `claimed` between the service's lookups and its insert.
pub(super) struct RacingRepository {
    pub(super) inner: InMemoryTransactionRepository,
    pub(super) claimed: &'static str,
}

impl RacingRepository {
    pub(super) fn new(claimed: &'static str) -> Self {
        Self {
            inner: InMemoryTransactionRepository::default(),
            claimed,
        }
    }
}

impl TransactionRepository for RacingRepository {
    fn insert_all(&self, transactions: Vec<Transaction>) -> Result<(), RepositoryError> {
        let posted_on = NaiveDate::from_ymd_opt(2021, 5, 1).expect("valid date");
        self.inner
            .insert_all(vec![Transaction::new(self.claimed, posted_on, "subway", 500)])?;
        self.inner.insert_all(transactions)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Transaction>, RepositoryError> {
        self.inner.find_by_name(name)
    }

    fn list_by_period(&self, period: PostingPeriod) -> Result<Vec<Transaction>, RepositoryError> {
        self.inner.list_by_period(period)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
