use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{PostingPeriod, Status, TransactionSubmission};
use super::repository::{RepositoryError, TransactionRepository};
use super::validation;
use crate::rewards::{MonthlyPoints, RewardsEngine, TransactionPoints};

/// Service composing the transaction repository and the reward engine.
pub struct RewardsLedgerService<R> {
    repository: Arc<R>,
    engine: Arc<RewardsEngine>,
}

impl<R> RewardsLedgerService<R>
where
    R: TransactionRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: RewardsEngine) -> Self {
        Self {
            repository,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &RewardsEngine {
        &self.engine
    }

    /// Validate a batch and store it. Nothing is stored unless every entry is valid.
    pub fn post_batch(
        &self,
        submissions: Vec<TransactionSubmission>,
    ) -> Result<usize, LedgerError> {
        let mut seen = HashSet::new();
        let mut transactions = Vec::with_capacity(submissions.len());

        for submission in submissions {
            let name = validation::transaction_name(&submission)?.to_string();
            if seen.contains(&name) || self.repository.find_by_name(&name)?.is_some() {
                return Err(LedgerError::AlreadyPosted(name));
            }
            seen.insert(name.clone());
            transactions.push(validation::into_transaction(name, submission)?);
        }

        let posted = transactions.len();
        for transaction in &transactions {
            debug!(
                name = %transaction.name,
                merchant = %transaction.merchant_code,
                amount_cents = transaction.amount_cents,
                "posting transaction"
            );
        }
        self.repository
            .insert_all(transactions)
            .map_err(|error| match error {
                RepositoryError::Conflict(name) => LedgerError::AlreadyPosted(name),
                other => other.into(),
            })?;

        info!(posted, "transaction batch posted");
        Ok(posted)
    }

    /// Aggregate and per-transaction points for every transaction posted in `period`.
    pub fn monthly_report(&self, period: PostingPeriod) -> Result<MonthlyPoints, LedgerError> {
        let transactions = self.repository.list_by_period(period)?;
        if transactions.is_empty() {
            return Err(LedgerError::MonthNoTransactions(period));
        }

        let points = self.engine.monthly_points(&transactions);
        info!(
            %period,
            transactions = transactions.len(),
            total = points.total,
            strategy = self.engine.strategy().label(),
            "monthly rewards report built"
        );
        Ok(points)
    }

    pub fn transaction_points(&self, name: &str) -> Result<TransactionPoints, LedgerError> {
        let transaction = self
            .repository
            .find_by_name(name)?
            .ok_or_else(|| LedgerError::TransactionNotFound(name.to_string()))?;

        Ok(TransactionPoints {
            points: self.engine.transaction_points(&transaction),
            name: transaction.name,
        })
    }
}

/// Error raised by the ledger service.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("no transactions were posted in {0}")]
    MonthNoTransactions(PostingPeriod),
    #[error("date '{0}' is not a valid YYYY-MM-DD date")]
    WrongDateFormat(String),
    #[error("transaction '{0}' has already been posted")]
    AlreadyPosted(String),
    #[error("transaction '{name}' has negative amount {amount_cents}")]
    NegativeAmount { name: String, amount_cents: i64 },
    #[error("transaction '{name}' has no merchant code")]
    MerchantCodeMissing { name: String },
    #[error("transaction name is missing")]
    TransactionNameMissing,
    #[error("transaction '{0}' not found")]
    TransactionNotFound(String),
    #[error("invalid period year '{year}' month '{month}'")]
    InvalidPeriod { year: String, month: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LedgerError {
    /// Wire status for rule violations; `None` for infrastructure failures.
    pub fn status(&self) -> Option<Status> {
        match self {
            LedgerError::MonthNoTransactions(_) => Some(Status::MonthNoTransactions),
            LedgerError::WrongDateFormat(_) => Some(Status::WrongDateStringFormat),
            LedgerError::AlreadyPosted(_) => Some(Status::TransactionAlreadyPosted),
            LedgerError::NegativeAmount { .. } => Some(Status::NegativeAmountCents),
            LedgerError::MerchantCodeMissing { .. } => Some(Status::MerchantCodeIsNull),
            LedgerError::TransactionNameMissing => Some(Status::TransactionNameIsNull),
            LedgerError::TransactionNotFound(_) => Some(Status::TransactionNotFound),
            LedgerError::InvalidPeriod { .. } => Some(Status::InvalidPeriod),
            LedgerError::Repository(_) => None,
        }
    }
}
