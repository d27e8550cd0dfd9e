//! Transaction ledger: posting with validation and duplicate detection, per-period
//! retrieval, and the HTTP routes that report reward points from the engine.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;
mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    PostingPeriod, Status, StatusBody, TransactionSubmission, UNEXPECTED_ERROR_CODE,
};
pub use import::{read_submissions, read_submissions_from_path, ImportError};
pub use repository::{InMemoryTransactionRepository, RepositoryError, TransactionRepository};
pub use router::{
    ledger_router, MonthlyReportResponse, TransactionLevelPoint, TransactionLevelPointResponse,
};
pub use service::{LedgerError, RewardsLedgerService};
