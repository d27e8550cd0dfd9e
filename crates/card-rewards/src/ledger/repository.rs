use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::domain::PostingPeriod;
use crate::rewards::Transaction;

/// Storage abstraction so the ledger service can be exercised in isolation.
pub trait TransactionRepository: Send + Sync {
    /// Stores the whole batch or none of it.
    fn insert_all(&self, transactions: Vec<Transaction>) -> Result<(), RepositoryError>;
    fn find_by_name(&self, name: &str) -> Result<Option<Transaction>, RepositoryError>;
    /// Transactions posted in `period`, in posting order.
    fn list_by_period(&self, period: PostingPeriod) -> Result<Vec<Transaction>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record '{0}' already exists")]
    Conflict(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store keeping insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTransactionRepository {
    records: Arc<Mutex<Vec<Transaction>>>,
}

impl InMemoryTransactionRepository {
    pub fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransactionRepository for InMemoryTransactionRepository {
    fn insert_all(&self, transactions: Vec<Transaction>) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        {
            let mut names: HashSet<&str> =
                guard.iter().map(|record| record.name.as_str()).collect();
            for transaction in &transactions {
                if !names.insert(transaction.name.as_str()) {
                    return Err(RepositoryError::Conflict(transaction.name.clone()));
                }
            }
        }
        guard.extend(transactions);
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Transaction>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| record.name == name).cloned())
    }

    fn list_by_period(&self, period: PostingPeriod) -> Result<Vec<Transaction>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| period.contains(record.posted_on))
            .cloned()
            .collect())
    }
}
