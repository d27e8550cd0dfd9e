//! Reward point engine: category aggregation, monthly bundle maximization, remainder
//! folding, and single-transaction evaluation. Everything here is a pure function of its
//! inputs; persistence and validation live in [`crate::ledger`].

pub mod aggregate;
pub mod bundle;
pub mod domain;
pub mod evaluator;
pub mod remainder;

pub use aggregate::CategoryTotals;
pub use bundle::{
    BundleMaximizer, BundleOutcome, BundleRule, BundleRuleTable, BundleStrategy, DollarPools,
    RuleApplication, TransactionRule, DEFAULT_OPTIMAL_STATE_LIMIT,
};
pub use domain::{
    MerchantCategory, MonthlyPoints, PointBreakdown, Transaction, TransactionPoints, SPORT_CHECK,
    SUBWAY, TIM_HORTONS,
};

use std::sync::Arc;

use tracing::debug;

/// Invalid rule table construction.
#[derive(Debug, thiserror::Error)]
pub enum RewardsError {
    #[error("bundle rule '{rule}' consumes no dollars")]
    FreeRule { rule: String },
    #[error("single-transaction bundle threshold must be at least one dollar")]
    ZeroTransactionThreshold,
    #[error("rule table holds {0} rules; at most 255 are supported")]
    TooManyRules(usize),
}

/// Stateless engine sharing one read-only rule table across calls.
#[derive(Debug, Clone)]
pub struct RewardsEngine {
    maximizer: BundleMaximizer,
}

impl RewardsEngine {
    pub fn new(table: Arc<BundleRuleTable>, strategy: BundleStrategy) -> Self {
        Self {
            maximizer: BundleMaximizer::new(table).with_strategy(strategy),
        }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(BundleRuleTable::standard()), BundleStrategy::Greedy)
    }

    pub fn with_optimal_state_limit(mut self, limit: usize) -> Self {
        self.maximizer = self.maximizer.with_optimal_state_limit(limit);
        self
    }

    pub fn table(&self) -> &BundleRuleTable {
        self.maximizer.table()
    }

    pub fn strategy(&self) -> BundleStrategy {
        self.maximizer.strategy()
    }

    /// Aggregate points for a complete period plus each transaction's standalone points,
    /// in input order.
    pub fn monthly_points(&self, transactions: &[Transaction]) -> MonthlyPoints {
        let totals = CategoryTotals::from_transactions(transactions);
        let pools = totals.dollar_pools();
        let outcome = self.maximizer.maximize(pools);
        let breakdown =
            remainder::combine(&totals, outcome.points, self.table().points_per_dollar());

        debug!(
            ?totals,
            ?pools,
            strategy = outcome.strategy.label(),
            bundle_points = breakdown.bundle_points,
            other_points = breakdown.other_points,
            remainder_points = breakdown.remainder_points,
            "monthly points computed"
        );

        let transactions = transactions
            .iter()
            .map(|transaction| TransactionPoints {
                name: transaction.name.clone(),
                points: self.transaction_points(transaction),
            })
            .collect();

        MonthlyPoints {
            total: breakdown.total(),
            breakdown,
            totals,
            rules_applied: outcome.applications,
            transactions,
        }
    }

    pub fn transaction_points(&self, transaction: &Transaction) -> u64 {
        self.points_for_amount(
            transaction.amount_cents,
            transaction.category().is_transaction_bundle_eligible(),
        )
    }

    pub fn points_for_amount(&self, amount_cents: i64, eligible: bool) -> u64 {
        evaluator::transaction_points(self.table(), amount_cents, eligible)
    }
}

impl Default for RewardsEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Monthly points under the standard table and greedy selection.
pub fn compute_monthly_points(transactions: &[Transaction]) -> MonthlyPoints {
    RewardsEngine::standard().monthly_points(transactions)
}

/// Single-transaction points under the standard table. Negative amounts score zero.
pub fn compute_transaction_points(amount_cents: i64, is_eligible_category: bool) -> u64 {
    evaluator::transaction_points(
        &BundleRuleTable::standard(),
        amount_cents,
        is_eligible_category,
    )
}
