use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aggregate::CategoryTotals;
use super::bundle::RuleApplication;

/// Merchant code that earns single-transaction bundle points.
pub const SPORT_CHECK: &str = "sportcheck";
pub const TIM_HORTONS: &str = "tim_hortons";
pub const SUBWAY: &str = "subway";

/// Resolved merchant category. Anything outside the privileged codes lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantCategory {
    SportCheck,
    TimHortons,
    Subway,
    Other,
}

impl MerchantCategory {
    /// Exact, case-sensitive match on the merchant code.
    pub fn from_code(code: &str) -> Self {
        match code {
            SPORT_CHECK => Self::SportCheck,
            TIM_HORTONS => Self::TimHortons,
            SUBWAY => Self::Subway,
            _ => Self::Other,
        }
    }

    pub fn is_privileged(self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Only SportCheck purchases bundle within a single transaction.
    pub fn is_transaction_bundle_eligible(self) -> bool {
        matches!(self, Self::SportCheck)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SportCheck => SPORT_CHECK,
            Self::TimHortons => TIM_HORTONS,
            Self::Subway => SUBWAY,
            Self::Other => "other",
        }
    }
}

/// A posted purchase as handed to the engine by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub name: String,
    pub posted_on: NaiveDate,
    pub merchant_code: String,
    pub amount_cents: i64,
}

impl Transaction {
    pub fn new(
        name: impl Into<String>,
        posted_on: NaiveDate,
        merchant_code: impl Into<String>,
        amount_cents: i64,
    ) -> Self {
        Self {
            name: name.into(),
            posted_on,
            merchant_code: merchant_code.into(),
            amount_cents,
        }
    }

    pub fn category(&self) -> MerchantCategory {
        MerchantCategory::from_code(&self.merchant_code)
    }

    /// Negative amounts are clamped to zero.
    pub fn clamped_cents(&self) -> u64 {
        clamp_cents(self.amount_cents)
    }
}

pub(crate) fn clamp_cents(amount_cents: i64) -> u64 {
    u64::try_from(amount_cents).unwrap_or(0)
}

/// Points earned by one transaction evaluated on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPoints {
    pub name: String,
    pub points: u64,
}

/// How the monthly total splits between bundles, catch-all spend and pooled cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBreakdown {
    pub bundle_points: u64,
    pub other_points: u64,
    pub remainder_points: u64,
}

impl PointBreakdown {
    pub fn total(&self) -> u64 {
        self.bundle_points + self.other_points + self.remainder_points
    }
}

/// Result of a monthly computation over a complete period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPoints {
    pub total: u64,
    pub breakdown: PointBreakdown,
    pub totals: CategoryTotals,
    pub rules_applied: Vec<RuleApplication>,
    pub transactions: Vec<TransactionPoints>,
}

impl MonthlyPoints {
    pub fn points_for(&self, name: &str) -> Option<u64> {
        self.transactions
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.points)
    }
}
