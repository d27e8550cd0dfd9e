//! Monthly bundle selection across the three privileged merchant pools.
//!
//! The rule table is a plain value handed to [`BundleMaximizer`]. Two strategies read it:
//! the greedy walk that applies the first satisfiable rule in priority order (the
//! historical behavior every report is built on), and an exhaustive dynamic program over
//! the remaining-dollar state space that returns the true maximum for the same rules.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::RewardsError;

/// Default cap on the optimal solver's state space, (A+1)(B+1)(C+1).
pub const DEFAULT_OPTIMAL_STATE_LIMIT: usize = 2_000_000;

/// Whole dollars available (or required) per privileged category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DollarPools {
    pub sportcheck: u64,
    pub tim_hortons: u64,
    pub subway: u64,
}

impl DollarPools {
    pub const fn new(sportcheck: u64, tim_hortons: u64, subway: u64) -> Self {
        Self {
            sportcheck,
            tim_hortons,
            subway,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sportcheck == 0 && self.tim_hortons == 0 && self.subway == 0
    }

    pub fn total(&self) -> u64 {
        self.sportcheck
            .saturating_add(self.tim_hortons)
            .saturating_add(self.subway)
    }

    pub fn covers(&self, cost: &DollarPools) -> bool {
        self.sportcheck >= cost.sportcheck
            && self.tim_hortons >= cost.tim_hortons
            && self.subway >= cost.subway
    }

    /// How many times `cost` fits before one of its pools runs short.
    fn times(&self, cost: &DollarPools) -> u64 {
        [
            (self.sportcheck, cost.sportcheck),
            (self.tim_hortons, cost.tim_hortons),
            (self.subway, cost.subway),
        ]
        .into_iter()
        .filter(|(_, required)| *required > 0)
        .map(|(available, required)| available / required)
        .min()
        .unwrap_or(0)
    }

    fn consume(&self, cost: &DollarPools, times: u64) -> DollarPools {
        DollarPools {
            sportcheck: self.sportcheck - cost.sportcheck * times,
            tim_hortons: self.tim_hortons - cost.tim_hortons * times,
            subway: self.subway - cost.subway * times,
        }
    }
}

/// One exchange of pooled dollars for a point award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleRule {
    pub name: String,
    pub cost: DollarPools,
    pub points: u64,
}

impl BundleRule {
    pub fn new(name: impl Into<String>, cost: DollarPools, points: u64) -> Self {
        Self {
            name: name.into(),
            cost,
            points,
        }
    }
}

/// Bundle earned inside a single SportCheck transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRule {
    pub threshold_dollars: u64,
    pub points: u64,
}

/// Priority-ordered rule table plus the baseline rate for unbundled dollars.
/// Deserialized tables go through [`BundleRuleTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBundleRuleTable")]
pub struct BundleRuleTable {
    rules: Vec<BundleRule>,
    points_per_dollar: u64,
    transaction_rule: TransactionRule,
}

impl BundleRuleTable {
    /// The published program. Two combinations of the full rule space are left out because
    /// neither is worth more than what the kept rules earn from the same dollars.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                BundleRule::new(
                    "sportcheck_75_tim_hortons_25_subway_25",
                    DollarPools::new(75, 25, 25),
                    500,
                ),
                BundleRule::new(
                    "sportcheck_75_tim_hortons_25",
                    DollarPools::new(75, 25, 0),
                    300,
                ),
                BundleRule::new(
                    "sportcheck_25_tim_hortons_10_subway_10",
                    DollarPools::new(25, 10, 10),
                    150,
                ),
                BundleRule::new("sportcheck_20", DollarPools::new(20, 0, 0), 75),
            ],
            points_per_dollar: 1,
            transaction_rule: TransactionRule {
                threshold_dollars: 20,
                points: 75,
            },
        }
    }

    pub fn new(
        rules: Vec<BundleRule>,
        points_per_dollar: u64,
        transaction_rule: TransactionRule,
    ) -> Result<Self, RewardsError> {
        if rules.len() > usize::from(u8::MAX) {
            return Err(RewardsError::TooManyRules(rules.len()));
        }
        if let Some(rule) = rules.iter().find(|rule| rule.cost.is_empty()) {
            return Err(RewardsError::FreeRule {
                rule: rule.name.clone(),
            });
        }
        if transaction_rule.threshold_dollars == 0 {
            return Err(RewardsError::ZeroTransactionThreshold);
        }

        Ok(Self {
            rules,
            points_per_dollar,
            transaction_rule,
        })
    }

    pub fn rules(&self) -> &[BundleRule] {
        &self.rules
    }

    pub fn points_per_dollar(&self) -> u64 {
        self.points_per_dollar
    }

    pub fn transaction_rule(&self) -> TransactionRule {
        self.transaction_rule
    }
}

#[derive(Deserialize)]
struct RawBundleRuleTable {
    rules: Vec<BundleRule>,
    points_per_dollar: u64,
    transaction_rule: TransactionRule,
}

impl TryFrom<RawBundleRuleTable> for BundleRuleTable {
    type Error = RewardsError;

    fn try_from(raw: RawBundleRuleTable) -> Result<Self, Self::Error> {
        Self::new(raw.rules, raw.points_per_dollar, raw.transaction_rule)
    }
}

impl Default for BundleRuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Selects how rules are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleStrategy {
    /// First satisfiable rule in table order, no backtracking.
    #[default]
    Greedy,
    /// Best combination of table rules, found by dynamic programming.
    Optimal,
}

impl BundleStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "greedy" => Some(Self::Greedy),
            "optimal" | "dp" => Some(Self::Optimal),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Optimal => "optimal",
        }
    }
}

/// A rule and how many times it fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleApplication {
    pub rule: String,
    pub times: u64,
    pub points: u64,
}

/// Points earned from the privileged pools and how they were earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleOutcome {
    pub strategy: BundleStrategy,
    pub points: u64,
    pub applications: Vec<RuleApplication>,
    /// Dollars left after bundling, scored at the baseline rate.
    pub leftover: DollarPools,
}

#[derive(Debug, Clone)]
pub struct BundleMaximizer {
    table: Arc<BundleRuleTable>,
    strategy: BundleStrategy,
    optimal_state_limit: usize,
}

impl BundleMaximizer {
    pub fn new(table: Arc<BundleRuleTable>) -> Self {
        Self {
            table,
            strategy: BundleStrategy::Greedy,
            optimal_state_limit: DEFAULT_OPTIMAL_STATE_LIMIT,
        }
    }

    pub fn with_strategy(mut self, strategy: BundleStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_optimal_state_limit(mut self, limit: usize) -> Self {
        self.optimal_state_limit = limit;
        self
    }

    pub fn table(&self) -> &BundleRuleTable {
        &self.table
    }

    pub fn strategy(&self) -> BundleStrategy {
        self.strategy
    }

    pub fn maximize(&self, pools: DollarPools) -> BundleOutcome {
        match self.strategy {
            BundleStrategy::Greedy => greedy(&self.table, pools),
            BundleStrategy::Optimal => match optimal(&self.table, pools, self.optimal_state_limit)
            {
                Some(outcome) => outcome,
                None => {
                    warn!(
                        ?pools,
                        limit = self.optimal_state_limit,
                        "optimal bundle search exceeds state limit; using greedy table"
                    );
                    greedy(&self.table, pools)
                }
            },
        }
    }
}

fn greedy(table: &BundleRuleTable, pools: DollarPools) -> BundleOutcome {
    let mut remaining = pools;
    let mut counts = vec![0u64; table.rules.len()];

    // Applying a rule never re-enables an earlier one, so each rule fires in one batch.
    while !remaining.is_empty() {
        let Some((index, rule)) = table
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| remaining.covers(&rule.cost))
        else {
            break;
        };

        let times = remaining.times(&rule.cost);
        if times == 0 {
            break;
        }
        remaining = remaining.consume(&rule.cost, times);
        counts[index] += times;
        debug!(rule = %rule.name, times, ?remaining, "bundle rule applied");
    }

    finish(table, BundleStrategy::Greedy, &counts, remaining)
}

fn optimal(table: &BundleRuleTable, pools: DollarPools, limit: usize) -> Option<BundleOutcome> {
    let solution = OptimalSolution::solve(table, pools, limit)?;

    let mut counts = vec![0u64; table.rules.len()];
    let (mut a, mut b, mut c) = solution.top();
    while let Some(index) = solution.choice[solution.index(a, b, c)] {
        let index = usize::from(index);
        let cost = &table.rules[index].cost;
        counts[index] += 1;
        a -= to_index(cost.sportcheck);
        b -= to_index(cost.tim_hortons);
        c -= to_index(cost.subway);
    }

    let leftover = DollarPools::new(a as u64, b as u64, c as u64);
    let outcome = finish(table, BundleStrategy::Optimal, &counts, leftover);
    debug_assert_eq!(outcome.points, solution.value(pools));
    Some(outcome)
}

fn finish(
    table: &BundleRuleTable,
    strategy: BundleStrategy,
    counts: &[u64],
    leftover: DollarPools,
) -> BundleOutcome {
    let mut applications = Vec::new();
    let mut points: u64 = 0;

    for (rule, &times) in table.rules.iter().zip(counts) {
        if times == 0 {
            continue;
        }
        let earned = rule.points.saturating_mul(times);
        points = points.saturating_add(earned);
        applications.push(RuleApplication {
            rule: rule.name.clone(),
            times,
            points: earned,
        });
    }

    let baseline = leftover.total().saturating_mul(table.points_per_dollar);
    if leftover.total() > 0 {
        applications.push(RuleApplication {
            rule: "baseline".to_string(),
            times: leftover.total(),
            points: baseline,
        });
    }

    BundleOutcome {
        strategy,
        points: points.saturating_add(baseline),
        applications,
        leftover,
    }
}

fn to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Best score for every sub-state of the requested pools, filled bottom-up.
struct OptimalSolution {
    dims: (usize, usize, usize),
    best: Vec<u64>,
    choice: Vec<Option<u8>>,
}

impl OptimalSolution {
    fn solve(table: &BundleRuleTable, pools: DollarPools, limit: usize) -> Option<Self> {
        let da = to_index(pools.sportcheck).checked_add(1)?;
        let db = to_index(pools.tim_hortons).checked_add(1)?;
        let dc = to_index(pools.subway).checked_add(1)?;
        let size = da.checked_mul(db)?.checked_mul(dc)?;
        if size > limit {
            return None;
        }

        let costs: Vec<(usize, usize, usize, u64)> = table
            .rules
            .iter()
            .map(|rule| {
                (
                    to_index(rule.cost.sportcheck),
                    to_index(rule.cost.tim_hortons),
                    to_index(rule.cost.subway),
                    rule.points,
                )
            })
            .collect();

        let mut solution = Self {
            dims: (da, db, dc),
            best: vec![0; size],
            choice: vec![None; size],
        };

        // Every rule strictly shrinks at least one pool, so its source state precedes the
        // current one in this iteration order.
        for a in 0..da {
            for b in 0..db {
                for c in 0..dc {
                    let mut value = ((a + b + c) as u64).saturating_mul(table.points_per_dollar);
                    let mut pick = None;
                    for (index, &(ra, rb, rc, points)) in costs.iter().enumerate() {
                        if a < ra || b < rb || c < rc {
                            continue;
                        }
                        let source = solution.index(a - ra, b - rb, c - rc);
                        let candidate = points.saturating_add(solution.best[source]);
                        if candidate > value {
                            value = candidate;
                            pick = u8::try_from(index).ok();
                        }
                    }
                    let slot = solution.index(a, b, c);
                    solution.best[slot] = value;
                    solution.choice[slot] = pick;
                }
            }
        }

        Some(solution)
    }

    fn index(&self, a: usize, b: usize, c: usize) -> usize {
        (a * self.dims.1 + b) * self.dims.2 + c
    }

    fn top(&self) -> (usize, usize, usize) {
        (self.dims.0 - 1, self.dims.1 - 1, self.dims.2 - 1)
    }

    fn value(&self, pools: DollarPools) -> u64 {
        self.best[self.index(
            to_index(pools.sportcheck),
            to_index(pools.tim_hortons),
            to_index(pools.subway),
        )]
    }
}
