use crate::infra::{memory_ledger, parse_strategy};
use card_rewards::config::{AppConfig, RewardsConfig};
use card_rewards::error::AppError;
use card_rewards::ledger::{read_submissions_from_path, MonthlyReportResponse, PostingPeriod};
use card_rewards::rewards::{
    BundleStrategy, CategoryTotals, MerchantCategory, PointBreakdown, RewardsEngine,
    RuleApplication,
};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// CSV export with transaction_name,date,merchant_code,amount_cents columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Statement year, e.g. 2021
    #[arg(long)]
    pub(crate) year: i32,
    /// Statement month (1-12)
    #[arg(long)]
    pub(crate) month: u32,
    /// Bundle strategy (greedy or optimal); defaults to REWARDS_STRATEGY
    #[arg(long, value_parser = parse_strategy)]
    pub(crate) strategy: Option<BundleStrategy>,
    /// Include the bundle breakdown and the rules applied
    #[arg(long)]
    pub(crate) audit: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PointsArgs {
    /// Purchase amount in cents
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) amount_cents: i64,
    /// Merchant code, e.g. sportcheck
    #[arg(long)]
    pub(crate) merchant_code: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportOutput {
    #[serde(flatten)]
    pub(crate) report: MonthlyReportResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) audit: Option<AuditView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuditView {
    pub(crate) strategy: BundleStrategy,
    pub(crate) breakdown: PointBreakdown,
    pub(crate) category_totals_cents: CategoryTotals,
    pub(crate) rules_applied: Vec<RuleApplication>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct PointsOutput {
    pub(crate) merchant_code: String,
    pub(crate) category: &'static str,
    pub(crate) amount_cents: i64,
    pub(crate) point: u64,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let output = build_report(args, config.rewards)?;
    print_json(&output)
}

pub(crate) fn run_points(args: PointsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let output = score_purchase(&args, &config.rewards.engine());
    print_json(&output)
}

/// Posts the export into a fresh ledger and reports the requested month.
pub(crate) fn build_report(
    args: ReportArgs,
    mut rewards: RewardsConfig,
) -> Result<ReportOutput, AppError> {
    if let Some(strategy) = args.strategy {
        rewards.strategy = strategy;
    }

    let period = PostingPeriod::new(args.year, args.month)?;
    let submissions = read_submissions_from_path(&args.csv)?;
    let ledger = memory_ledger(&rewards);
    ledger.post_batch(submissions)?;
    let points = ledger.monthly_report(period)?;

    let audit = args.audit.then(|| AuditView {
        strategy: rewards.strategy,
        breakdown: points.breakdown,
        category_totals_cents: points.totals,
        rules_applied: points.rules_applied.clone(),
    });
    let report = MonthlyReportResponse::new(
        format!("{:04}", period.year),
        format!("{:02}", period.month),
        &points,
    );

    Ok(ReportOutput { report, audit })
}

pub(crate) fn score_purchase(args: &PointsArgs, engine: &RewardsEngine) -> PointsOutput {
    let category = MerchantCategory::from_code(&args.merchant_code);
    PointsOutput {
        merchant_code: args.merchant_code.clone(),
        category: category.label(),
        amount_cents: args.amount_cents,
        point: engine.points_for_amount(
            args.amount_cents,
            category.is_transaction_bundle_eligible(),
        ),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}
