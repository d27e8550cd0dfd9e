use super::bundle::BundleRuleTable;
use super::domain::clamp_cents;

/// Points for one transaction on its own. Eligible spend peels off one bundle per
/// `threshold_dollars`; whatever is left earns the baseline rate.
pub fn transaction_points(table: &BundleRuleTable, amount_cents: i64, eligible: bool) -> u64 {
    let dollars = clamp_cents(amount_cents) / 100;
    let rate = table.points_per_dollar();
    if !eligible {
        return dollars.saturating_mul(rate);
    }

    let rule = table.transaction_rule();
    let Some(bundles) = dollars.checked_div(rule.threshold_dollars) else {
        return dollars.saturating_mul(rate);
    };
    let loose = dollars % rule.threshold_dollars;
    bundles
        .saturating_mul(rule.points)
        .saturating_add(loose.saturating_mul(rate))
}
