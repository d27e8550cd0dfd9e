use super::aggregate::CategoryTotals;
use super::domain::PointBreakdown;

/// Folds catch-all dollars and pooled sub-dollar cents into the bundle score.
///
/// Each floor division happens on its own: `other_cents / 100` for the catch-all bucket and
/// `(sum of every bucket's cents % 100) / 100` for the pooled remainder.
pub fn combine(
    totals: &CategoryTotals,
    bundle_points: u64,
    points_per_dollar: u64,
) -> PointBreakdown {
    let remainder_cents: u64 = totals.iter().map(|(_, cents)| cents % 100).sum();

    PointBreakdown {
        bundle_points,
        other_points: (totals.other_cents / 100).saturating_mul(points_per_dollar),
        remainder_points: (remainder_cents / 100).saturating_mul(points_per_dollar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainders_across_categories_cross_a_dollar() {
        let totals = CategoryTotals {
            sportcheck_cents: 12568,
            tim_hortons_cents: 3550,
            subway_cents: 3558,
            other_cents: 1000,
        };

        let breakdown = combine(&totals, 730, 1);

        assert_eq!(breakdown.other_points, 10);
        assert_eq!(breakdown.remainder_points, 1);
        assert_eq!(breakdown.total(), 741);
    }

    #[test]
    fn other_remainder_joins_the_pool() {
        let totals = CategoryTotals {
            sportcheck_cents: 50,
            tim_hortons_cents: 0,
            subway_cents: 0,
            other_cents: 150,
        };

        let breakdown = combine(&totals, 0, 1);

        // 150 other cents earn one dollar; its 50 leftover cents pair with SportCheck's 50.
        assert_eq!(breakdown.other_points, 1);
        assert_eq!(breakdown.remainder_points, 1);
    }

    #[test]
    fn pooled_cents_below_a_dollar_earn_nothing() {
        let totals = CategoryTotals {
            sportcheck_cents: 26,
            tim_hortons_cents: 38,
            subway_cents: 6,
            other_cents: 0,
        };
        assert_eq!(combine(&totals, 0, 1), PointBreakdown::default());
    }
}
