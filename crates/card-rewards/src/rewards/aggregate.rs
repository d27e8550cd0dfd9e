use serde::{Deserialize, Serialize};

use super::bundle::DollarPools;
use super::domain::{MerchantCategory, Transaction};

/// Summed cents per resolved category for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub sportcheck_cents: u64,
    pub tim_hortons_cents: u64,
    pub subway_cents: u64,
    pub other_cents: u64,
}

impl CategoryTotals {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut totals = Self::default();
        for transaction in transactions {
            totals.add(transaction.category(), transaction.clamped_cents());
        }
        totals
    }

    pub fn add(&mut self, category: MerchantCategory, cents: u64) {
        let slot = match category {
            MerchantCategory::SportCheck => &mut self.sportcheck_cents,
            MerchantCategory::TimHortons => &mut self.tim_hortons_cents,
            MerchantCategory::Subway => &mut self.subway_cents,
            MerchantCategory::Other => &mut self.other_cents,
        };
        *slot = slot.saturating_add(cents);
    }

    pub fn get(&self, category: MerchantCategory) -> u64 {
        match category {
            MerchantCategory::SportCheck => self.sportcheck_cents,
            MerchantCategory::TimHortons => self.tim_hortons_cents,
            MerchantCategory::Subway => self.subway_cents,
            MerchantCategory::Other => self.other_cents,
        }
    }

    /// Whole dollars available to the bundle rules; sub-dollar cents stay behind.
    pub fn dollar_pools(&self) -> DollarPools {
        DollarPools::new(
            self.sportcheck_cents / 100,
            self.tim_hortons_cents / 100,
            self.subway_cents / 100,
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (MerchantCategory, u64)> + '_ {
        [
            MerchantCategory::SportCheck,
            MerchantCategory::TimHortons,
            MerchantCategory::Subway,
            MerchantCategory::Other,
        ]
        .into_iter()
        .map(move |category| (category, self.get(category)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(name: &str, code: &str, cents: i64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2021, 5, 9).expect("valid date");
        Transaction::new(name, date, code, cents)
    }

    #[test]
    fn empty_input_yields_zero_totals() {
        let transactions: Vec<Transaction> = Vec::new();
        let totals = CategoryTotals::from_transactions(&transactions);
        assert_eq!(totals, CategoryTotals::default());
        assert_eq!(totals.dollar_pools(), DollarPools::new(0, 0, 0));
    }

    #[test]
    fn unknown_codes_collapse_into_other() {
        let transactions = vec![
            txn("T01", "sportcheck", 2500),
            txn("T02", "sportcheck", 10068),
            txn("T03", "tim_hortons", 3550),
            txn("T04", "subway", 3558),
            txn("T05", "whatever", 600),
            txn("T06", "the_bay", 400),
        ];

        let totals = CategoryTotals::from_transactions(&transactions);

        assert_eq!(totals.sportcheck_cents, 12568);
        assert_eq!(totals.tim_hortons_cents, 3550);
        assert_eq!(totals.subway_cents, 3558);
        assert_eq!(totals.other_cents, 1000);
        assert_eq!(totals.dollar_pools(), DollarPools::new(125, 35, 35));
    }

    #[test]
    fn negative_amounts_do_not_reduce_totals() {
        let transactions = vec![txn("T01", "subway", 1200), txn("T02", "subway", -500)];
        let totals = CategoryTotals::from_transactions(&transactions);
        assert_eq!(totals.get(MerchantCategory::Subway), 1200);
    }

    #[test]
    fn iter_visits_every_bucket_once() {
        let totals = CategoryTotals {
            sportcheck_cents: 1,
            tim_hortons_cents: 2,
            subway_cents: 3,
            other_cents: 4,
        };
        let sum: u64 = totals.iter().map(|(_, cents)| cents).sum();
        assert_eq!(sum, 10);
        assert_eq!(totals.iter().count(), 4);
    }
}
