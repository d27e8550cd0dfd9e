use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::service::LedgerError;

/// Incoming transaction as posted by a client. Presence checks happen during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSubmission {
    #[serde(default)]
    pub transaction_name: Option<String>,
    /// Posting date as `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub merchant_code: Option<String>,
    pub amount_cents: i64,
}

impl TransactionSubmission {
    pub fn new(
        transaction_name: impl Into<String>,
        date: impl Into<String>,
        merchant_code: impl Into<String>,
        amount_cents: i64,
    ) -> Self {
        Self {
            transaction_name: Some(transaction_name.into()),
            date: Some(date.into()),
            merchant_code: Some(merchant_code.into()),
            amount_cents,
        }
    }
}

/// Calendar month a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingPeriod {
    pub year: i32,
    pub month: u32,
}

impl PostingPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if (1..=12).contains(&month) && NaiveDate::from_ymd_opt(year, month, 1).is_some() {
            Ok(Self { year, month })
        } else {
            Err(LedgerError::InvalidPeriod {
                year: year.to_string(),
                month: month.to_string(),
            })
        }
    }

    /// Accepts query-string values such as `2021` and `05`.
    pub fn parse(year: &str, month: &str) -> Result<Self, LedgerError> {
        let invalid = || LedgerError::InvalidPeriod {
            year: year.to_string(),
            month: month.to_string(),
        };
        let parsed_year = year.trim().parse::<i32>().map_err(|_| invalid())?;
        let parsed_month = month.trim().parse::<u32>().map_err(|_| invalid())?;
        Self::new(parsed_year, parsed_month).map_err(|_| invalid())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for PostingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Wire status codes reported alongside every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    MonthNoTransactions,
    WrongDateStringFormat,
    TransactionAlreadyPosted,
    NegativeAmountCents,
    MerchantCodeIsNull,
    TransactionNameIsNull,
    TransactionNotFound,
    InvalidPeriod,
}

/// Code reported for failures that are not ledger rule violations.
pub const UNEXPECTED_ERROR_CODE: u16 = 9999;

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 1200,
            Status::MonthNoTransactions => 1001,
            Status::WrongDateStringFormat => 1002,
            Status::TransactionAlreadyPosted => 1003,
            Status::NegativeAmountCents => 1004,
            Status::MerchantCodeIsNull => 1005,
            Status::TransactionNameIsNull => 1006,
            Status::TransactionNotFound => 1007,
            Status::InvalidPeriod => 1008,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Status::Ok => "Successful Request.",
            Status::MonthNoTransactions => "No transactions were posted in the given month.",
            Status::WrongDateStringFormat => "The date string representation is wrong.",
            Status::TransactionAlreadyPosted => {
                "Transaction with the same name has already been posted."
            }
            Status::NegativeAmountCents => "Amount cents cannot be negative.",
            Status::MerchantCodeIsNull => "Merchant code is null.",
            Status::TransactionNameIsNull => "Transaction name is null.",
            Status::TransactionNotFound => "Transaction not found.",
            Status::InvalidPeriod => "The requested year or month is invalid.",
        }
    }
}

/// `{code, message}` envelope shared by every response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub code: u16,
    pub message: String,
}

impl From<Status> for StatusBody {
    fn from(status: Status) -> Self {
        Self {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

impl StatusBody {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            code: UNEXPECTED_ERROR_CODE,
            message: message.into(),
        }
    }
}
