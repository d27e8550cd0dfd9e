use chrono::NaiveDate;

use super::domain::TransactionSubmission;
use super::service::LedgerError;
use crate::rewards::Transaction;

pub(crate) fn transaction_name(submission: &TransactionSubmission) -> Result<&str, LedgerError> {
    submission
        .transaction_name
        .as_deref()
        .ok_or(LedgerError::TransactionNameMissing)
}

/// Checks the date, amount and merchant code, in that order, and builds the record.
pub(crate) fn into_transaction(
    name: String,
    submission: TransactionSubmission,
) -> Result<Transaction, LedgerError> {
    let raw_date = submission.date.unwrap_or_default();
    let posted_on = parse_posting_date(&raw_date)?;

    if submission.amount_cents < 0 {
        return Err(LedgerError::NegativeAmount {
            name,
            amount_cents: submission.amount_cents,
        });
    }

    let merchant_code = submission
        .merchant_code
        .ok_or_else(|| LedgerError::MerchantCodeMissing { name: name.clone() })?;

    Ok(Transaction {
        name,
        posted_on,
        merchant_code,
        amount_cents: submission.amount_cents,
    })
}

/// Strict `YYYY-MM-DD` that must also be a real calendar date.
pub(crate) fn parse_posting_date(raw: &str) -> Result<NaiveDate, LedgerError> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !shaped {
        return Err(LedgerError::WrongDateFormat(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| LedgerError::WrongDateFormat(raw.to_string()))
}
