use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::TransactionSubmission;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read transaction export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid transaction CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads `transaction_name,date,merchant_code,amount_cents` rows. Empty cells become
/// missing fields so the ledger reports them the same way as an HTTP submission.
pub fn read_submissions<R: Read>(reader: R) -> Result<Vec<TransactionSubmission>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut submissions = Vec::new();

    for record in csv_reader.deserialize::<TransactionRow>() {
        let row = record?;
        submissions.push(TransactionSubmission {
            transaction_name: row.transaction_name,
            date: row.date,
            merchant_code: row.merchant_code,
            amount_cents: row.amount_cents,
        });
    }

    Ok(submissions)
}

pub fn read_submissions_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<TransactionSubmission>, ImportError> {
    let file = std::fs::File::open(path)?;
    read_submissions(file)
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    transaction_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    merchant_code: Option<String>,
    amount_cents: i64,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_rows_in_file_order() {
        let csv = "transaction_name,date,merchant_code,amount_cents\n\
T01, 2021-05-09 ,sportcheck,2500\n\
T02,2021-05-10,tim_hortons,1000\n";

        let submissions = read_submissions(Cursor::new(csv)).expect("parse");

        assert_eq!(
            submissions,
            vec![
                TransactionSubmission::new("T01", "2021-05-09", "sportcheck", 2500),
                TransactionSubmission::new("T02", "2021-05-10", "tim_hortons", 1000),
            ]
        );
    }

    #[test]
    fn empty_cells_become_missing_fields() {
        let csv = "transaction_name,date,merchant_code,amount_cents\nT01,2021-05-09,,500\n";
        let submission = read_submissions(Cursor::new(csv))
            .expect("parse")
            .pop()
            .expect("row");
        assert!(submission.merchant_code.is_none());
        assert_eq!(submission.transaction_name.as_deref(), Some("T01"));
    }

    #[test]
    fn non_numeric_amounts_are_csv_errors() {
        let csv = "transaction_name,date,merchant_code,amount_cents\nT01,2021-05-09,subway,ten\n";
        match read_submissions(Cursor::new(csv)) {
            Err(ImportError::Csv(_)) => {}
            other => panic!("expected csv error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        match read_submissions_from_path("./does-not-exist.csv") {
            Err(ImportError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
