//! CSV transaction import
//!
//! Format: `date,type,amount,description,category,currency` with a header
//! row. Columns are looked up by header name, so order doesn't matter and
//! the last three may be missing entirely.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::io::Read;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{NewTransaction, TransactionType};

/// Outcome of an import
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
}

/// Parsed rows plus the number of rows that could not be parsed
#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub transactions: Vec<NewTransaction>,
    pub skipped: usize,
}

struct Columns {
    date: usize,
    tx_type: usize,
    amount: usize,
    description: Option<usize>,
    category: Option<usize>,
    currency: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("Missing required column: {}", name)))
        };

        Ok(Self {
            date: require("date")?,
            tx_type: require("type")?,
            amount: require("amount")?,
            description: find("description"),
            category: find("category"),
            currency: find("currency"),
        })
    }
}

/// Parse a transactions CSV
///
/// A missing required column fails the whole parse; a bad row is skipped.
pub fn parse_csv<R: Read>(reader: R) -> Result<ParsedCsv> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut parsed = ParsedCsv::default();

    for (index, result) in rdr.records().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = result
            .map_err(Error::from)
            .and_then(|record| parse_row(&columns, &record));

        match row {
            Ok(tx) => parsed.transactions.push(tx),
            Err(e) => {
                warn!(line, error = %e, "Skipping CSV row");
                parsed.skipped += 1;
            }
        }
    }

    debug!(
        rows = parsed.transactions.len(),
        skipped = parsed.skipped,
        "Parsed transactions CSV"
    );
    Ok(parsed)
}

/// Parse a CSV and insert every valid row for `user_id`
pub fn import_csv<R: Read>(db: &Database, user_id: i64, reader: R) -> Result<ImportResult> {
    db.require_user(user_id)?;

    let parsed = parse_csv(reader)?;
    let mut result = ImportResult {
        imported: 0,
        skipped: parsed.skipped,
    };

    for tx in &parsed.transactions {
        match db.insert_transaction(user_id, tx) {
            Ok(_) => result.imported += 1,
            Err(Error::InvalidData(msg)) => {
                warn!(error = %msg, "Skipping invalid transaction");
                result.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        user_id,
        imported = result.imported,
        skipped = result.skipped,
        "CSV import complete"
    );
    Ok(result)
}

fn parse_row(columns: &Columns, record: &StringRecord) -> Result<NewTransaction> {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let optional = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    let date = parse_timestamp(field(columns.date))?;
    let tx_type: TransactionType = field(columns.tx_type).parse().map_err(Error::Import)?;
    let amount = parse_amount(field(columns.amount))?;

    Ok(NewTransaction {
        tx_type,
        amount,
        description: optional(columns.description),
        category: optional(columns.category),
        currency: optional(columns.currency),
        date,
        is_recurring: false,
        frequency: None,
    })
}

/// Parse `YYYY-MM-DD HH:MM:SS`, RFC 3339, or a bare `YYYY-MM-DD` (midnight), as UTC
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, dropping thousands separators and any sign
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned = s.trim().replace([',', ' '], "");

    let amount = cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))?
        .abs();

    if !amount.is_finite() || amount == 0.0 {
        return Err(Error::Import(format!("Amount must be non-zero: {}", s)));
    }
    Ok(amount)
}
