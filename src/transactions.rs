use std::{fs, io::Cursor, path::Path};

use bigdecimal::BigDecimal;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::amount::{parse_amount, parse_grouped_amount};
use crate::error::BalanceError;

const KIND_COLUMN: usize = 1;
const ASSET_COLUMN: usize = 2;
const AMOUNT_COLUMN: usize = 3;
const NOTES_COLUMN: usize = 9;

/**
 * "Converted 0.01 BTC to 500.00 USDC": tokens 0 and 3 are opaque,
 * anything past the sixth token is ignored.
 */
const CONVERSION_TOKENS: usize = 6;

pub const DEFAULT_HEADER_MARKER: &str = "Transaction Type";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Buy,
    PaidForAnOrder,
    Receive,
    Send,
    Sell,
    Convert,
    Unrecognized(String),
}

impl From<&str> for TransactionKind {
    fn from(kind: &str) -> Self {
        match kind {
            "Buy" => TransactionKind::Buy,
            "Paid for an order" => TransactionKind::PaidForAnOrder,
            "Receive" => TransactionKind::Receive,
            "Send" => TransactionKind::Send,
            "Sell" => TransactionKind::Sell,
            "Convert" => TransactionKind::Convert,
            other => TransactionKind::Unrecognized(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegDirection {
    Sell,
    Buy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionLeg {
    pub direction: LegDirection,
    pub asset: String,
    pub amount: BigDecimal,
}

/**
 * Read-only view over one exported row, columns are addressed by position.
 */
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    fields: StringRecord,
    line: Option<u64>,
}

impl From<StringRecord> for TransactionRecord {
    fn from(fields: StringRecord) -> Self {
        let line = fields.position().map(|position| position.line());
        TransactionRecord { fields, line }
    }
}

impl TransactionRecord {
    #[cfg(test)]
    pub fn from_fields<I, T>(fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        fields.into_iter().collect::<StringRecord>().into()
    }

    /// Source line in the input file, when read from one.
    pub fn line(&self) -> Option<u64> {
        self.line
    }

    fn column(&self, index: usize, column: &'static str) -> Result<&str, BalanceError> {
        self.fields
            .get(index)
            .ok_or(BalanceError::MissingColumn { index, column })
    }

    /// The raw type string, unnormalized.
    pub fn kind(&self) -> Result<&str, BalanceError> {
        self.column(KIND_COLUMN, "kind")
    }

    pub fn transaction_kind(&self) -> Result<TransactionKind, BalanceError> {
        Ok(self.kind()?.into())
    }

    pub fn asset(&self) -> Result<&str, BalanceError> {
        self.column(ASSET_COLUMN, "asset")
    }

    pub fn amount(&self) -> Result<BigDecimal, BalanceError> {
        let value = self.column(AMOUNT_COLUMN, "amount")?;
        parse_amount(value).map_err(|e| BalanceError::MalformedAmount {
            kind: self.fields.get(KIND_COLUMN).unwrap_or_default().to_string(),
            field: "amount",
            value: value.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn notes(&self) -> Result<&str, BalanceError> {
        self.column(NOTES_COLUMN, "notes")
    }

    /// Sell leg first, then buy leg.
    pub fn conversion(&self) -> Result<(ConversionLeg, ConversionLeg), BalanceError> {
        extract_conversion_legs(self.notes()?)
    }
}

fn malformed_notes(notes: &str, reason: String) -> BalanceError {
    BalanceError::MalformedConversionNotes {
        notes: notes.to_string(),
        reason,
    }
}

fn conversion_leg(
    notes: &str,
    direction: LegDirection,
    amount: &str,
    asset: &str,
) -> Result<ConversionLeg, BalanceError> {
    let amount = parse_grouped_amount(amount).map_err(|e| {
        malformed_notes(
            notes,
            format!("bad {:?} amount {:?}: {}", direction, amount, e),
        )
    })?;
    Ok(ConversionLeg {
        direction,
        asset: asset.to_string(),
        amount,
    })
}

pub fn extract_conversion_legs(
    notes: &str,
) -> Result<(ConversionLeg, ConversionLeg), BalanceError> {
    let tokens: Vec<&str> = notes.split_whitespace().collect();
    if tokens.len() < CONVERSION_TOKENS {
        return Err(malformed_notes(
            notes,
            format!(
                "expected {} whitespace separated tokens, found {}",
                CONVERSION_TOKENS,
                tokens.len()
            ),
        ));
    }

    let sell = conversion_leg(notes, LegDirection::Sell, tokens[1], tokens[2])?;
    let buy = conversion_leg(notes, LegDirection::Buy, tokens[4], tokens[5])?;
    Ok((sell, buy))
}

/// The marker has to be a whole field of the line, not just appear in it.
fn is_header(line: &str, header_marker: &str) -> bool {
    line.trim_end_matches(['\r', '\n'])
        .split(',')
        .any(|field| field.trim().trim_matches('"') == header_marker)
}

fn header_offset(content: &str, header_marker: &str) -> Option<(usize, u64)> {
    let mut offset = 0;
    for (skipped, line) in content.split_inclusive('\n').enumerate() {
        if is_header(line, header_marker) {
            return Some((offset, skipped as u64));
        }
        offset += line.len();
    }
    None
}

/**
 * Exports start with a few lines of free text before the header row,
 * everything above the first line with a `header_marker` field is dropped.
 * The header row itself never comes out as a record.
 */
pub fn parse_transactions(
    mut content: String,
    header_marker: &str,
) -> impl Iterator<Item = Result<TransactionRecord, BalanceError>> {
    let skipped_lines = match header_offset(&content, header_marker) {
        Some((offset, skipped_lines)) => {
            content.replace_range(..offset, "");
            skipped_lines
        }
        None => {
            warn!(
                header_marker,
                "no header row found, treating the first line as the header"
            );
            0
        }
    };
    if skipped_lines > 0 {
        debug!(skipped_lines, "skipped preamble");
    }

    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(content));

    reader.into_records().map(
        move |result: Result<StringRecord, csv::Error>| -> Result<TransactionRecord, BalanceError> {
            let mut record = TransactionRecord::from(result?);
            record.line = record.line.map(|line| line + skipped_lines);
            Ok(record)
        },
    )
}

pub fn csv_to_transaction_records(
    path: &Path,
    header_marker: &str,
) -> Result<impl Iterator<Item = Result<TransactionRecord, BalanceError>>, BalanceError> {
    let content = fs::read_to_string(path).map_err(|source| BalanceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_transactions(content, header_marker))
}
