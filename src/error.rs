use std::process::ExitCode;

/**
 * Every variant aborts the run, there is no recoverable class.
 */
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("malformed amount {value:?} in {field} of {kind:?} transaction: {reason}")]
    MalformedAmount {
        kind: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("malformed conversion notes {notes:?}: {reason}")]
    MalformedConversionNotes { notes: String, reason: String },

    #[error("unknown transaction kind {kind:?} for asset {asset:?}")]
    UnknownTransactionKind { kind: String, asset: String },

    #[error("row is missing column {index} ({column})")]
    MissingColumn { index: usize, column: &'static str },

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl BalanceError {
    fn exit_status(&self) -> u8 {
        match self {
            BalanceError::Io { .. } | BalanceError::Csv(_) => 1,
            BalanceError::MalformedAmount { .. }
            | BalanceError::MalformedConversionNotes { .. }
            | BalanceError::MissingColumn { .. } => 2,
            BalanceError::UnknownTransactionKind { .. } => 3,
        }
    }
}

impl From<&BalanceError> for ExitCode {
    fn from(err: &BalanceError) -> Self {
        ExitCode::from(err.exit_status())
    }
}
