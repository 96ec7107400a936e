use tracing::{debug, error};

use crate::error::BalanceError;
use crate::ledger::LedgerRegistry;
use crate::transactions::{LegDirection, TransactionKind, TransactionRecord};

/**
 * Applies records strictly in input order. The first record that cannot be
 * applied stops the run, later records are never looked at.
 */
pub struct Dispatcher<'r> {
    registry: &'r mut LedgerRegistry,
    processed: usize,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r mut LedgerRegistry) -> Self {
        Dispatcher {
            registry,
            processed: 0,
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn execute_transaction(&mut self, record: &TransactionRecord) -> Result<(), BalanceError> {
        let asset = record.asset()?;
        let kind = record.transaction_kind()?;
        debug!(line = ?record.line(), ?kind, asset, "dispatching transaction");

        // The row's own asset is registered first, conversions and unknown kinds included
        let ledger = self.registry.fetch(asset);

        match kind {
            TransactionKind::Buy | TransactionKind::Receive => ledger.credit(record.amount()?),
            TransactionKind::PaidForAnOrder | TransactionKind::Send | TransactionKind::Sell => {
                ledger.debit(record.amount()?)
            }
            TransactionKind::Convert => {
                // Both legs parse before either ledger moves
                let (sell, buy) = record.conversion()?;
                for leg in [sell, buy] {
                    debug!(
                        direction = ?leg.direction,
                        asset = %leg.asset,
                        amount = %leg.amount,
                        "conversion leg"
                    );
                    let ledger = self.registry.fetch(&leg.asset);
                    match leg.direction {
                        LegDirection::Sell => ledger.debit(leg.amount),
                        LegDirection::Buy => ledger.credit(leg.amount),
                    }
                }
            }
            TransactionKind::Unrecognized(kind) => {
                return Err(BalanceError::UnknownTransactionKind {
                    kind,
                    asset: asset.to_string(),
                });
            }
        }

        self.processed += 1;
        Ok(())
    }

    pub fn process<I>(&mut self, records: I) -> Result<(), BalanceError>
    where
        I: IntoIterator<Item = Result<TransactionRecord, BalanceError>>,
    {
        for record in records {
            let record = record?;
            if let Err(err) = self.execute_transaction(&record) {
                error!(
                    line = ?record.line(),
                    kind = record.kind().unwrap_or("?"),
                    asset = record.asset().unwrap_or("?"),
                    processed = self.processed,
                    "transaction could not be applied"
                );
                return Err(err);
            }
        }
        Ok(())
    }
}
