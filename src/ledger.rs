use std::{collections::HashMap, fmt::Display};

use bigdecimal::BigDecimal;

use crate::amount::format_balance;

/**
 * Balance starts at zero and is the exact sum of every credit and debit
 * applied to it, the sign is decided by the caller's choice of operation.
 */
#[derive(Debug)]
pub struct BalanceLedger {
    asset: String,
    balance: BigDecimal,
}

impl BalanceLedger {
    fn new(asset: &str) -> Self {
        BalanceLedger {
            asset: asset.to_string(),
            balance: BigDecimal::default(),
        }
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn balance(&self) -> &BigDecimal {
        &self.balance
    }

    pub fn credit(&mut self, amount: BigDecimal) {
        self.balance += amount;
    }

    pub fn debit(&mut self, amount: BigDecimal) {
        self.balance -= amount;
    }

    pub fn report(&self) -> String {
        format!("{}: {}", self.asset, format_balance(&self.balance))
    }
}

/**
 * One ledger per asset, kept in the order assets were first fetched.
 */
#[derive(Default)]
pub struct LedgerRegistry {
    ledgers: Vec<BalanceLedger>,
    index: HashMap<String, usize>,
}

impl Display for LedgerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (position, ledger) in self.ledgers.iter().enumerate() {
            if position > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", ledger.report())?;
        }
        Ok(())
    }
}

impl LedgerRegistry {
    /// Get-or-create, registering `asset` on first use.
    pub fn fetch(&mut self, asset: &str) -> &mut BalanceLedger {
        let position = match self.index.get(asset).copied() {
            Some(position) => position,
            None => {
                self.ledgers.push(BalanceLedger::new(asset));
                let position = self.ledgers.len() - 1;
                self.index.insert(asset.to_string(), position);
                position
            }
        };
        &mut self.ledgers[position]
    }

    #[cfg(test)]
    pub fn get(&self, asset: &str) -> Option<&BalanceLedger> {
        self.index.get(asset).map(|position| &self.ledgers[*position])
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BalanceLedger> {
        self.ledgers.iter()
    }

    pub fn summarize(&self) -> String {
        self.to_string()
    }
}
