//! Energy ledger
//!
//! A single process-wide counter gating restoration jobs. Debits are
//! optimistic: the flow consumes before the remote call and compensates
//! with a grant on any non-success path, so the only operations the ledger
//! needs are `consume` and `grant`.

use std::sync::Mutex;

/// The spendable energy balance.
///
/// The balance is an unsigned counter behind a mutex: both operations are
/// atomic read-modify-writes, so the never-negative invariant holds even if
/// callers race.
#[derive(Debug)]
pub struct CreditLedger {
    balance: Mutex<u32>,
}

impl CreditLedger {
    pub fn new(initial: u32) -> Self {
        Self {
            balance: Mutex::new(initial),
        }
    }

    /// Current balance
    pub fn balance(&self) -> u32 {
        *self.balance.lock().unwrap()
    }

    /// Debit `amount` if the balance covers it. Returns false with no
    /// mutation otherwise.
    pub fn consume(&self, amount: u32) -> bool {
        let mut balance = self.balance.lock().unwrap();
        if *balance >= amount {
            *balance -= amount;
            tracing::debug!(amount, remaining = *balance, "Energy consumed");
            true
        } else {
            tracing::debug!(amount, available = *balance, "Energy consume rejected");
            false
        }
    }

    /// Credit `amount` unconditionally. Used for rewards and refunds alike.
    pub fn grant(&self, amount: u32) {
        let mut balance = self.balance.lock().unwrap();
        *balance = balance.saturating_add(amount);
        tracing::debug!(amount, balance = *balance, "Energy granted");
    }
}

impl Default for CreditLedger {
    fn default() -> Self {
        Self::new(0)
    }
}
