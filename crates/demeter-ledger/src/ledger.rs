//! The resource ledger: guarded balances with an append-only history.
//!
//! # Design
//!
//! - **Guarded**: a debit that would make a balance negative fails with
//!   [`LedgerError::InsufficientBalance`] and changes nothing.
//! - **Append-only**: every successful mutation appends one
//!   [`LedgerEntry`]; entries are never modified or deleted.
//! - **Precision**: all amounts use [`Decimal`] -- no floating point.
//! - **Unbounded above**: credits only fail on arithmetic overflow.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use demeter_types::{EntryDirection, LedgerEntry, LedgerEntryId, Resource};

use crate::LedgerError;
use crate::reconcile::{ReconcileResult, verify_balances};

/// Balances of every player resource plus the history that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    /// Balances at session start.
    opening: BTreeMap<Resource, Decimal>,
    /// Live balances.
    balances: BTreeMap<Resource, Decimal>,
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
}

impl ResourceLedger {
    /// Create a ledger with the given opening balances.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeQuantity`] for a negative opening
    /// balance.
    pub fn new(money: Decimal, water: Decimal, research: Decimal) -> Result<Self, LedgerError> {
        let opening: BTreeMap<Resource, Decimal> = [
            (Resource::Money, money),
            (Resource::Water, water),
            (Resource::Research, research),
        ]
        .into_iter()
        .collect();
        if let Some(&amount) = opening.values().find(|v| **v < Decimal::ZERO) {
            return Err(LedgerError::NegativeQuantity { amount });
        }

        Ok(Self {
            balances: opening.clone(),
            opening,
            entries: Vec::new(),
        })
    }

    /// Current balance of `resource`.
    pub fn balance(&self, resource: Resource) -> Decimal {
        self.balances.get(&resource).copied().unwrap_or(Decimal::ZERO)
    }

    /// Opening balance of `resource`.
    pub fn opening_balance(&self, resource: Resource) -> Decimal {
        self.opening.get(&resource).copied().unwrap_or(Decimal::ZERO)
    }

    /// Whether a debit of `amount` would succeed.
    pub fn can_afford(&self, resource: Resource, amount: Decimal) -> bool {
        self.balance(resource) >= amount
    }

    /// Add `amount` to `resource`. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroQuantity`] or
    /// [`LedgerError::NegativeQuantity`] for non-positive amounts and
    /// [`LedgerError::Overflow`] if the balance cannot represent the sum.
    pub fn credit(
        &mut self,
        resource: Resource,
        amount: Decimal,
        cycle: u64,
        reason: &str,
    ) -> Result<Decimal, LedgerError> {
        validate_amount(amount)?;
        let new_balance = self
            .balance(resource)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { resource })?;
        self.commit(resource, EntryDirection::Credit, amount, new_balance, cycle, reason);
        Ok(new_balance)
    }

    /// Remove `amount` from `resource`. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] if the balance is
    /// smaller than `amount`, and the amount validation errors of
    /// [`credit`](Self::credit).
    pub fn debit(
        &mut self,
        resource: Resource,
        amount: Decimal,
        cycle: u64,
        reason: &str,
    ) -> Result<Decimal, LedgerError> {
        validate_amount(amount)?;
        let balance = self.balance(resource);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                resource,
                balance,
                requested: amount,
            });
        }
        let new_balance = balance.checked_sub(amount).ok_or(LedgerError::InsufficientBalance {
            resource,
            balance,
            requested: amount,
        })?;
        self.commit(resource, EntryDirection::Debit, amount, new_balance, cycle, reason);
        Ok(new_balance)
    }

    /// Record a validated mutation.
    fn commit(
        &mut self,
        resource: Resource,
        direction: EntryDirection,
        amount: Decimal,
        balance_after: Decimal,
        cycle: u64,
        reason: &str,
    ) {
        self.balances.insert(resource, balance_after);
        self.entries.push(LedgerEntry {
            id: LedgerEntryId::new(),
            cycle,
            resource,
            direction,
            amount,
            balance_after,
            reason: reason.to_owned(),
            recorded_at: Utc::now(),
        });
        debug!(
            %resource,
            ?direction,
            %amount,
            %balance_after,
            cycle,
            reason,
            "Ledger entry recorded"
        );
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether no mutation has been recorded yet.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return all entries, in insertion order.
    pub fn all_entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Net change per resource within one cycle.
    ///
    /// Positive means the resource grew over the cycle.
    pub fn net_flow_for_cycle(&self, cycle: u64) -> BTreeMap<Resource, Decimal> {
        let mut flows: BTreeMap<Resource, Decimal> = BTreeMap::new();

        for entry in self.entries.iter().filter(|e| e.cycle == cycle) {
            let v = flows.entry(entry.resource).or_insert(Decimal::ZERO);
            *v = match entry.direction {
                EntryDirection::Credit => v.saturating_add(entry.amount),
                EntryDirection::Debit => v.saturating_sub(entry.amount),
            };
        }

        flows
    }

    /// Replay the entry log and compare it with the live balances.
    pub fn verify_balances(&self) -> ReconcileResult {
        verify_balances(&self.opening, &self.balances, &self.entries)
    }
}

/// Reject zero and negative amounts.
fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroQuantity);
    }
    if amount.is_sign_negative() {
        return Err(LedgerError::NegativeQuantity { amount });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn starting_ledger() -> ResourceLedger {
        ResourceLedger::new(dec!(1000), dec!(500), dec!(0)).unwrap()
    }

    #[test]
    fn new_ledger_holds_opening_balances() {
        let ledger = starting_ledger();
        assert!(ledger.is_empty());
        assert_eq!(ledger.balance(Resource::Money), dec!(1000));
        assert_eq!(ledger.balance(Resource::Water), dec!(500));
        assert_eq!(ledger.balance(Resource::Research), dec!(0));
    }

    #[test]
    fn debit_reduces_balance_and_records_entry() {
        let mut ledger = starting_ledger();
        let result = ledger.debit(Resource::Money, dec!(10), 0, "SEED");
        assert_eq!(result, Ok(dec!(990)));
        assert_eq!(ledger.len(), 1);

        let entry = ledger.all_entries().first().cloned();
        assert_eq!(entry.as_ref().map(|e| e.direction), Some(EntryDirection::Debit));
        assert_eq!(entry.as_ref().map(|e| e.balance_after), Some(dec!(990)));
        assert_eq!(entry.map(|e| e.reason), Some("SEED".to_owned()));
    }

    #[test]
    fn debit_below_zero_is_rejected_not_clamped() {
        let mut ledger = starting_ledger();
        let result = ledger.debit(Resource::Water, dec!(501), 0, "IRRIGATION");
        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance {
                resource: Resource::Water,
                balance: dec!(500),
                requested: dec!(501),
            })
        );
        assert_eq!(ledger.balance(Resource::Water), dec!(500));
        assert!(ledger.is_empty());
    }

    #[test]
    fn debit_of_entire_balance_reaches_zero() {
        let mut ledger = starting_ledger();
        assert_eq!(ledger.debit(Resource::Water, dec!(500), 0, "DROUGHT"), Ok(dec!(0)));
        assert!(!ledger.can_afford(Resource::Water, dec!(0.1)));
    }

    #[test]
    fn credit_is_unbounded_above() {
        let mut ledger = starting_ledger();
        assert_eq!(ledger.credit(Resource::Money, dec!(1000000), 0, "GRANT"), Ok(dec!(1001000)));
    }

    #[test]
    fn non_positive_amounts_rejected() {
        let mut ledger = starting_ledger();
        assert_eq!(ledger.credit(Resource::Money, dec!(0), 0, "X"), Err(LedgerError::ZeroQuantity));
        assert_eq!(
            ledger.debit(Resource::Money, dec!(-5), 0, "X"),
            Err(LedgerError::NegativeQuantity { amount: dec!(-5) })
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn net_flow_per_cycle() {
        let mut ledger = starting_ledger();
        let _ = ledger.debit(Resource::Money, dec!(10), 1, "SEED");
        let _ = ledger.credit(Resource::Money, dec!(75), 1, "HARVEST");
        let _ = ledger.credit(Resource::Research, dec!(7), 1, "HARVEST");
        let _ = ledger.debit(Resource::Water, dec!(10), 2, "IRRIGATION");

        let flows = ledger.net_flow_for_cycle(1);
        assert_eq!(flows.get(&Resource::Money).copied(), Some(dec!(65)));
        assert_eq!(flows.get(&Resource::Research).copied(), Some(dec!(7)));
        assert_eq!(flows.get(&Resource::Water), None);
        assert_eq!(ledger.net_flow_for_cycle(2).get(&Resource::Water).copied(), Some(dec!(-10)));
    }

    #[test]
    fn negative_opening_is_rejected() {
        assert_eq!(
            ResourceLedger::new(dec!(100), dec!(-5), dec!(0)),
            Err(LedgerError::NegativeQuantity { amount: dec!(-5) })
        );
        let empty = ResourceLedger::new(dec!(0), dec!(0), dec!(0)).unwrap();
        assert_eq!(empty.opening_balance(Resource::Money), dec!(0));
    }
}
