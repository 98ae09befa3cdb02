//! Balance reconciliation for the resource ledger.
//!
//! For every resource R:
//!
//! ```text
//! opening(R) + sum(credits for R) - sum(debits for R) == live(R)
//! ```
//!
//! Each entry also carries `balance_after`, so the replay additionally
//! checks that the running total matches what was recorded at the time.
//! The live balances are only ever written together with an entry, so the
//! check passes by construction; it guards against future code paths that
//! touch balances directly.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use demeter_types::{EntryDirection, LedgerEntry, Resource};

use crate::LedgerAnomaly;

/// The result of replaying the ledger history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileResult {
    /// Replayed balances match the live balances.
    Balanced,
    /// One or more resources diverged.
    Anomaly(LedgerAnomaly),
}

impl ReconcileResult {
    /// Whether the ledger reconciled.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Replay `entries` on top of `opening` and compare with `live`.
pub fn verify_balances(
    opening: &BTreeMap<Resource, Decimal>,
    live: &BTreeMap<Resource, Decimal>,
    entries: &[LedgerEntry],
) -> ReconcileResult {
    let mut replayed: BTreeMap<Resource, Decimal> = Resource::ALL
        .iter()
        .map(|r| (*r, opening.get(r).copied().unwrap_or(Decimal::ZERO)))
        .collect();
    let mut mismatches: BTreeMap<Resource, (Decimal, Decimal)> = BTreeMap::new();

    for entry in entries {
        let running = replayed.entry(entry.resource).or_insert(Decimal::ZERO);
        let next = match entry.direction {
            EntryDirection::Credit => running.checked_add(entry.amount),
            EntryDirection::Debit => running.checked_sub(entry.amount),
        };
        let Some(next) = next else {
            return overflow_anomaly(entry.resource);
        };
        *running = next;

        if next != entry.balance_after || next < Decimal::ZERO {
            mismatches.insert(entry.resource, (next, entry.balance_after));
        }
    }

    for resource in Resource::ALL {
        let replayed_balance = replayed.get(&resource).copied().unwrap_or(Decimal::ZERO);
        let live_balance = live.get(&resource).copied().unwrap_or(Decimal::ZERO);
        if replayed_balance != live_balance {
            mismatches.insert(resource, (replayed_balance, live_balance));
        }
    }

    if mismatches.is_empty() {
        ReconcileResult::Balanced
    } else {
        let count = mismatches.len();
        ReconcileResult::Anomaly(LedgerAnomaly {
            mismatches,
            message: format!("LEDGER_ANOMALY: replay diverged for {count} resource(s)"),
        })
    }
}

/// Construct an anomaly result for arithmetic overflow during replay.
fn overflow_anomaly(resource: Resource) -> ReconcileResult {
    let mut mismatches = BTreeMap::new();
    mismatches.insert(resource, (Decimal::ZERO, Decimal::ZERO));
    ReconcileResult::Anomaly(LedgerAnomaly {
        mismatches,
        message: format!("LEDGER_ANOMALY: arithmetic overflow replaying {resource}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use demeter_types::LedgerEntryId;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ResourceLedger;

    fn entry(resource: Resource, direction: EntryDirection, amount: Decimal, after: Decimal) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            cycle: 0,
            resource,
            direction,
            amount,
            balance_after: after,
            reason: "TEST".to_owned(),
            recorded_at: Utc::now(),
        }
    }

    fn balances(money: Decimal) -> BTreeMap<Resource, Decimal> {
        [
            (Resource::Money, money),
            (Resource::Water, dec!(0)),
            (Resource::Research, dec!(0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn ledger_activity_reconciles() {
        let mut ledger = ResourceLedger::new(dec!(1000), dec!(500), dec!(0)).unwrap();
        let _ = ledger.debit(Resource::Money, dec!(10), 0, "SEED");
        let _ = ledger.debit(Resource::Water, dec!(10), 0, "IRRIGATION");
        let _ = ledger.credit(Resource::Money, dec!(82.5), 3, "HARVEST");
        let _ = ledger.credit(Resource::Research, dec!(8), 3, "HARVEST");
        let _ = ledger.debit(Resource::Money, dec!(9999), 3, "REJECTED");

        assert!(ledger.verify_balances().is_balanced());
    }

    #[test]
    fn detects_live_balance_drift() {
        let opening = balances(dec!(100));
        let live = balances(dec!(95));
        let entries = vec![entry(Resource::Money, EntryDirection::Debit, dec!(10), dec!(90))];

        let mismatch = match verify_balances(&opening, &live, &entries) {
            ReconcileResult::Anomaly(anomaly) => anomaly.mismatches.get(&Resource::Money).copied(),
            ReconcileResult::Balanced => None,
        };
        assert_eq!(mismatch, Some((dec!(90), dec!(95))));
    }

    #[test]
    fn detects_wrong_recorded_running_balance() {
        let opening = balances(dec!(100));
        let live = balances(dec!(110));
        let entries = vec![entry(Resource::Money, EntryDirection::Credit, dec!(10), dec!(120))];

        let result = verify_balances(&opening, &live, &entries);
        assert!(!result.is_balanced());
    }
}
