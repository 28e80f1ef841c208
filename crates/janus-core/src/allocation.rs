//! # Payment Allocation
//!
//! Spreads a received amount over a party's open balances.
//!
//! ## Allocation Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount received: 1000.00                                               │
//! │                                                                         │
//! │  AUTO (oldest first)                                                    │
//! │    INV-001  2025-03-01  open 750.00  ──► 750.00                         │
//! │    INV-008  2025-03-08  open 500.00  ──► 250.00                         │
//! │                                     unallocated: 0.00                   │
//! │                                                                         │
//! │  MANUAL    user types 900 on INV-008 ──► clamp to min(open, available) │
//! │  AUTO-FILL one row ──► min(open, amount − Σ other rows)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here fails on user input: every request is clamped. The open
//! balances belong to the external ledger and are never modified; the
//! engine only proposes amounts against them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// An obligation eligible for allocation (an unpaid invoice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OpenBalanceTarget {
    pub target_id: String,
    pub display_number: String,
    #[ts(as = "String")]
    pub issued_date: NaiveDate,
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Original document total, for display next to the open balance.
    #[serde(default)]
    pub original_amount: Option<Money>,
    pub open_balance: Money,
}

/// A proposed amount against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Allocation {
    pub target_id: String,
    pub allocated_amount: Money,
}

// =============================================================================
// Allocation Engine
// =============================================================================

/// Allocation state for one payment draft.
///
/// ## Invariants
/// - one allocation row per target, in target order
/// - `0 ≤ allocated ≤ open_balance` for every row
/// - `Σ allocated ≤ amount_available`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEngine {
    amount_available: Money,
    targets: Vec<OpenBalanceTarget>,
    allocations: Vec<Allocation>,
}

impl AllocationEngine {
    pub fn new(amount_available: Money, targets: Vec<OpenBalanceTarget>) -> Self {
        let mut engine = AllocationEngine {
            amount_available: amount_available.non_negative(),
            targets: Vec::new(),
            allocations: Vec::new(),
        };
        engine.replace_targets(targets);
        engine
    }

    pub fn amount_available(&self) -> Money {
        self.amount_available
    }

    pub fn targets(&self) -> &[OpenBalanceTarget] {
        &self.targets
    }

    /// Every row, including zero rows, in target order.
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// Rows that actually move money; what gets persisted.
    pub fn nonzero_allocations(&self) -> Vec<Allocation> {
        self.allocations
            .iter()
            .filter(|a| a.allocated_amount.is_positive())
            .cloned()
            .collect()
    }

    pub fn allocated_to(&self, target_id: &str) -> Option<Money> {
        self.allocations
            .iter()
            .find(|a| a.target_id == target_id)
            .map(|a| a.allocated_amount)
    }

    pub fn total_allocated(&self) -> Money {
        self.allocations.iter().map(|a| a.allocated_amount).sum()
    }

    /// Cash not yet assigned to any target. Never negative.
    pub fn unallocated(&self) -> Money {
        (self.amount_available - self.total_allocated()).non_negative()
    }

    /// Loads a fresh snapshot of open balances; all rows reset to zero.
    pub fn replace_targets(&mut self, targets: Vec<OpenBalanceTarget>) {
        self.allocations = targets
            .iter()
            .map(|t| Allocation {
                target_id: t.target_id.clone(),
                allocated_amount: Money::zero(),
            })
            .collect();
        self.targets = targets;
    }

    /// Changes the amount to spread and re-runs oldest-first allocation.
    pub fn set_amount_available(&mut self, amount: Money) {
        self.amount_available = amount.non_negative();
        self.auto_allocate();
    }

    /// Oldest-first allocation over all targets.
    ///
    /// Targets are visited by `issued_date` ascending; equal dates keep
    /// their original relative order (stable sort). Each target takes
    /// `min(remaining, open_balance)`. Leftover cash stays unallocated.
    pub fn auto_allocate(&mut self) {
        let mut order: Vec<usize> = (0..self.targets.len()).collect();
        order.sort_by_key(|&i| self.targets[i].issued_date);

        let mut remaining = self.amount_available;
        for allocation in &mut self.allocations {
            allocation.allocated_amount = Money::zero();
        }
        for i in order {
            if !remaining.is_positive() {
                break;
            }
            let share = remaining.min(self.targets[i].open_balance.non_negative());
            self.allocations[i].allocated_amount = share;
            remaining -= share;
        }

        debug!(
            available = %self.amount_available,
            allocated = %self.total_allocated(),
            unallocated = %self.unallocated(),
            "auto-allocated"
        );
    }

    /// Sets one row to a user-proposed amount; other rows are untouched.
    ///
    /// The request is clamped to `[0, min(open_balance, available for
    /// this row)]`, where the row's availability is the amount not held by
    /// the other rows. Returns the applied amount.
    pub fn set_manual(&mut self, target_id: &str, requested: Money) -> CoreResult<Money> {
        let index = self.index_of(target_id)?;
        let ceiling = self
            .targets[index]
            .open_balance
            .min(self.available_for(index))
            .non_negative();
        let applied = requested.non_negative().min(ceiling);
        self.allocations[index].allocated_amount = applied;

        debug!(target_id, requested = %requested, applied = %applied, "manual allocation");
        Ok(applied)
    }

    /// Fills one row with as much as the other rows leave available,
    /// capped at its open balance. Returns the applied amount.
    pub fn auto_fill(&mut self, target_id: &str) -> CoreResult<Money> {
        let index = self.index_of(target_id)?;
        let applied = self
            .available_for(index)
            .min(self.targets[index].open_balance)
            .non_negative();
        self.allocations[index].allocated_amount = applied;

        debug!(target_id, applied = %applied, "auto-filled allocation");
        Ok(applied)
    }

    /// Resets every row to zero, keeping the targets.
    pub fn clear_allocations(&mut self) {
        for allocation in &mut self.allocations {
            allocation.allocated_amount = Money::zero();
        }
    }

    /// Amount not held by rows other than `index`.
    fn available_for(&self, index: usize) -> Money {
        let others: Money = self
            .allocations
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, a)| a.allocated_amount)
            .sum();
        self.amount_available - others
    }

    fn index_of(&self, target_id: &str) -> CoreResult<usize> {
        self.targets
            .iter()
            .position(|t| t.target_id == target_id)
            .ok_or_else(|| CoreError::TargetNotFound(target_id.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str, date: (i32, u32, u32), open_cents: i64) -> OpenBalanceTarget {
        OpenBalanceTarget {
            target_id: id.to_string(),
            display_number: format!("INV-{}", id),
            issued_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            due_date: None,
            original_amount: None,
            open_balance: Money::from_cents(open_cents),
        }
    }

    fn two_invoices() -> Vec<OpenBalanceTarget> {
        vec![
            target("A", (2025, 3, 1), 75_000),
            target("B", (2025, 3, 8), 50_000),
        ]
    }

    #[test]
    fn test_oldest_first() {
        let mut engine = AllocationEngine::new(Money::zero(), two_invoices());
        engine.set_amount_available(Money::from_cents(100_000));

        assert_eq!(engine.allocated_to("A"), Some(Money::from_cents(75_000)));
        assert_eq!(engine.allocated_to("B"), Some(Money::from_cents(25_000)));
        assert_eq!(engine.unallocated(), Money::zero());
    }

    #[test]
    fn test_oldest_first_ignores_input_order() {
        let mut targets = two_invoices();
        targets.reverse();
        let mut engine = AllocationEngine::new(Money::from_cents(100_000), targets);
        engine.auto_allocate();

        assert_eq!(engine.allocated_to("A"), Some(Money::from_cents(75_000)));
        assert_eq!(engine.allocated_to("B"), Some(Money::from_cents(25_000)));
        // rows stay in caller order
        assert_eq!(engine.allocations()[0].target_id, "B");
    }

    #[test]
    fn test_equal_dates_keep_relative_order() {
        let targets = vec![
            target("X", (2025, 3, 5), 10_000),
            target("Y", (2025, 3, 5), 10_000),
            target("Z", (2025, 3, 1), 10_000),
        ];
        let mut engine = AllocationEngine::new(Money::zero(), targets);
        engine.set_amount_available(Money::from_cents(15_000));

        assert_eq!(engine.allocated_to("Z"), Some(Money::from_cents(10_000)));
        assert_eq!(engine.allocated_to("X"), Some(Money::from_cents(5_000)));
        assert_eq!(engine.allocated_to("Y"), Some(Money::zero()));
    }

    #[test]
    fn test_leftover_is_reported() {
        let mut engine = AllocationEngine::new(Money::zero(), two_invoices());
        engine.set_amount_available(Money::from_cents(200_000));

        assert_eq!(engine.total_allocated(), Money::from_cents(125_000));
        assert_eq!(engine.unallocated(), Money::from_cents(75_000));
    }

    #[test]
    fn test_reducing_amount_reallocates() {
        let mut engine = AllocationEngine::new(Money::zero(), two_invoices());
        engine.set_amount_available(Money::from_cents(100_000));
        engine.set_amount_available(Money::from_cents(10_000));

        assert_eq!(engine.allocated_to("A"), Some(Money::from_cents(10_000)));
        assert_eq!(engine.allocated_to("B"), Some(Money::zero()));
        assert_eq!(engine.nonzero_allocations().len(), 1);
    }

    #[test]
    fn test_manual_clamps_to_open_balance() {
        let mut engine = AllocationEngine::new(Money::from_cents(500_000), two_invoices());

        let applied = engine.set_manual("B", Money::from_cents(90_000)).unwrap();
        assert_eq!(applied, Money::from_cents(50_000));
        assert_eq!(engine.allocated_to("A"), Some(Money::zero()));
    }

    #[test]
    fn test_manual_clamps_to_remaining_amount() {
        let mut engine = AllocationEngine::new(Money::zero(), two_invoices());
        engine.set_amount_available(Money::from_cents(100_000));

        // A holds 750.00, so B can take at most 250.00
        let applied = engine.set_manual("B", Money::from_cents(50_000)).unwrap();
        assert_eq!(applied, Money::from_cents(25_000));
        assert!(engine.total_allocated() <= engine.amount_available());
    }

    #[test]
    fn test_manual_negative_is_zero() {
        let mut engine = AllocationEngine::new(Money::from_cents(1_000), two_invoices());
        let applied = engine.set_manual("A", Money::from_cents(-1)).unwrap();
        assert_eq!(applied, Money::zero());
    }

    #[test]
    fn test_auto_fill() {
        let mut engine = AllocationEngine::new(Money::from_cents(100_000), two_invoices());
        engine.set_manual("A", Money::from_cents(60_000)).unwrap();

        let filled = engine.auto_fill("B").unwrap();
        assert_eq!(filled, Money::from_cents(40_000));
        assert_eq!(engine.unallocated(), Money::zero());

        // Nothing left for A beyond what it already holds
        let refilled = engine.auto_fill("A").unwrap();
        assert_eq!(refilled, Money::from_cents(60_000));
    }

    #[test]
    fn test_auto_fill_capped_by_open_balance() {
        let mut engine = AllocationEngine::new(Money::from_cents(100_000), two_invoices());
        assert_eq!(engine.auto_fill("B").unwrap(), Money::from_cents(50_000));
    }

    #[test]
    fn test_unknown_target() {
        let mut engine = AllocationEngine::new(Money::from_cents(100), two_invoices());
        assert_eq!(
            engine.set_manual("nope", Money::from_cents(1)),
            Err(CoreError::TargetNotFound("nope".to_string()))
        );
        assert!(engine.auto_fill("nope").is_err());
    }

    #[test]
    fn test_replace_targets_resets() {
        let mut engine = AllocationEngine::new(Money::zero(), two_invoices());
        engine.set_amount_available(Money::from_cents(100_000));
        engine.replace_targets(vec![target("C", (2025, 3, 15), 187_500)]);

        assert_eq!(engine.total_allocated(), Money::zero());
        assert_eq!(engine.allocations().len(), 1);
    }
}
