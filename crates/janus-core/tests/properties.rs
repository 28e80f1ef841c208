//! Property-based tests for line arithmetic, totals and allocation.
//!
//! Run with: `cargo test -p janus-core --test properties`

use chrono::NaiveDate;
use janus_core::allocation::{AllocationEngine, OpenBalanceTarget};
use janus_core::line_items::{LineItem, LineItemEngine, LinePatch};
use janus_core::linker::{CrossDocumentLinker, SourceDocument, SourceLine};
use janus_core::totals::compute_totals;
use janus_core::{DocumentKind, Money, OtherFees, ProductRef, Quantity, SourceDocumentRef, TaxRate};
use proptest::prelude::*;

// ── Proptest Strategies ─────────────────────────────────────────────────────

/// A price between 0.00 and 99 999.99.
fn arb_price() -> impl Strategy<Value = Money> {
    (0i64..10_000_000).prop_map(Money::from_cents)
}

/// A quantity between 0 and 1 000 units, to the thousandth.
fn arb_quantity() -> impl Strategy<Value = Quantity> {
    (0i64..1_000_000).prop_map(Quantity::from_milli)
}

/// A tax rate between 0% and 30%, in basis points.
fn arb_tax() -> impl Strategy<Value = TaxRate> {
    (0u32..=3_000).prop_map(TaxRate::from_bps)
}

fn arb_row() -> impl Strategy<Value = (Quantity, Money, TaxRate)> {
    (arb_quantity(), arb_price(), arb_tax())
}

fn arb_targets() -> impl Strategy<Value = Vec<OpenBalanceTarget>> {
    prop::collection::vec((0u32..60, 0i64..500_000), 0..8).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (day_offset, open))| OpenBalanceTarget {
                target_id: format!("T{}", i),
                display_number: format!("INV-2503-{:03}", i),
                issued_date: NaiveDate::from_ymd_opt(2025, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(day_offset as u64))
                    .unwrap(),
                due_date: None,
                original_amount: None,
                open_balance: Money::from_cents(open),
            })
            .collect()
    })
}

fn engine_from(rows: &[(Quantity, Money, TaxRate)]) -> LineItemEngine {
    let mut engine = LineItemEngine::new();
    for (quantity, price, tax) in rows {
        let id = engine.add_line().id.clone();
        engine
            .update_line(
                &id,
                LinePatch::new()
                    .quantity(*quantity)
                    .unit_price(*price)
                    .tax_rate(*tax),
            )
            .unwrap();
    }
    engine
}

fn imported(quantity: Quantity, price: Money, tax: TaxRate) -> LineItem {
    LineItem::imported(
        SourceDocumentRef {
            id: "po-1".into(),
            number: "PO-2503-001".into(),
        },
        Some(ProductRef("1".into())),
        "Raw Material A".into(),
        "kg".into(),
        quantity,
        price,
        tax,
    )
}

// ── Property Tests ──────────────────────────────────────────────────────────

proptest! {
    /// Derived fields always agree with the inputs after an update.
    #[test]
    fn line_arithmetic_holds((quantity, price, tax) in arb_row()) {
        let engine = engine_from(&[(quantity, price, tax)]);
        let line = &engine.lines()[0];

        prop_assert_eq!(line.amount(), price.times(quantity));
        prop_assert_eq!(line.tax_amount(), line.amount().calculate_tax(tax));
        prop_assert_eq!(line.total_amount(), line.amount() + line.tax_amount());
    }

    /// Whole-unit quantities multiply exactly.
    #[test]
    fn whole_units_are_exact(units in 0i64..1_000, price in arb_price()) {
        prop_assert_eq!(
            price.times(Quantity::from_units(units)).cents(),
            price.cents() * units
        );
    }

    /// Grand total is Σ totals + fees, whatever the line order.
    #[test]
    fn totals_are_order_independent(
        rows in prop::collection::vec(arb_row(), 0..10),
        fee in 0i64..100_000,
    ) {
        let fees = OtherFees { description: "Freight".into(), amount: Money::from_cents(fee) };
        let forward = engine_from(&rows);
        let mut reversed_lines = forward.lines().to_vec();
        reversed_lines.reverse();

        let totals = compute_totals(forward.lines(), &fees, None);
        let sum: Money = forward.lines().iter().map(LineItem::total_amount).sum();

        prop_assert_eq!(totals.grand_total, sum + fees.amount);
        prop_assert_eq!(totals.gross_total, totals.net_total + totals.tax_total);
        prop_assert_eq!(totals, compute_totals(&reversed_lines, &fees, None));
    }

    /// Clamping is idempotent and never exceeds the original quantity.
    #[test]
    fn consumable_clamp_is_idempotent(
        (quantity, price, tax) in arb_row(),
        requested in -1_000_000i64..5_000_000,
    ) {
        let mut engine = LineItemEngine::new();
        engine.append(vec![imported(quantity, price, tax)]);
        let id = engine.lines()[0].id.clone();

        let applied = engine
            .update_consumable_quantity(&id, Quantity::from_milli(requested))
            .unwrap();
        prop_assert!(applied >= Quantity::zero());
        prop_assert!(applied <= quantity);
        if requested >= quantity.milli() {
            prop_assert_eq!(applied, quantity);
        }

        let again = engine.update_consumable_quantity(&id, applied).unwrap();
        prop_assert_eq!(again, applied);

        let line = &engine.lines()[0];
        prop_assert_eq!(line.original_quantity, quantity);
        prop_assert_eq!(line.amount(), price.times(applied));
    }

    /// Auto-allocation respects every ceiling.
    #[test]
    fn auto_allocation_is_bounded(
        targets in arb_targets(),
        available in 0i64..2_000_000,
    ) {
        let mut engine = AllocationEngine::new(Money::zero(), targets.clone());
        engine.set_amount_available(Money::from_cents(available));

        prop_assert!(engine.total_allocated() <= engine.amount_available());
        prop_assert_eq!(
            engine.total_allocated() + engine.unallocated(),
            engine.amount_available()
        );
        for (allocation, target) in engine.allocations().iter().zip(&targets) {
            prop_assert!(allocation.allocated_amount >= Money::zero());
            prop_assert!(allocation.allocated_amount <= target.open_balance);
        }

        // Leftover cash only when every target is fully paid
        if engine.unallocated().is_positive() {
            for (allocation, target) in engine.allocations().iter().zip(&targets) {
                prop_assert_eq!(allocation.allocated_amount, target.open_balance);
            }
        }
    }

    /// Manual edits and auto-fill keep the set within the amount available.
    #[test]
    fn manual_allocation_is_bounded(
        targets in arb_targets(),
        available in 0i64..2_000_000,
        edits in prop::collection::vec((0usize..8, -10_000i64..1_000_000, any::<bool>()), 0..12),
    ) {
        let mut engine = AllocationEngine::new(Money::zero(), targets.clone());
        engine.set_amount_available(Money::from_cents(available));

        for (index, amount, fill) in edits {
            let Some(target) = targets.get(index) else { continue };
            let applied = if fill {
                engine.auto_fill(&target.target_id).unwrap()
            } else {
                engine.set_manual(&target.target_id, Money::from_cents(amount)).unwrap()
            };
            prop_assert!(applied >= Money::zero());
            prop_assert!(applied <= target.open_balance);
            prop_assert!(engine.total_allocated() <= engine.amount_available());
        }
    }

    /// Importing the same sources again never adds lines.
    #[test]
    fn reimport_adds_nothing(line_counts in prop::collection::vec(0usize..5, 1..4)) {
        let sources: Vec<SourceDocument> = line_counts
            .iter()
            .enumerate()
            .map(|(i, count)| SourceDocument {
                id: format!("po-{}", i),
                number: format!("PO-2503-{:03}", i),
                kind: DocumentKind::PurchaseOrder,
                issued_date: None,
                party_ref: None,
                lines: (0..*count)
                    .map(|j| SourceLine {
                        product_ref: None,
                        description: format!("Item {}", j),
                        unit_of_measure: "pcs".into(),
                        quantity: Quantity::from_units(1),
                        unit_price: Money::from_cents(100),
                        tax_rate: TaxRate::zero(),
                    })
                    .collect(),
            })
            .collect();

        let mut linker = CrossDocumentLinker::new(DocumentKind::Purchase);
        let first = linker.import_from(&sources).unwrap();
        prop_assert_eq!(first.len(), line_counts.iter().sum::<usize>());

        for source in &sources {
            linker.deselect(&source.id);
        }
        prop_assert!(linker.import_from(&sources).unwrap().is_empty());
    }
}
