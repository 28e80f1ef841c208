//! # Line Items
//!
//! The per-line ledger of one document.
//!
//! ## Line Arithmetic
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  consumable_quantity × unit_price ──► amount                            │
//! │                                         │                               │
//! │                          amount × tax% ─┴──► tax_amount                 │
//! │                                                  │                      │
//! │                            amount + tax_amount ──┴──► total_amount      │
//! │                                                                         │
//! │  All three derived fields are rewritten together on every mutation.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Authored vs Imported Lines
//! - **Authored** lines are typed in by the user. Editing the quantity
//!   moves `original_quantity` and `consumable_quantity` together.
//! - **Imported** lines come from a source document (purchase order,
//!   invoice). Their `original_quantity` is frozen; the user can only
//!   reduce the consumable (received / returned) quantity.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{LineId, ProductDefaults, ProductRef, SourceDocumentRef, TaxRate};

// =============================================================================
// Line Item
// =============================================================================

/// One row of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub id: LineId,
    pub product_ref: Option<ProductRef>,
    pub description: String,
    pub unit_of_measure: String,
    pub original_quantity: Quantity,
    /// Quantity counted toward this document's totals.
    pub consumable_quantity: Quantity,
    pub unit_price: Money,
    pub tax_rate: TaxRate,
    amount: Money,
    tax_amount: Money,
    total_amount: Money,
    pub source: Option<SourceDocumentRef>,
}

impl LineItem {
    /// A blank authored line with zeroed numbers.
    pub fn blank() -> Self {
        LineItem {
            id: LineId::new(),
            product_ref: None,
            description: String::new(),
            unit_of_measure: String::new(),
            original_quantity: Quantity::zero(),
            consumable_quantity: Quantity::zero(),
            unit_price: Money::zero(),
            tax_rate: TaxRate::zero(),
            amount: Money::zero(),
            tax_amount: Money::zero(),
            total_amount: Money::zero(),
            source: None,
        }
    }

    /// A line imported from `source`, consumable quantity defaulting to
    /// the full original quantity.
    #[allow(clippy::too_many_arguments)]
    pub fn imported(
        source: SourceDocumentRef,
        product_ref: Option<ProductRef>,
        description: String,
        unit_of_measure: String,
        quantity: Quantity,
        unit_price: Money,
        tax_rate: TaxRate,
    ) -> Self {
        let quantity = quantity.max(Quantity::zero());
        let mut line = LineItem {
            id: LineId::new(),
            product_ref,
            description,
            unit_of_measure,
            original_quantity: quantity,
            consumable_quantity: quantity,
            unit_price: unit_price.non_negative(),
            tax_rate,
            amount: Money::zero(),
            tax_amount: Money::zero(),
            total_amount: Money::zero(),
            source: Some(source),
        };
        line.recompute();
        line
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn tax_amount(&self) -> Money {
        self.tax_amount
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn is_imported(&self) -> bool {
        self.source.is_some()
    }

    /// An authored line nobody has typed into yet.
    pub fn is_untouched(&self) -> bool {
        !self.is_imported()
            && self.product_ref.is_none()
            && self.description.is_empty()
            && self.unit_of_measure.is_empty()
            && self.original_quantity.is_zero()
            && self.unit_price.is_zero()
    }

    /// Whether the line has every field a submitted document needs:
    /// something that names it (product or description), a positive
    /// quantity, a unit and a positive price.
    ///
    /// An imported line is judged on its original quantity. Its consumable
    /// quantity may be zero when nothing of that line was received or
    /// returned.
    pub fn is_complete(&self) -> bool {
        let named = self.product_ref.is_some() || !self.description.trim().is_empty();
        let quantity = if self.is_imported() {
            self.original_quantity
        } else {
            self.consumable_quantity
        };
        named
            && quantity.is_positive()
            && !self.unit_of_measure.trim().is_empty()
            && self.unit_price.is_positive()
    }

    /// Restores the line invariants after its public fields were set by hand.
    fn normalize(&mut self) {
        self.original_quantity = self.original_quantity.max(Quantity::zero());
        self.consumable_quantity = if self.is_imported() {
            self.consumable_quantity.clamp_to(self.original_quantity)
        } else {
            self.original_quantity
        };
        self.unit_price = self.unit_price.non_negative();
        self.recompute();
    }

    /// Rewrites amount, tax and total from the authored inputs.
    fn recompute(&mut self) {
        self.amount = self.unit_price.times(self.consumable_quantity);
        self.tax_amount = self.amount.calculate_tax(self.tax_rate);
        self.total_amount = self.amount + self.tax_amount;
    }

    /// Clamps and applies a consumable quantity; returns the applied value.
    fn apply_consumable(&mut self, requested: Quantity) -> Quantity {
        self.consumable_quantity = requested.clamp_to(self.original_quantity);
        self.recompute();
        self.consumable_quantity
    }
}

// =============================================================================
// Line Patch
// =============================================================================

/// A partial update to one line. `None` fields are left untouched.
///
/// ## Usage
/// ```rust
/// use janus_core::line_items::LinePatch;
/// use janus_core::money::Money;
///
/// let patch = LinePatch::new()
///     .quantity_text("12")
///     .unit_price(Money::from_cents(1050));
/// assert!(patch.quantity.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePatch {
    /// `Some(None)` clears the product reference (free-text line).
    pub product_ref: Option<Option<ProductRef>>,
    pub description: Option<String>,
    pub unit_of_measure: Option<String>,
    pub quantity: Option<Quantity>,
    pub unit_price: Option<Money>,
    pub tax_rate: Option<TaxRate>,
}

impl LinePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything a catalog pick fills in: product, description, unit,
    /// price and tax rate. Quantity is left as the user typed it.
    pub fn from_product(defaults: &ProductDefaults) -> Self {
        LinePatch {
            product_ref: Some(Some(defaults.product_ref.clone())),
            description: Some(defaults.description.clone()),
            unit_of_measure: Some(defaults.default_unit.clone()),
            quantity: None,
            unit_price: Some(defaults.default_price),
            tax_rate: Some(defaults.default_tax_rate),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn unit_of_measure(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measure = Some(unit.into());
        self
    }

    pub fn quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn quantity_text(self, text: &str) -> Self {
        self.quantity(Quantity::parse_lenient(text))
    }

    pub fn unit_price(mut self, price: Money) -> Self {
        self.unit_price = Some(price);
        self
    }

    pub fn unit_price_text(self, text: &str) -> Self {
        self.unit_price(Money::parse_lenient(text))
    }

    pub fn tax_rate(mut self, rate: TaxRate) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    pub fn tax_percent_text(self, text: &str) -> Self {
        self.tax_rate(TaxRate::parse_percent_lenient(text))
    }

    pub fn product(mut self, product_ref: Option<ProductRef>) -> Self {
        self.product_ref = Some(product_ref);
        self
    }
}

// =============================================================================
// Line Item Engine
// =============================================================================

/// Owns one document's lines and keeps their derived fields current.
///
/// ## Invariants
/// - `amount == unit_price × consumable_quantity` for every line
/// - `total_amount == amount + tax_amount` for every line
/// - `0 ≤ consumable_quantity ≤ original_quantity`
/// - Line ids are unique and never reused
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemEngine {
    lines: Vec<LineItem>,
}

impl LineItemEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn get(&self, id: &LineId) -> Option<&LineItem> {
        self.lines.iter().find(|l| &l.id == id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Appends a blank line and returns it for the caller to populate.
    pub fn add_line(&mut self) -> &LineItem {
        self.add_line_with_tax(TaxRate::zero())
    }

    /// Appends a blank line preset to `tax_rate` (the tenant default).
    pub fn add_line_with_tax(&mut self, tax_rate: TaxRate) -> &LineItem {
        let mut line = LineItem::blank();
        line.tax_rate = tax_rate;
        debug!(line_id = %line.id, "line added");
        self.lines.push(line);
        &self.lines[self.lines.len() - 1]
    }

    /// Appends already-built lines (imports) after the existing ones.
    ///
    /// Each line is normalized on the way in: quantities clamped, price
    /// floored at zero and the derived amounts recomputed.
    pub fn append(&mut self, lines: Vec<LineItem>) {
        self.lines.extend(lines.into_iter().map(|mut line| {
            line.normalize();
            line
        }));
    }

    /// Applies `patch` to one line and recomputes that line only.
    ///
    /// ## Quantity Handling
    /// ```text
    /// patch.quantity = q
    ///      │
    ///      ├── authored line → original = consumable = q
    ///      │
    ///      └── imported line → consumable = clamp(q, 0, original)
    /// ```
    ///
    /// Negative prices are floored at zero rather than rejected.
    pub fn update_line(&mut self, id: &LineId, patch: LinePatch) -> CoreResult<&LineItem> {
        let line = self.line_mut(id)?;

        if let Some(product_ref) = patch.product_ref {
            line.product_ref = product_ref;
        }
        if let Some(description) = patch.description {
            line.description = description;
        }
        if let Some(unit) = patch.unit_of_measure {
            line.unit_of_measure = unit;
        }
        if let Some(price) = patch.unit_price {
            line.unit_price = price.non_negative();
        }
        if let Some(rate) = patch.tax_rate {
            line.tax_rate = rate;
        }
        if let Some(quantity) = patch.quantity {
            if line.is_imported() {
                line.consumable_quantity = quantity.clamp_to(line.original_quantity);
            } else {
                let quantity = quantity.max(Quantity::zero());
                line.original_quantity = quantity;
                line.consumable_quantity = quantity;
            }
        }

        line.recompute();
        debug!(
            line_id = %line.id,
            amount = %line.amount,
            total = %line.total_amount,
            "line updated"
        );
        Ok(&*line)
    }

    /// Sets the received / returned quantity of a line.
    ///
    /// The request is clamped to `[0, original_quantity]` silently: asking
    /// for 999 of a 50-unit line yields 50. Returns the applied quantity.
    pub fn update_consumable_quantity(
        &mut self,
        id: &LineId,
        requested: Quantity,
    ) -> CoreResult<Quantity> {
        let line = self.line_mut(id)?;
        let applied = line.apply_consumable(requested);
        if applied != requested {
            debug!(
                line_id = %line.id,
                requested = %requested,
                applied = %applied,
                "consumable quantity clamped"
            );
        }
        Ok(applied)
    }

    /// Deletes a line. Removing the last line is allowed.
    pub fn remove_line(&mut self, id: &LineId) -> CoreResult<LineItem> {
        let index = self
            .lines
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))?;
        let removed = self.lines.remove(index);
        debug!(line_id = %removed.id, "line removed");
        Ok(removed)
    }

    /// Removes every line for which `predicate` holds; returns how many.
    pub fn remove_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&LineItem) -> bool,
    {
        let before = self.lines.len();
        self.lines.retain(|l| !predicate(l));
        before - self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, id: &LineId) -> CoreResult<&mut LineItem> {
        self.lines
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
