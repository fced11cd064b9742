//! Domain models for people, bill entries, and calculation results.

use serde::{Deserialize, Serialize};

/// One participant in the split. Identity is the position in the form's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    /// Raw newline separated amounts exactly as the user typed them.
    pub bill_lines: String,
    /// Sum of the parsed bill lines.
    pub bill_total: f64,
}

/// Where a dialog save should land.
///
/// Kept distinct from the index itself so that editing the first entry is never confused with
/// appending a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryTarget {
    #[default]
    New,
    Editing(usize),
}

impl EntryTarget {
    pub fn is_editing(&self) -> bool {
        matches!(self, EntryTarget::Editing(_))
    }
}

/// Per-person line of a calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonResult {
    pub name: String,
    pub bill_total: f64,
    pub bill_with_tax: f64,
}

/// Grand totals across everyone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub bill: f64,
    pub with_tax: f64,
}

impl Totals {
    /// Portion of the grand total contributed by tax.
    pub fn tax(&self) -> f64 {
        self.with_tax - self.bill
    }
}

/// Snapshot derived from the people list and tax rate. Never stored as a source of truth.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CalculationResult {
    pub tax_rate: f64,
    pub per_person: Vec<PersonResult>,
    pub totals: Totals,
}

impl CalculationResult {
    pub fn is_empty(&self) -> bool {
        self.per_person.is_empty()
    }
}
