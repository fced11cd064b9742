//! Form state: the people list, the tax field, and the add/edit dialog draft.

use crate::app::bill_lines::{ParsedBill, parse_amount, parse_bill_lines};
use crate::app::calculator;
use crate::domain::errors::DomainError;
use crate::domain::model::{CalculationResult, EntryTarget, Person};

/// Scratch input held only while the add/edit dialog is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDraft {
    pub target: EntryTarget,
    pub name: String,
    pub bill_lines: String,
}

impl PersonDraft {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of a successful upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedEntry {
    pub index: usize,
    pub appended: bool,
    pub parsed: ParsedBill,
}

/// Session state owned by the top-level UI.
///
/// `people` and the tax input are the only sources of truth. The calculation is cached after an
/// explicit submit and dropped whenever either input changes.
#[derive(Debug, Clone, Default)]
pub struct BillForm {
    people: Vec<Person>,
    tax_input: String,
    calculated: Option<CalculationResult>,
}

impl BillForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a form with the tax field prefilled, e.g. from configuration.
    pub fn with_tax_rate(tax_rate: f64) -> Self {
        let mut form = Self::new();
        if tax_rate != 0.0 {
            form.tax_input = tax_rate.to_string();
        }
        form
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn tax_input(&self) -> &str {
        &self.tax_input
    }

    /// Replace the raw tax field contents.
    pub fn set_tax_input<S: Into<String>>(&mut self, input: S) {
        let input = input.into();
        if input != self.tax_input {
            self.tax_input = input;
            self.invalidate();
        }
    }

    pub fn push_tax_char(&mut self, ch: char) {
        self.tax_input.push(ch);
        self.invalidate();
    }

    pub fn pop_tax_char(&mut self) {
        if self.tax_input.pop().is_some() {
            self.invalidate();
        }
    }

    /// Tax percentage parsed from the field. Blank or unreadable input is zero.
    pub fn tax_rate(&self) -> f64 {
        match parse_amount(&self.tax_input) {
            Some(rate) => rate,
            None => {
                tracing::warn!(input = %self.tax_input, "tax rate is not a number, using 0");
                0.0
            }
        }
    }

    /// Whether the tax field holds something other than a number.
    pub fn tax_input_is_valid(&self) -> bool {
        parse_amount(&self.tax_input).is_some()
    }

    /// Open a blank draft that will append on save.
    pub fn new_draft(&self) -> PersonDraft {
        PersonDraft::new()
    }

    /// Open a draft prefilled from the person at `index`.
    pub fn edit_draft(&self, index: usize) -> Result<PersonDraft, DomainError> {
        let person = self.people.get(index).ok_or(DomainError::UnknownEntry {
            index,
            len: self.people.len(),
        })?;
        Ok(PersonDraft {
            target: EntryTarget::Editing(index),
            name: person.name.clone(),
            bill_lines: person.bill_lines.clone(),
        })
    }

    /// Append a new person or overwrite the one at `target`.
    ///
    /// Both the name and the raw bill text must be present; otherwise nothing changes.
    pub fn upsert(
        &mut self,
        name: &str,
        bill_lines: &str,
        target: EntryTarget,
    ) -> Result<SavedEntry, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::MissingName);
        }
        if bill_lines.trim().is_empty() {
            return Err(DomainError::MissingBillLines);
        }

        let parsed = parse_bill_lines(bill_lines);
        let person = Person {
            name: name.to_owned(),
            bill_lines: bill_lines.to_owned(),
            bill_total: parsed.total,
        };

        let (index, appended) = match target {
            EntryTarget::New => {
                self.people.push(person);
                (self.people.len() - 1, true)
            }
            EntryTarget::Editing(index) => {
                let len = self.people.len();
                let slot = self
                    .people
                    .get_mut(index)
                    .ok_or(DomainError::UnknownEntry { index, len })?;
                *slot = person;
                (index, false)
            }
        };

        tracing::debug!(index, appended, total = parsed.total, "person saved");
        self.invalidate();
        Ok(SavedEntry {
            index,
            appended,
            parsed,
        })
    }

    /// Save a dialog draft.
    pub fn save(&mut self, draft: &PersonDraft) -> Result<SavedEntry, DomainError> {
        self.upsert(&draft.name, &draft.bill_lines, draft.target)
    }

    /// Submit the form. Returns `None` when nobody has been added yet.
    pub fn calculate(&mut self) -> Option<&CalculationResult> {
        if self.people.is_empty() {
            self.calculated = None;
            return None;
        }
        let result = calculator::calculate(&self.people, Some(self.tax_rate()));
        tracing::debug!(
            people = result.per_person.len(),
            tax_rate = result.tax_rate,
            "calculated split"
        );
        self.calculated = Some(result);
        self.calculated.as_ref()
    }

    /// Last submitted calculation, if still in sync with the inputs.
    pub fn calculation(&self) -> Option<&CalculationResult> {
        self.calculated.as_ref()
    }

    fn invalidate(&mut self) {
        self.calculated = None;
    }
}
