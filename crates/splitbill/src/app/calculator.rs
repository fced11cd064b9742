//! Derive per-person and grand totals from the people list.

use crate::domain::model::{CalculationResult, Person, PersonResult, Totals};

/// Apply `tax_rate` percent to every person's subtotal and sum the results.
///
/// A missing or non-finite rate counts as zero. Values are left unrounded; rounding only happens
/// when formatting for display.
pub fn calculate(people: &[Person], tax_rate: Option<f64>) -> CalculationResult {
    let tax_rate = tax_rate.filter(|rate| rate.is_finite()).unwrap_or(0.0);

    let per_person: Vec<PersonResult> = people
        .iter()
        .map(|person| PersonResult {
            name: person.name.clone(),
            bill_total: person.bill_total,
            bill_with_tax: with_tax(person.bill_total, tax_rate),
        })
        .collect();

    let totals = per_person.iter().fold(Totals::default(), |acc, item| Totals {
        bill: acc.bill + item.bill_total,
        with_tax: acc.with_tax + item.bill_with_tax,
    });

    CalculationResult {
        tax_rate,
        per_person,
        totals,
    }
}

fn with_tax(amount: f64, tax_rate: f64) -> f64 {
    amount + amount * tax_rate / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, total: f64) -> Person {
        Person {
            name: name.into(),
            bill_lines: total.to_string(),
            bill_total: total,
        }
    }

    #[test]
    fn applies_tax_to_each_person() {
        let people = vec![person("Alice", 50.0), person("Bob", 10.0)];
        let result = calculate(&people, Some(10.0));

        assert_eq!(result.per_person.len(), 2);
        assert!((result.per_person[0].bill_with_tax - 55.0).abs() < 1e-9);
        assert!((result.per_person[1].bill_with_tax - 11.0).abs() < 1e-9);
        assert!((result.totals.bill - 60.0).abs() < 1e-9);
        assert!((result.totals.with_tax - 66.0).abs() < 1e-9);
    }

    #[test]
    fn missing_rate_means_no_tax() {
        let people = vec![person("Alice", 12.5)];
        let result = calculate(&people, None);
        assert_eq!(result.tax_rate, 0.0);
        assert_eq!(result.per_person[0].bill_with_tax, 12.5);
        assert_eq!(result.totals.tax(), 0.0);
    }

    #[test]
    fn non_finite_rate_means_no_tax() {
        let result = calculate(&[person("Alice", 3.0)], Some(f64::NAN));
        assert_eq!(result.totals.with_tax, 3.0);
    }

    #[test]
    fn empty_people_gives_zero_totals() {
        let result = calculate(&[], Some(15.0));
        assert!(result.is_empty());
        assert_eq!(result.totals, Totals::default());
    }

    #[test]
    fn repeated_calls_are_identical() {
        let people = vec![person("A", 19.99), person("B", 0.01), person("C", 1234.5)];
        assert_eq!(calculate(&people, Some(7.25)), calculate(&people, Some(7.25)));
    }

    #[test]
    fn tax_portion_matches_sum_of_individual_taxes() {
        let people = vec![person("A", 19.99), person("B", 0.37), person("C", 1234.5)];
        let rate = 11.5;
        let result = calculate(&people, Some(rate));
        let expected: f64 = people.iter().map(|p| p.bill_total * rate / 100.0).sum();
        assert!((result.totals.tax() - expected).abs() < 1e-9);
    }
}
