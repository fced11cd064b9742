use insta::assert_snapshot;

use splitbill::app::bill_lines::parse_bill_lines;
use splitbill::app::currency::format_currency;
use splitbill::app::form::BillForm;
use splitbill::app::report::{ReportFormat, ReportOptions, ReportRenderer};
use splitbill::domain::model::EntryTarget;

#[test]
fn currency_formatting() {
    assert_snapshot!(format_currency(0.0), @"0.00");
    assert_snapshot!(format_currency(1000.0), @"1,000.00");
    assert_snapshot!(format_currency(1234567.891), @"1,234,567.89");
    assert_snapshot!(format_currency(1234567.5), @"1,234,567.50");
}

#[test]
fn lenient_bill_lines() {
    let parsed = parse_bill_lines("10\nabc\n5.5");
    assert_snapshot!(format_currency(parsed.total), @"15.50");
    assert_eq!(parsed.rejected.len(), 1);
}

#[test]
fn dinner_for_two() {
    let mut form = BillForm::new();
    form.upsert("Alice", "20\n30", EntryTarget::New).unwrap();
    form.upsert("Bob", "10", EntryTarget::New).unwrap();
    form.set_tax_input("10");

    let result = form.calculate().expect("people were added").clone();
    let line = |idx: usize| {
        let person = &result.per_person[idx];
        format!(
            "{} {} {}",
            person.name,
            format_currency(person.bill_total),
            format_currency(person.bill_with_tax)
        )
    };
    assert_snapshot!(line(0), @"Alice 50.00 55.00");
    assert_snapshot!(line(1), @"Bob 10.00 11.00");
    assert_snapshot!(
        format!(
            "{} / {}",
            format_currency(result.totals.bill),
            format_currency(result.totals.with_tax)
        ),
        @"60.00 / 66.00"
    );
}

#[test]
fn markdown_report_for_scenario() {
    let mut form = BillForm::new();
    form.upsert("Alice", "20\n30", EntryTarget::New).unwrap();
    form.upsert("Bob", "10", EntryTarget::New).unwrap();
    form.set_tax_input("10");
    let result = form.calculate().unwrap().clone();

    let options = ReportOptions {
        format: ReportFormat::Markdown,
        include_timestamp: false,
        ..ReportOptions::default()
    };
    let rendered = ReportRenderer::new().unwrap().render(&result, &options).unwrap();
    let total_row = rendered
        .lines()
        .find(|line| line.starts_with("| **Total**"))
        .unwrap();
    assert_snapshot!(total_row, @"| **Total** | **60.00** | **66.00** |");
}
