//! Application layer: parsing, form state, calculation, and reporting.

pub mod bill_lines;
pub mod calculator;
pub mod currency;
pub mod form;
pub mod report;
