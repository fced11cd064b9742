//! Collection of reusable TUI components.

pub mod people_list;
pub mod person_dialog;
pub mod results;
