//! Terminal interface: event loop and widgets.

pub mod app;
pub mod components;
