//! Terminal front end: chart and CSV output, config setup.

pub mod export;
pub mod plot;
pub mod setup;
pub mod ui;
