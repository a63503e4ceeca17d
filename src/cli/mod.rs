//! Command-line front end: argument handling, rendering and output.

pub mod bond;
pub mod portfolio;
pub mod render;
pub mod setup;
pub mod ui;
