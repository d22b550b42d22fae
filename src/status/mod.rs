// src/status/mod.rs
mod controller;
mod state;

pub use controller::{CheckRun, StatusController, FAILURE_ERROR, FAILURE_HINT};
pub use state::{CheckState, StatusSnapshot};
