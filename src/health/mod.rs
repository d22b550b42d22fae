// src/health/mod.rs
mod client;
mod result;

pub use client::{HealthClient, HealthProbe};
pub use result::{HealthResult, ProbeError};
