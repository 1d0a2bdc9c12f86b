//! Laytime & Demurrage/Despatch Calculation Engine
//!
//! This crate converts a voyage's recorded port time-use events into laytime,
//! demurrage and despatch figures under charter-party terms, producing one
//! output row per cargo/port-call pairing plus voyage-level totals.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
