//! Loyalty reward points for card transactions: the bundle engine, a transaction ledger that
//! feeds it, and the configuration and telemetry shared by the service binary.

pub mod config;
pub mod error;
pub mod ledger;
pub mod rewards;
pub mod telemetry;
