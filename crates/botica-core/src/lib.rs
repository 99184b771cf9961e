//! botica-core
//!
//! Pure domain types, intake normalisation, schema validators, and export
//! key conventions. No AWS SDK or database dependency; this is the shared
//! vocabulary of the Botica system.

pub mod error;
pub mod export_keys;
pub mod intake;
pub mod models;
pub mod validation;
