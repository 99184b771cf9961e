//! botica-storage
//!
//! SQLite persistence for patients, evaluations and recommendations, plus
//! S3 uploads for exported documents.

pub mod db;
pub mod error;
pub mod objects;
pub mod store;
