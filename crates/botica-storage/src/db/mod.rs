pub mod repository;
pub mod sqlite;

pub use sqlite::*;
