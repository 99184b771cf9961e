pub mod exports;
pub mod health;
pub mod recommendations;
