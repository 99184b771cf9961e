pub mod evaluation;
pub mod intake;
pub mod patient;
pub mod response;
pub mod stored;
pub mod usage;
pub mod user;
