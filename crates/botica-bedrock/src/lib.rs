//! botica-bedrock
//!
//! Recommendation generation: prompt construction, the model provider seam
//! with its Bedrock Converse implementation, and strict decoding of the
//! model's output.

pub mod document;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod recommend;
pub mod schema;
pub mod tokens;
