//! S3 key conventions for exported recommendation documents.
//!
//! Pure string functions, no AWS SDK dependency.

pub const EXPORTS_PREFIX: &str = "exports/recommendations/";

pub fn recommendation_docx(id: i64) -> String {
    format!("{EXPORTS_PREFIX}{id}/recommendation.docx")
}

pub fn recommendation_text(id: i64) -> String {
    format!("{EXPORTS_PREFIX}{id}/recommendation.md")
}
