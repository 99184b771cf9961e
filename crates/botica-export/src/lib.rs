//! botica-export
//!
//! Turns a stored recommendation into a document the pharmacy can hand to
//! the patient: a Tera template renders Markdown-ish text, which is shipped
//! as-is or converted to DOCX.

pub mod docx;
pub mod error;
pub mod format;
pub mod render;
pub mod styles;

use tracing::info;

use crate::error::ExportError;
use crate::format::ExportFormat;
use crate::render::{ExportDocument, render_document};
use crate::styles::DocumentStyles;

/// A finished export, ready to return or upload.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

pub fn export(
    document: &ExportDocument,
    format: ExportFormat,
    styles: &DocumentStyles,
) -> Result<ExportArtifact, ExportError> {
    let rendered = render_document(document)?;
    let bytes = match format {
        ExportFormat::Text => rendered.into_bytes(),
        ExportFormat::Docx => docx::generate_docx(&rendered, styles)?,
    };
    info!(
        recommendation_id = document.recommendation_id,
        format = format.as_str(),
        size = bytes.len(),
        "export generated"
    );
    Ok(ExportArtifact {
        format,
        file_name: format!(
            "recomendacion-{}.{}",
            document.recommendation_id,
            format.extension()
        ),
        bytes,
    })
}
