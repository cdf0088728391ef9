use std::path::Path;

use lopdf::Document as PdfDocument;

use crate::domain::document::Document;
use crate::domain::error::{AppError, Result};

/// Extracts the text layer of a PDF, one page after another.
///
/// Page texts are joined with `\n`; pages without a text layer (scans,
/// blank pages) contribute nothing.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let pdf = PdfDocument::load_mem(bytes)?;
    Ok(collect_page_text(&pdf))
}

pub fn extract_text_from_path(path: &Path) -> Result<String> {
    let pdf = PdfDocument::load(path)?;
    Ok(collect_page_text(&pdf))
}

fn collect_page_text(pdf: &PdfDocument) -> String {
    let mut pages: Vec<String> = Vec::new();
    for page_number in pdf.get_pages().keys() {
        match pdf.extract_text(&[*page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => pages.push(page_text),
            Ok(_) => {
                tracing::debug!(page = page_number, "page has no text layer");
            }
            Err(err) => {
                tracing::debug!(page = page_number, error = %err, "page has no extractable text");
            }
        }
    }
    pages.join("\n")
}

/// Loads a PDF from disk into a [`Document`] named after the file.
pub fn load_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(AppError::NotFound(format!("{}", path.display())));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let text = extract_text_from_path(path)?;
    tracing::info!(document = %name, chars = text.len(), "extracted document text");
    Ok(Document::new(name, text))
}

pub fn document_from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Document> {
    Ok(Document::new(name, extract_text(bytes)?))
}
