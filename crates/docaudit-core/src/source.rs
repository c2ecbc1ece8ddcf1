//! Text acquisition: turn a PDF or an image file into document text.

use std::path::Path;

use tracing::{debug, info};

use crate::error::SourceError;
use crate::models::config::{AuditConfig, OcrConfig, PdfConfig};
use crate::models::document::Document;
use crate::pdf::{PdfExtractor, PdfProcessor, PdfType};

/// Image extensions read through OCR.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// How text is obtained from a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Embedded PDF text.
    Pdf,
    /// OCR over a raster image.
    Image,
}

impl SourceKind {
    /// Determine the source kind from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(SourceKind::Pdf),
            e if IMAGE_EXTENSIONS.contains(&e) => Ok(SourceKind::Image),
            _ => Err(SourceError::UnsupportedFileType(file_name(path))),
        }
    }
}

/// Read a file into a [`Document`] whose source is the file name.
///
/// Fails with [`SourceError::UnsupportedFileType`] for unknown extensions and
/// [`SourceError::ExtractionFailure`] when the file cannot be read or yields
/// no text.
pub fn acquire_text(path: &Path, config: &AuditConfig) -> Result<Document, SourceError> {
    let name = file_name(path);
    let kind = SourceKind::from_path(path)?;
    let failure = |reason: String| SourceError::ExtractionFailure {
        file: name.clone(),
        reason,
    };

    debug!("Acquiring text from {} as {:?}", path.display(), kind);

    let text = match kind {
        SourceKind::Pdf => pdf_text(path, &config.pdf).map_err(failure)?,
        SourceKind::Image => image_text(path, &config.ocr).map_err(failure)?,
    };

    if text.trim().is_empty() {
        return Err(failure("no text found".to_string()));
    }

    info!("{}: acquired {} chars of text", name, text.len());
    Ok(Document::new(text).with_source(name.as_str()))
}

fn pdf_text(path: &Path, config: &PdfConfig) -> Result<String, String> {
    let data = std::fs::read(path).map_err(|e| e.to_string())?;

    let mut extractor = PdfExtractor::new();
    extractor.load(&data).map_err(|e| e.to_string())?;
    let content = extractor.extract_all().map_err(|e| e.to_string())?;

    if content.text.trim().chars().count() < config.min_text_length {
        let reason = match content.pdf_type {
            PdfType::Scanned => "scanned PDF without embedded text; convert pages to images for OCR",
            PdfType::Text | PdfType::Empty => "PDF has no extractable text",
        };
        return Err(reason.to_string());
    }

    Ok(content.text)
}

#[cfg(feature = "native")]
fn image_text(path: &Path, config: &OcrConfig) -> Result<String, String> {
    let image = image::open(path).map_err(|e| e.to_string())?;
    let engine = crate::ocr::PureOcrEngine::from_config(config).map_err(|e| e.to_string())?;
    engine.extract_text(&image).map_err(|e| e.to_string())
}

#[cfg(not(feature = "native"))]
fn image_text(_path: &Path, _config: &OcrConfig) -> Result<String, String> {
    Err(crate::error::OcrError::Unavailable.to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
