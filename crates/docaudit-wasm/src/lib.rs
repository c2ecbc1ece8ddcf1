//! WASM bindings for financial document auditing.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! OCR is not compiled in; scanned pages are recognized on the JavaScript side
//! and handed back through [`OcrLinesJs`].

use serde::Serialize;
use wasm_bindgen::prelude::*;

use docaudit_core::audit::rules::{classify, parse_amount as parse_amount_core, KeywordScore};
use docaudit_core::{
    Document, ExtractionResult, OcrLine, OcrResult, PdfExtractor, PdfProcessor, PdfType,
    RequestedCriteria, RuleAuditor,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

/// Audit document text against a requested type and period.
///
/// Returns `{ document_type, month_year, validation, estimated_monthly_salary }`.
#[wasm_bindgen(js_name = auditText)]
pub fn audit_text(text: &str, document_type: &str, period: &str) -> Result<JsValue, JsValue> {
    let auditor = Auditor::new(document_type, period)?;
    auditor.audit(text)
}

/// Classify text as "Payslip", "IT Return" or "Invalid Document".
#[wasm_bindgen(js_name = classifyDocument)]
pub fn classify_document(text: &str) -> String {
    classify(text).label().to_string()
}

/// Parse an amount such as "₹ 6,00,000" or "Rs. 45,000.50/-".
///
/// The value is returned as a decimal string so no precision is lost.
#[wasm_bindgen(js_name = parseAmount)]
pub fn parse_amount(amount: &str) -> Option<String> {
    parse_amount_core(amount).map(|d| d.to_string())
}

/// Extract the embedded text of a PDF.
///
/// Fails for scanned or empty PDFs; run OCR in the browser for those.
#[wasm_bindgen(js_name = extractPdfText)]
pub fn extract_pdf_text(data: &[u8]) -> Result<String, JsValue> {
    pdf_text(data).map_err(to_js_error)
}

fn pdf_text(data: &[u8]) -> Result<String, String> {
    let mut extractor = PdfExtractor::new();
    extractor.load(data).map_err(|e| e.to_string())?;
    let content = extractor.extract_all().map_err(|e| e.to_string())?;

    match content.pdf_type {
        PdfType::Text => Ok(content.text),
        PdfType::Scanned => Err("PDF has no text layer (scanned document)".to_string()),
        PdfType::Empty => Err("PDF contains no text".to_string()),
    }
}

#[derive(Serialize)]
struct ScoresJs {
    payslip: usize,
    it_return: usize,
}

impl From<KeywordScore> for ScoresJs {
    fn from(scores: KeywordScore) -> Self {
        Self {
            payslip: scores.payslip,
            it_return: scores.it_return,
        }
    }
}

#[derive(Serialize)]
struct PeriodMatchJs {
    source: String,
    confidence: f32,
    position: Option<(usize, usize)>,
}

#[derive(Serialize)]
struct DetailedResultJs {
    result: ExtractionResult,
    scores: ScoresJs,
    period_match: Option<PeriodMatchJs>,
    warnings: Vec<String>,
}

/// Auditor bound to one requested type and period.
#[wasm_bindgen]
pub struct Auditor {
    criteria: RequestedCriteria,
    auditor: RuleAuditor,
}

#[wasm_bindgen]
impl Auditor {
    /// Create an auditor; fails if the period does not fit the document type.
    #[wasm_bindgen(constructor)]
    pub fn new(document_type: &str, period: &str) -> Result<Auditor, JsValue> {
        let criteria = RequestedCriteria::parse(document_type, period).map_err(to_js_error)?;
        Ok(Self {
            criteria,
            auditor: RuleAuditor::new(),
        })
    }

    /// Ignore period matches below this confidence.
    #[wasm_bindgen]
    pub fn set_min_period_confidence(&mut self, confidence: f32) {
        self.auditor = RuleAuditor::new().with_min_period_confidence(confidence);
    }

    /// Requested period in normalized form, e.g. "2024-2025" or "March 2023".
    #[wasm_bindgen(getter)]
    pub fn period(&self) -> String {
        self.criteria.period.to_string()
    }

    /// Audit text.
    #[wasm_bindgen]
    pub fn audit(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.result_for(text))
    }

    /// Audit text and include keyword scores, the matched period text and
    /// warnings.
    #[wasm_bindgen]
    pub fn audit_detailed(&self, text: &str) -> Result<JsValue, JsValue> {
        let report = self
            .auditor
            .audit_detailed(&Document::new(text), &self.criteria);

        to_js(&DetailedResultJs {
            result: report.result,
            scores: report.scores.into(),
            period_match: report.period_match.map(|found| PeriodMatchJs {
                source: found.source,
                confidence: found.confidence,
                position: found.position,
            }),
            warnings: report.warnings,
        })
    }

    /// Audit the embedded text of a PDF.
    #[wasm_bindgen]
    pub fn audit_pdf(&self, data: &[u8]) -> Result<JsValue, JsValue> {
        let text = pdf_text(data).map_err(to_js_error)?;
        self.audit(&text)
    }

    /// The result as four labeled lines.
    #[wasm_bindgen]
    pub fn audit_to_lines(&self, text: &str) -> String {
        self.result_for(text).to_lines()
    }
}

impl Auditor {
    fn result_for(&self, text: &str) -> ExtractionResult {
        self.auditor
            .audit_detailed(&Document::new(text), &self.criteria)
            .result
    }
}

/// Lines recognized by browser-side OCR, put back into reading order.
#[wasm_bindgen]
pub struct OcrLinesJs {
    lines: Vec<OcrLine>,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl OcrLinesJs {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            lines: Vec::new(),
            width,
            height,
        }
    }

    /// Add a recognized line with its axis-aligned bounds.
    #[wasm_bindgen]
    pub fn add_line(
        &mut self,
        text: &str,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
        confidence: f32,
    ) {
        self.lines.push(OcrLine {
            text: text.to_string(),
            confidence,
            bounds: (min_x, min_y, max_x, max_y),
        });
    }

    /// Page text in reading order.
    #[wasm_bindgen]
    pub fn text(&self) -> String {
        OcrResult::from_lines(self.lines.clone(), (self.width, self.height)).text
    }

    /// Audit the page text.
    #[wasm_bindgen]
    pub fn audit(&self, auditor: &Auditor) -> Result<JsValue, JsValue> {
        auditor.audit(&self.text())
    }
}
