//! OCR text acquisition for scanned documents.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use serde::{Deserialize, Serialize};

/// Vertical distance (pixels) within which lines share a row.
const ROW_TOLERANCE: f32 = 12.0;

/// A recognized line of text with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,

    /// Axis-aligned bounds (min_x, min_y, max_x, max_y).
    pub bounds: (f32, f32, f32, f32),
}

impl OcrLine {
    /// Vertical center of the line.
    pub fn center_y(&self) -> f32 {
        (self.bounds.1 + self.bounds.3) / 2.0
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized lines in reading order.
    pub lines: Vec<OcrLine>,

    /// Full text: lines on the same row joined by spaces, rows by newlines.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result from unordered lines.
    pub fn from_lines(lines: Vec<OcrLine>, image_size: (u32, u32)) -> Self {
        let mut result = Self {
            lines,
            text: String::new(),
            processing_time_ms: 0,
            image_size,
        };
        result.sort_by_reading_order();
        result
    }

    /// Sort lines top-to-bottom, left-to-right and rebuild the text.
    pub fn sort_by_reading_order(&mut self) {
        self.lines.sort_by(|a, b| {
            a.center_y()
                .partial_cmp(&b.center_y())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Group into rows, then order each row by x
        let mut rows: Vec<Vec<OcrLine>> = Vec::new();
        for line in self.lines.drain(..) {
            match rows.last_mut() {
                Some(row) if (line.center_y() - row[0].center_y()).abs() <= ROW_TOLERANCE => {
                    row.push(line)
                }
                _ => rows.push(vec![line]),
            }
        }

        for row in &mut rows {
            row.sort_by(|a, b| {
                a.bounds
                    .0
                    .partial_cmp(&b.bounds.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        self.text = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|line| line.text.trim())
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|row| !row.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        self.lines = rows.into_iter().flatten().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(text: &str, x: f32, y: f32) -> OcrLine {
        OcrLine {
            text: text.to_string(),
            confidence: 0.9,
            bounds: (x, y, x + 80.0, y + 20.0),
        }
    }

    #[test]
    fn test_reading_order_joins_rows() {
        let result = OcrResult::from_lines(
            vec![
                line("45,000", 300.0, 204.0),
                line("Payslip", 40.0, 20.0),
                line("Net Pay", 40.0, 200.0),
                line("March 2023", 40.0, 60.0),
            ],
            (600, 800),
        );

        assert_eq!(result.text, "Payslip\nMarch 2023\nNet Pay 45,000");
        assert_eq!(result.lines[3].text, "45,000");
    }

    #[test]
    fn test_blank_lines_dropped() {
        let result = OcrResult::from_lines(
            vec![line("  ", 0.0, 0.0), line("Total Income", 0.0, 100.0)],
            (100, 200),
        );
        assert_eq!(result.text, "Total Income");
    }
}
