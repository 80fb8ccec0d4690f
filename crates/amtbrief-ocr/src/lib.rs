//! Turns an image or PDF byte blob into UTF-8 text under a strict latency
//! budget. Deliberately single-path — no multi-stage image enhancement,
//! no online OCR services, no LLM-vision fallback here (that lives in
//! `amtbrief-analysis` when extracted text is empty).

pub mod error;

use error::{OcrError, Result};
use image::imageops::FilterType;
use image::GenericImageView;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Hard wall-clock budget for a single OCR call.
const OCR_HARD_TIMEOUT: Duration = Duration::from_secs(10);
/// Longer side is resized to at most this many pixels.
const MAX_IMAGE_DIMENSION: u32 = 2000;
/// A PDF's directly-extracted text is accepted when the printable-character
/// ratio exceeds this threshold.
const PRINTABLE_RATIO_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    TesseractOcr,
    DirectPdf,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::TesseractOcr => "tesseract_ocr",
            ExtractionMethod::DirectPdf => "direct_pdf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub text: String,
    pub method: ExtractionMethod,
    pub elapsed_ms: u64,
}

/// Extracts plain text from `file_bytes`.
///
/// PDFs attempt direct text-layer extraction only — scanned-only PDFs are
/// explicitly *not* rasterized and OCR'd, by latency policy. Images are
/// grayscaled, resized, and OCR'd once.
pub async fn extract(
    file_bytes: &[u8],
    mime: &str,
    max_bytes: usize,
    ocr_binary: &str,
    languages: &str,
) -> Result<ExtractionResult> {
    if file_bytes.len() > max_bytes {
        return Err(OcrError::InputTooLarge);
    }

    let started = Instant::now();
    let binary = ocr_binary.to_string();
    let languages = languages.to_string();
    let mime_owned = mime.to_string();
    let bytes_owned = file_bytes.to_vec();

    let result = tokio::time::timeout(
        OCR_HARD_TIMEOUT,
        tokio::task::spawn_blocking(move || extract_blocking(&bytes_owned, &mime_owned, &binary, &languages)),
    )
    .await
    .map_err(|_| OcrError::Timeout)?
    .map_err(|e| OcrError::DecodeFailed(e.to_string()))??;

    debug!(method = result.0.as_str(), elapsed_ms = started.elapsed().as_millis(), "ocr extraction done");

    Ok(ExtractionResult {
        text: result.1,
        method: result.0,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

/// The CPU-bound half of `extract`, dispatched to the blocking pool.
fn extract_blocking(
    file_bytes: &[u8],
    mime: &str,
    ocr_binary: &str,
    languages: &str,
) -> Result<(ExtractionMethod, String)> {
    if is_pdf_mime(mime) {
        return extract_pdf(file_bytes);
    }

    if !is_supported_image_mime(mime) {
        return Err(OcrError::UnsupportedMime(mime.to_string()));
    }

    let text = extract_image(file_bytes, ocr_binary, languages)?;
    Ok((ExtractionMethod::TesseractOcr, text))
}

fn is_pdf_mime(mime: &str) -> bool {
    mime.eq_ignore_ascii_case("application/pdf")
}

fn is_supported_image_mime(mime: &str) -> bool {
    matches!(
        mime.to_ascii_lowercase().as_str(),
        "image/jpeg" | "image/jpg" | "image/png" | "image/gif" | "image/webp" | "image/bmp" | "image/tiff"
    )
}

/// Attempts direct PDF text-layer extraction. If the extracted text is
/// empty, or its printable-character ratio is too low, treat the document
/// as empty rather than rasterizing it.
fn extract_pdf(file_bytes: &[u8]) -> Result<(ExtractionMethod, String)> {
    let text = pdf_extract::extract_text_from_mem(file_bytes).unwrap_or_default();

    if text.is_empty() || printable_ratio(&text) <= PRINTABLE_RATIO_THRESHOLD {
        return Ok((ExtractionMethod::DirectPdf, String::new()));
    }

    Ok((ExtractionMethod::DirectPdf, clean_text(&text)))
}

fn printable_ratio(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let total = text.chars().count();
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    printable as f64 / total as f64
}

/// Decodes, grayscales, resizes, and invokes the OCR binary once with a
/// single configuration.
fn extract_image(file_bytes: &[u8], ocr_binary: &str, languages: &str) -> Result<String> {
    let img = image::load_from_memory(file_bytes)
        .map_err(|e| OcrError::DecodeFailed(e.to_string()))?;

    let (width, height) = img.dimensions();
    let longer_side = width.max(height);
    let resized = if longer_side > MAX_IMAGE_DIMENSION {
        let scale = MAX_IMAGE_DIMENSION as f64 / longer_side as f64;
        let new_w = (width as f64 * scale).round() as u32;
        let new_h = (height as f64 * scale).round() as u32;
        img.resize(new_w, new_h, FilterType::Lanczos3)
    } else {
        img
    };

    let gray = resized.grayscale();

    let tmp_dir = std::env::temp_dir();
    let input_path = tmp_dir.join(format!("amtbrief-ocr-{}.png", uuid::Uuid::new_v4()));
    gray.save(&input_path)
        .map_err(|e| OcrError::DecodeFailed(e.to_string()))?;

    let result = run_tesseract(&input_path, ocr_binary, languages);
    let _ = std::fs::remove_file(&input_path);
    result
}

/// Invokes the OCR binary exactly once with `oem=3, psm=6`.
fn run_tesseract(input_path: &std::path::Path, ocr_binary: &str, languages: &str) -> Result<String> {
    if which::which(ocr_binary).is_err() {
        warn!(ocr_binary, "OCR binary not found on PATH");
        return Err(OcrError::OcrBinaryMissing(ocr_binary.to_string()));
    }

    let output = std::process::Command::new(ocr_binary)
        .arg(input_path)
        .arg("stdout")
        .arg("--oem")
        .arg("3")
        .arg("--psm")
        .arg("6")
        .arg("-l")
        .arg(languages)
        .output()
        .map_err(|e| OcrError::DecodeFailed(e.to_string()))?;

    if !output.status.success() {
        return Err(OcrError::DecodeFailed(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    let raw = String::from_utf8_lossy(&output.stdout).to_string();
    Ok(clean_text(&raw))
}

/// Strips control characters and collapses runs of whitespace.
fn clean_text(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Observability snapshot for `/api/ocr-status`.
#[derive(Debug, Clone)]
pub struct OcrObservability {
    pub primary_method: &'static str,
    pub tesseract_available: bool,
    pub tesseract_version: Option<String>,
    pub optimized_for_speed: bool,
    pub languages: Vec<&'static str>,
}

pub fn observe(ocr_binary: &str) -> OcrObservability {
    let tesseract_available = which::which(ocr_binary).is_ok();
    let tesseract_version = if tesseract_available {
        std::process::Command::new(ocr_binary)
            .arg("--version")
            .output()
            .ok()
            .map(|o| String::from_utf8_lossy(&o.stdout).lines().next().unwrap_or("").to_string())
    } else {
        None
    };

    OcrObservability {
        primary_method: "tesseract_ocr",
        tesseract_available,
        tesseract_version,
        optimized_for_speed: true,
        languages: vec!["deu", "eng", "rus", "ukr"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_control_chars_and_collapses_whitespace() {
        let dirty = "Hello\x00\x01   World\n\n\n\ttest";
        let cleaned = clean_text(dirty);
        assert_eq!(cleaned, "Hello World test");
    }

    #[test]
    fn printable_ratio_of_empty_is_zero() {
        assert_eq!(printable_ratio(""), 0.0);
    }

    #[test]
    fn printable_ratio_of_clean_text_is_one() {
        assert_eq!(printable_ratio("Sehr geehrte Damen und Herren"), 1.0);
    }

    #[tokio::test]
    async fn oversize_upload_is_rejected() {
        let bytes = vec![0u8; 200];
        let result = extract(&bytes, "image/png", 100, "tesseract", "deu+eng").await;
        assert!(matches!(result, Err(OcrError::InputTooLarge)));
    }

    #[tokio::test]
    async fn unsupported_mime_is_rejected() {
        let bytes = vec![0u8; 10];
        let result = extract(&bytes, "application/zip", 1_000_000, "tesseract", "deu+eng").await;
        assert!(result.is_err());
    }
}
