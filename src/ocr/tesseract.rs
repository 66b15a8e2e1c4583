use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::core::error::ExtractError;
use crate::ocr::{OcrEngine, RecognitionMode};

const DIGIT_WHITELIST: &str = "tessedit_char_whitelist=0123456789";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TesseractConfig {
    /// Path or name of the `tesseract` executable.
    pub binary: PathBuf,
    pub lang: String,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
        }
    }
}

/// OCR engine backed by the `tesseract` command-line tool. The region is
/// streamed as PNG on stdin and the text read back from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    config: TesseractConfig,
}

impl TesseractCli {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.config.lang = lang;
        self
    }

    /// First line of `tesseract --version`.
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.config.binary)
            .arg("--version")
            .output()
            .with_context(|| {
                format!(
                    "failed to invoke {}; is tesseract installed?",
                    self.config.binary.display()
                )
            })?;
        if !output.status.success() {
            anyhow::bail!("tesseract --version failed with status: {}", output.status);
        }
        // Older releases print the banner on stderr.
        let text = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&text)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string())
    }

    fn args(&self, mode: RecognitionMode) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.lang.clone(),
            "--psm".to_string(),
            mode.page_segmentation_mode().to_string(),
        ];
        if mode == RecognitionMode::SingleDigitToken {
            args.extend(["--oem", "3", "-c", DIGIT_WHITELIST].map(String::from));
        }
        args
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &RgbImage, mode: RecognitionMode) -> Result<String, ExtractError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.config.binary)
            .args(self.args(mode))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ExtractError::Ocr(format!(
                    "failed to invoke {}: {e}",
                    self.config.binary.display()
                ))
            })?;

        // Dropping stdin closes the pipe; the child is reaped even if the
        // write failed.
        let sent = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(&png));
        let output = child.wait_with_output()?;
        sent.map_err(|e| ExtractError::Ocr(format!("failed to send image to tesseract: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
