use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// What `pdfinfo` reports about a roll PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    pub pages: u32,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PdfReader {
    path: PathBuf,
}

impl PdfReader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> Result<PdfInfo> {
        let output = Command::new("pdfinfo")
            .arg(&self.path)
            .output()
            .with_context(|| {
                format!(
                    "failed to invoke pdfinfo on {}; is poppler-utils installed?",
                    self.path.display()
                )
            })?;

        if !output.status.success() {
            anyhow::bail!("pdfinfo failed with status: {}", output.status);
        }

        parse_pdfinfo(&String::from_utf8_lossy(&output.stdout))
            .with_context(|| format!("unexpected pdfinfo output for {}", self.path.display()))
    }

    pub fn page_count(&self) -> Result<u32> {
        Ok(self.info()?.pages)
    }
}

fn parse_pdfinfo(stdout: &str) -> Result<PdfInfo> {
    let mut pages = None;
    let mut page_size = None;
    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("Pages:") {
            let count = rest.trim();
            pages = Some(
                count
                    .parse()
                    .with_context(|| format!("failed to parse page count '{count}'"))?,
            );
        } else if let Some(rest) = line.strip_prefix("Page size:") {
            page_size = Some(rest.trim().to_string());
        }
    }

    let Some(pages) = pages else {
        anyhow::bail!("no 'Pages:' line");
    };
    Ok(PdfInfo { pages, page_size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_pages_and_size() {
        let stdout = "Creator:        scanner\nPages:          12\nEncrypted:      no\nPage size:      595 x 842 pts (A4)\n";
        assert_eq!(
            parse_pdfinfo(stdout).unwrap(),
            PdfInfo {
                pages: 12,
                page_size: Some("595 x 842 pts (A4)".to_string()),
            }
        );
    }

    #[test]
    fn missing_page_line_is_an_error() {
        assert!(parse_pdfinfo("Title: roll\n").is_err());
        assert!(parse_pdfinfo("Pages: many\n").is_err());
    }
}
