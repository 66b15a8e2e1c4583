use anyhow::{Context, Result};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Rasterizes single PDF pages with `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    out_dir: PathBuf,
    dpi: u32,
}

impl PageRenderer {
    pub fn new(out_dir: PathBuf, dpi: u32) -> Self {
        Self { out_dir, dpi }
    }

    /// Where page `page_no` (1-based) is written.
    pub fn page_path(&self, page_no: u32) -> PathBuf {
        self.out_dir.join(format!("page_{page_no:03}.png"))
    }

    pub fn render_page(&self, pdf_path: &Path, page_no: u32) -> Result<RgbImage> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;

        let image_path = self.page_path(page_no);
        // -singlefile writes exactly `<prefix>.png`
        let prefix = image_path.with_extension("");

        let status = Command::new("pdftoppm")
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(page_no.to_string())
            .arg("-l")
            .arg(page_no.to_string())
            .arg(pdf_path)
            .arg(&prefix)
            .status()
            .with_context(|| "failed to invoke pdftoppm; is poppler-utils installed?")?;

        if !status.success() {
            anyhow::bail!("pdftoppm failed on page {page_no} with status: {status}");
        }

        let image = image::open(&image_path)
            .with_context(|| format!("failed to load rendered page {}", image_path.display()))?;
        Ok(image.to_rgb8())
    }
}
