pub mod pdf_reader;
pub mod renderer;

use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

pub use pdf_reader::{PdfInfo, PdfReader};
pub use renderer::PageRenderer;

/// Pages to extract: every page of a PDF, or one raster image.
#[derive(Debug, Clone)]
pub enum PageSource {
    Pdf {
        reader: PdfReader,
        pages: u32,
        renderer: PageRenderer,
    },
    Image {
        path: PathBuf,
    },
}

impl PageSource {
    /// Open `path`, rendering PDF pages into `render_dir` at `dpi`.
    pub fn open(path: &Path, render_dir: PathBuf, dpi: u32) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("input not found: {}", path.display());
        }
        if is_pdf(path) {
            let reader = PdfReader::new(path.to_path_buf());
            let pages = reader.page_count()?;
            Ok(Self::Pdf {
                reader,
                pages,
                renderer: PageRenderer::new(render_dir, dpi),
            })
        } else {
            Ok(Self::Image {
                path: path.to_path_buf(),
            })
        }
    }

    pub fn page_count(&self) -> u32 {
        match self {
            Self::Pdf { pages, .. } => *pages,
            Self::Image { .. } => 1,
        }
    }

    /// Load page `page_no` (1-based) as an RGB image.
    pub fn load_page(&self, page_no: u32) -> Result<RgbImage> {
        if page_no == 0 || page_no > self.page_count() {
            anyhow::bail!("page {page_no} out of range 1..={}", self.page_count());
        }
        match self {
            Self::Pdf {
                reader, renderer, ..
            } => renderer.render_page(reader.path(), page_no),
            Self::Image { path } => {
                let image = image::open(path)
                    .with_context(|| format!("failed to open image {}", path.display()))?;
                Ok(image.to_rgb8())
            }
        }
    }
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn recognizes_pdf_extension() {
        assert!(is_pdf(Path::new("roll.PDF")));
        assert!(!is_pdf(Path::new("page.png")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[test]
    fn image_source_has_one_page() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("rollextract-input-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("page.png");
        RgbImage::from_pixel(12, 8, Rgb([255, 255, 255])).save(&path)?;

        let source = PageSource::open(&path, dir.join("pages"), 200)?;
        assert_eq!(source.page_count(), 1);
        assert_eq!(source.load_page(1)?.dimensions(), (12, 8));
        assert!(source.load_page(2).is_err());

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
