use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;
use rayon::prelude::*;

use crate::core::config::ImageParams;
use crate::core::geometry::Rect;
use crate::core::model::{ExtractedDocument, RawColumn, RawRow};
use crate::export::{read_raw_csv, CsvExporter, Exporter, JsonExporter};
use crate::extract::RecordAssembler;
use crate::imaging::debug_draw::{draw_boxes, load_label_font};
use crate::imaging::{BoxLocator, PageLayout};
use crate::input::PageSource;
use crate::ocr::{FieldRecognizer, OcrEngine, TesseractConfig};
use crate::table::TableBuilder;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dpi: u32,
    pub params: ImageParams,
    pub tesseract: TesseractConfig,
    pub required_columns: Vec<RawColumn>,
    /// Write box overlays into `<output>/debug` regardless of `params`.
    pub debug: bool,
}

impl PipelineConfig {
    pub fn new(input: PathBuf, output: PathBuf, dpi: u32) -> Self {
        Self {
            input,
            output,
            dpi,
            params: ImageParams::default(),
            tesseract: TesseractConfig::default(),
            required_columns: RawColumn::ALL.to_vec(),
            debug: false,
        }
    }

    pub fn with_params(mut self, params: ImageParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_tesseract(mut self, tesseract: TesseractConfig) -> Self {
        self.tesseract = tesseract;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn saves_debug_images(&self) -> bool {
        self.debug || self.params.save_debug_images
    }

    fn debug_dir(&self) -> PathBuf {
        self.output.join("debug")
    }
}

/// A record rectangle on a page with its 1-based box number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedRecord {
    pub box_no: u32,
    pub record: Rect,
    /// Serial-number box relative to `record`.
    pub inner: Option<Rect>,
}

/// Raw rows for every record on one page, in box order.
///
/// A page that cannot be binarized is an error. Records without an inner
/// box are skipped with a warning; records that fail later come back with
/// empty fields.
pub fn extract_page(
    page: &RgbImage,
    page_no: u32,
    engine: &dyn OcrEngine,
    config: &PipelineConfig,
) -> Result<Vec<RawRow>> {
    let (layout, located) = locate_records(page, page_no, &config.params)?;

    if config.saves_debug_images() {
        if let Err(err) = save_debug_images(page, page_no, &layout, &located, config) {
            tracing::warn!(page = page_no, error = %err, "failed to write debug images");
        }
    }

    Ok(assemble_records(page, page_no, &located, engine, config))
}

/// Binarize `page` and number its records by decreasing area.
pub fn locate_records(
    page: &RgbImage,
    page_no: u32,
    params: &ImageParams,
) -> Result<(PageLayout, Vec<LocatedRecord>)> {
    let locator = BoxLocator::new(params);
    let layout = locator
        .locate(page)
        .with_context(|| format!("failed to locate records on page {page_no}"))?;
    tracing::info!(page = page_no, boxes = layout.records.len(), "records located");

    let located = layout
        .records
        .iter()
        .enumerate()
        .map(|(i, &record)| LocatedRecord {
            box_no: i as u32 + 1,
            record,
            inner: locator.inner_box(&layout, record),
        })
        .collect();
    Ok((layout, located))
}

/// Read each located record in parallel, keeping the order of `located`.
pub fn assemble_records(
    page: &RgbImage,
    page_no: u32,
    located: &[LocatedRecord],
    engine: &dyn OcrEngine,
    config: &PipelineConfig,
) -> Vec<RawRow> {
    let params = &config.params;
    let assembler = RecordAssembler::new(FieldRecognizer::new(engine, params), params);
    let rows: Vec<RawRow> = located
        .par_iter()
        .filter_map(|&LocatedRecord { box_no, record, inner }| {
            let Some(inner) = inner else {
                tracing::warn!(page = page_no, box_no, ?record, "no inner box found, skipping");
                return None;
            };
            let raw = assembler.assemble(page, record, inner);
            if raw.is_blank() {
                tracing::debug!(page = page_no, box_no, "record produced no text");
            }
            Some(raw.with_provenance(Some(page_no), Some(box_no)))
        })
        .collect();

    tracing::info!(page = page_no, rows = rows.len(), "page extracted");
    rows
}

fn save_debug_images(
    page: &RgbImage,
    page_no: u32,
    layout: &PageLayout,
    located: &[LocatedRecord],
    config: &PipelineConfig,
) -> Result<()> {
    let dir = config.debug_dir();
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let font = load_label_font();

    let overview = draw_boxes(page, &layout.records, None, None, font.as_ref());
    overview.save(dir.join(format!("page_{page_no}_boxes.png")))?;

    let interval = config.params.debug_image_interval.max(1);
    for (i, located) in located.iter().enumerate() {
        if i % interval != 0 {
            continue;
        }
        let image = draw_boxes(page, &layout.records, Some(i), located.inner, font.as_ref());
        image.save(dir.join(format!("page_{page_no}_box_{}.png", located.box_no)))?;
    }
    Ok(())
}

/// Extract every page of `config.input` and build the table.
///
/// A page that fails is logged and left out; the other pages still count.
pub fn build_document(config: &PipelineConfig, engine: &dyn OcrEngine) -> Result<ExtractedDocument> {
    let source = PageSource::open(&config.input, config.output.join("pages"), config.dpi)
        .with_context(|| format!("failed to open input {}", config.input.display()))?;
    let page_count = source.page_count();
    tracing::info!(input = %config.input.display(), pages = page_count, "extracting");

    let mut raw = Vec::new();
    for page_no in 1..=page_count {
        let rows = source
            .load_page(page_no)
            .and_then(|page| extract_page(&page, page_no, engine, config));
        match rows {
            Ok(rows) => raw.extend(rows),
            Err(err) => tracing::error!(page = page_no, error = %format!("{err:#}"), "page skipped"),
        }
    }

    build_from_raw(raw, &config.required_columns)
}

/// Build the table from raw rows, keeping the rows alongside it.
pub fn build_from_raw(raw: Vec<RawRow>, required: &[RawColumn]) -> Result<ExtractedDocument> {
    let table = TableBuilder::new(required.to_vec())
        .build(&raw)
        .context("failed to build result table")?;
    Ok(ExtractedDocument { raw, table })
}

/// Rebuild the table from a previously written `raw.csv`.
pub fn reprocess_raw(raw_csv: &Path, required: &[RawColumn]) -> Result<ExtractedDocument> {
    let raw = read_raw_csv(raw_csv)?;
    tracing::info!(rows = raw.len(), path = %raw_csv.display(), "raw rows loaded");
    build_from_raw(raw, required)
}

pub fn export_document(document: &ExtractedDocument, output: &Path) -> Result<()> {
    let csv_exporter = CsvExporter::new(output.to_path_buf());
    csv_exporter.export(document)?;

    let json_exporter = JsonExporter::new(output.to_path_buf());
    json_exporter.export(document)?;

    Ok(())
}
