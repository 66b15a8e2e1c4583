use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rollextract::core::config::ImageParams;
use rollextract::core::model::RawColumn;
use rollextract::input::{is_pdf, PdfReader};
use rollextract::ocr::{TesseractCli, TesseractConfig};
use rollextract::pipeline::{build_document, export_document, reprocess_raw, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "rollextract")]
#[command(version, about = "Extract structured records from scanned electoral roll pages", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract records from a roll PDF or a page image
    Convert {
        /// Input PDF or image path
        input: PathBuf,

        /// Output directory (default: ./<input_name>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ExtractOptions,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Extract records from several inputs, one output directory each
    Batch {
        /// Input PDF or image paths
        inputs: Vec<PathBuf>,

        /// Output directory for all results
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ExtractOptions,
    },

    /// Rebuild processed outputs from a raw CSV
    Reprocess {
        /// raw.csv written by a previous run
        raw_csv: PathBuf,

        /// Output directory (default: the raw CSV's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Raw columns of which at least one must be non-empty to keep a row
        #[arg(long, value_delimiter = ',')]
        required: Vec<RawColumn>,
    },

    /// Show information about an input and the OCR engine
    Info {
        /// Input PDF or image path
        input: PathBuf,

        /// Path to the tesseract executable
        #[arg(long, default_value = "tesseract")]
        tesseract: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct ExtractOptions {
    /// Rendering DPI for PDF pages
    #[arg(long, default_value_t = 200)]
    dpi: u32,

    /// JSON file with image processing parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// Path to the tesseract executable
    #[arg(long, default_value = "tesseract")]
    tesseract: PathBuf,

    /// Tesseract language
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Raw columns of which at least one must be non-empty to keep a row
    #[arg(long, value_delimiter = ',')]
    required: Vec<RawColumn>,

    /// Save box overlay images
    #[arg(short, long)]
    debug: bool,
}

impl ExtractOptions {
    fn pipeline_config(&self, input: PathBuf, output: PathBuf) -> Result<PipelineConfig> {
        let params = match &self.params {
            Some(path) => ImageParams::from_json_file(path)?,
            None => ImageParams::default(),
        };
        let mut config = PipelineConfig::new(input, output, self.dpi)
            .with_params(params)
            .with_tesseract(TesseractConfig {
                binary: self.tesseract.clone(),
                lang: self.lang.clone(),
            })
            .with_debug(self.debug);
        if !self.required.is_empty() {
            config.required_columns = self.required.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Convert {
            input,
            output,
            options,
            quiet,
        } => convert_single(input, output, &options, quiet),
        Commands::Batch {
            inputs,
            output,
            options,
        } => convert_batch(inputs, output, &options),
        Commands::Reprocess {
            raw_csv,
            output,
            required,
        } => reprocess(raw_csv, output, required),
        Commands::Info { input, tesseract } => show_info(input, tesseract),
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "roll".to_string());
    PathBuf::from(format!("{stem}_output"))
}

fn convert_single(
    input: PathBuf,
    output: Option<PathBuf>,
    options: &ExtractOptions,
    quiet: bool,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    if !input.is_file() {
        anyhow::bail!("Input is not a file: {}", input.display());
    }

    let output_dir = output.unwrap_or_else(|| default_output(&input));

    if !quiet {
        println!("[*] Processing: {}", input.display());
        println!("[*] Output: {}", output_dir.display());
        println!("[*] DPI: {}", options.dpi);
    }

    let config = options.pipeline_config(input.clone(), output_dir.clone())?;
    let engine = TesseractCli::new(config.tesseract.clone());

    if !quiet {
        println!("\n[+] Extracting records...");
    }

    let document = build_document(&config, &engine)
        .with_context(|| format!("Failed to process: {}", input.display()))?;

    if !quiet {
        println!(
            "[+] {} raw rows, {} table rows",
            document.raw.len(),
            document.table.len()
        );
        println!("[+] Exporting results...");
    }

    export_document(&document, &config.output)
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;

    if !quiet {
        println!("\n[✓] Done! Results saved to: {}", output_dir.display());
    }

    Ok(())
}

fn convert_batch(inputs: Vec<PathBuf>, output: Option<PathBuf>, options: &ExtractOptions) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let base_output = output.unwrap_or_else(|| PathBuf::from("batch_output"));

    println!("[*] Batch processing {} file(s)", inputs.len());
    println!("[*] Base output: {}\n", base_output.display());

    let mut success = 0;
    let mut failed = 0;

    for (i, input) in inputs.iter().enumerate() {
        println!("[{}/{}] Processing: {}", i + 1, inputs.len(), input.display());

        if !input.exists() {
            eprintln!("  [!] Skipped: file does not exist");
            failed += 1;
            continue;
        }

        let output_dir = base_output.join(default_output(input));

        match convert_single(input.clone(), Some(output_dir), options, true) {
            Ok(()) => {
                println!("  [✓] Success");
                success += 1;
            }
            Err(e) => {
                eprintln!("  [✗] Failed: {e:#}");
                failed += 1;
            }
        }
        println!();
    }

    println!("\n[*] Summary: {} succeeded, {} failed", success, failed);

    if failed > 0 {
        anyhow::bail!("{} file(s) failed to process", failed);
    }

    Ok(())
}

fn reprocess(raw_csv: PathBuf, output: Option<PathBuf>, required: Vec<RawColumn>) -> Result<()> {
    let output_dir = output.unwrap_or_else(|| {
        raw_csv
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let required = if required.is_empty() {
        RawColumn::ALL.to_vec()
    } else {
        required
    };

    println!("[*] Reprocessing: {}", raw_csv.display());
    let document = reprocess_raw(&raw_csv, &required)?;
    export_document(&document, &output_dir)
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;
    println!(
        "[✓] {} table rows saved to: {}",
        document.table.len(),
        output_dir.display()
    );
    Ok(())
}

fn show_info(input: PathBuf, tesseract: PathBuf) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    println!("Input Information");
    println!("=================");
    println!("File: {}", input.display());

    if is_pdf(&input) {
        let info = PdfReader::new(input.clone())
            .info()
            .with_context(|| format!("Failed to read PDF: {}", input.display()))?;
        println!("Pages: {}", info.pages);
        if let Some(size) = info.page_size {
            println!("Page size: {size}");
        }
    } else {
        let (width, height) = image::image_dimensions(&input)
            .with_context(|| format!("Failed to read image: {}", input.display()))?;
        println!("Pages: 1");
        println!("Dimensions: {width}x{height}");
    }

    let engine = TesseractCli::new(TesseractConfig {
        binary: tesseract,
        ..TesseractConfig::default()
    });
    match engine.version() {
        Ok(version) => println!("OCR engine: {version}"),
        Err(e) => println!("OCR engine: unavailable ({e})"),
    }

    Ok(())
}
