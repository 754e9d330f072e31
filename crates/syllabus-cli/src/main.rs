use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use syllabus_core::config_file;
use syllabus_ingest::{DocumentVariant, IngestOptions, ProcessedDocument};
use syllabus_parsing::ParsingConfigBuilder;

mod output;

use output::{ColorMode, DocumentReport};

/// Syllabus Extractor - Rebuild readable text from syllabus PDFs and pull out course policies
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log debug events from the extraction pipeline
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract office hours, grading weights, grading scale and late policy
    Extract {
        /// PDF files to process, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Field table to read the documents with
        #[arg(long, value_enum, default_value_t = VariantArg::Standard)]
        variant: VariantArg,

        /// Directory to write each document's reconstructed text to (<stem>.txt)
        #[arg(long)]
        text_out: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Path to output report file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the reconstructed text of a PDF without extracting fields
    Text {
        /// Path to the PDF file
        file_path: PathBuf,

        /// Path to write the text to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VariantArg {
    Standard,
    Contact,
}

impl From<VariantArg> for DocumentVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Standard => DocumentVariant::Standard,
            VariantArg::Contact => DocumentVariant::Contact,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Command::Extract {
            files,
            variant,
            text_out,
            format,
            output,
            no_color,
        } => extract(files, variant.into(), text_out, format, output, no_color),
        Command::Text { file_path, output } => text(file_path, output),
    }
}

/// Resolve options: env vars > config files > defaults.
fn ingest_options(variant: DocumentVariant) -> anyhow::Result<IngestOptions> {
    let config = config_file::load_config();

    let parsing = match &config.fields {
        Some(fields) => ParsingConfigBuilder::from_fields_config(fields).build()?,
        None => ParsingConfigBuilder::new().build()?,
    };

    let ocr = config.ocr.unwrap_or_default();
    let ocr_language = std::env::var("SYLLABUS_OCR_LANG").ok().or(ocr.language);

    Ok(IngestOptions {
        variant,
        parsing,
        ocr_language,
        dpi: ocr.dpi,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn open_writer(output: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Cannot create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    })
}

fn process_one(path: &Path, options: &IngestOptions) -> anyhow::Result<ProcessedDocument> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let document = syllabus_ingest::process_syllabus(path, options)?;
    Ok(document)
}

fn write_text_file(dir: &Path, source: &Path, text: &str) -> anyhow::Result<PathBuf> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let target = dir.join(format!("{stem}.txt"));
    std::fs::write(&target, text)
        .with_context(|| format!("Cannot write {}", target.display()))?;
    Ok(target)
}

fn extract(
    files: Vec<PathBuf>,
    variant: DocumentVariant,
    text_out: Option<PathBuf>,
    format: Format,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let options = ingest_options(variant)?;

    let use_color = !no_color && output.is_none() && format == Format::Text;
    let color = ColorMode(use_color);
    let mut writer = open_writer(output.as_deref())?;

    if let Some(dir) = &text_out {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create {}", dir.display()))?;
    }

    let mut processed: Vec<(String, ProcessedDocument)> = Vec::with_capacity(files.len());
    let mut failed = 0usize;

    for path in &files {
        let file_name = display_name(path);
        match process_one(path, &options) {
            Ok(document) => {
                if let Some(dir) = &text_out {
                    let target = write_text_file(dir, path, &document.text)?;
                    tracing::debug!(path = %target.display(), "wrote reconstructed text");
                }
                processed.push((file_name, document));
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(file = %file_name, error = %e, "document failed");
                if format == Format::Text {
                    output::print_failure(&mut writer, &file_name, &e, color)?;
                } else {
                    eprintln!("{}: {:#}", file_name, e);
                }
            }
        }
    }

    let reports: Vec<DocumentReport<'_>> = processed
        .iter()
        .map(|(file_name, document)| DocumentReport {
            file_name,
            source: document.source,
            fields: &document.fields,
        })
        .collect();

    match format {
        Format::Text => {
            for report in &reports {
                output::print_document(&mut writer, report, color)?;
            }
            output::print_summary(&mut writer, &reports, failed, color)?;
        }
        Format::Json => output::write_json(&mut writer, &reports)?,
    }
    writer.flush()?;

    if failed > 0 {
        anyhow::bail!("{} of {} documents failed", failed, files.len());
    }
    Ok(())
}

fn text(file_path: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let options = ingest_options(DocumentVariant::default())?;
    let (text, source) = syllabus_ingest::document_text(&file_path, &options)?;
    tracing::debug!(file = %file_path.display(), source = ?source, "reconstructed text");

    let mut writer = open_writer(output.as_deref())?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}
