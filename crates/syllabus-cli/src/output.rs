use std::io::Write;

use owo_colors::OwoColorize;
use serde_json::json;
use syllabus_core::{ExtractionResult, TextSource};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// One successfully processed file, as reported to the user.
pub struct DocumentReport<'a> {
    pub file_name: &'a str,
    pub source: TextSource,
    pub fields: &'a ExtractionResult,
}

/// `office_hours` -> `Office hours`
fn field_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn source_label(source: TextSource) -> &'static str {
    match source {
        TextSource::Direct => "text layer",
        TextSource::Ocr => "OCR",
    }
}

/// Print the field report for one document.
pub fn print_document(
    w: &mut dyn Write,
    report: &DocumentReport<'_>,
    color: ColorMode,
) -> std::io::Result<()> {
    let source = format!("({})", source_label(report.source));
    if color.enabled() {
        writeln!(w, "{} {}", report.file_name.bold(), source.dimmed())?;
    } else {
        writeln!(w, "{} {}", report.file_name, source)?;
    }

    for field in report.fields.iter() {
        let label = format!("{}:", field_label(&field.name));
        match field.value.as_deref() {
            Some(value) => {
                if color.enabled() {
                    writeln!(w, "  {}", label.cyan())?;
                } else {
                    writeln!(w, "  {}", label)?;
                }
                for line in value.lines() {
                    writeln!(w, "    {}", line)?;
                }
            }
            None => {
                if color.enabled() {
                    writeln!(w, "  {} {}", label.cyan(), "NOT FOUND".red().bold())?;
                } else {
                    writeln!(w, "  {} NOT FOUND", label)?;
                }
            }
        }
    }

    writeln!(w)?;
    Ok(())
}

/// Print a per-document failure without aborting the run.
pub fn print_failure(
    w: &mut dyn Write,
    file_name: &str,
    error: &anyhow::Error,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", file_name.bold(), "FAILED".red().bold())?;
    } else {
        writeln!(w, "{} FAILED", file_name)?;
    }
    writeln!(w, "  {:#}", error)?;
    writeln!(w)?;
    Ok(())
}

/// Print the final tally across all documents.
pub fn print_summary(
    w: &mut dyn Write,
    reports: &[DocumentReport<'_>],
    failed: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let fields: usize = reports.iter().map(|r| r.fields.len()).sum();
    let found: usize = reports.iter().map(|r| r.fields.found_count()).sum();
    let via_ocr = reports
        .iter()
        .filter(|r| r.source == TextSource::Ocr)
        .count();

    let line = format!(
        "{} processed ({} via OCR), {} failed; {}/{} fields found",
        reports.len(),
        via_ocr,
        failed,
        found,
        fields
    );
    if color.enabled() && failed > 0 {
        writeln!(w, "{}", line.yellow())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Write every successful document as a JSON array.
///
/// Absent fields serialize as the "Not found" sentinel.
pub fn write_json(w: &mut dyn Write, reports: &[DocumentReport<'_>]) -> anyhow::Result<()> {
    let documents: Vec<serde_json::Value> = reports
        .iter()
        .map(|r| {
            json!({
                "file": r.file_name,
                "source": r.source,
                "fields": r.fields,
            })
        })
        .collect();

    serde_json::to_writer_pretty(&mut *w, &documents)?;
    writeln!(w)?;
    Ok(())
}
