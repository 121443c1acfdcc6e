//! Process command - extract data from a single invoice PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invex_core::models::config::PayloadStrategy;
use invex_core::models::invoice::LINE_ITEM_FIELDS;
use invex_core::{InvexConfig, InvoiceProcessor, ProcessingResult, StructuredData};

use super::config::load_config;

/// File name used when `--output` is given without a path.
pub const DEFAULT_OUTPUT_NAME: &str = "invoice_data.json";

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF invoice
    #[arg(required = true)]
    input: PathBuf,

    /// Save the extracted data as JSON (default file: invoice_data.json)
    #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_OUTPUT_NAME)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also print the text extracted from the PDF
    #[arg(long)]
    show_text: bool,

    /// Model identifier (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Locate the JSON object by brace matching instead of fence splitting
    #[arg(long)]
    balanced: bool,

    /// Reject model output that does not have the invoice shape
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Field summary and line item table
    Text,
    /// Structured data as JSON
    Json,
    /// Line items as CSV
    Csv,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args);

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    // Credentials are checked before any work is done
    let processor = InvoiceProcessor::from_config(&config)?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Extracting invoice data...");
    let result = match processor.process_invoice(&args.input).await {
        Ok(result) => result,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    pb.finish_and_clear();
    debug!("Extracted {} chars", result.extracted_text.len());

    println!("{}", format_result(&result, args.format, args.show_text)?);

    if let Some(output_path) = &args.output {
        write_output(output_path, &result.structured_data)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Save the structured data as two-space indented JSON. Failures are not saved.
fn write_output(path: &Path, data: &StructuredData) -> anyhow::Result<()> {
    if data.is_error() {
        anyhow::bail!("Failed to extract data; nothing written to {}", path.display());
    }
    fs::write(path, data.to_pretty_json()?)?;
    Ok(())
}

fn apply_overrides(config: &mut InvexConfig, args: &ProcessArgs) {
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    if args.balanced {
        config.extraction.payload_strategy = PayloadStrategy::Balanced;
    }
    if args.validate {
        config.extraction.validate_schema = true;
    }
}

fn format_result(
    result: &ProcessingResult,
    format: OutputFormat,
    show_text: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if show_text => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Json => Ok(result.structured_data.to_pretty_json()?),
        OutputFormat::Csv => format_csv(&result.structured_data),
        OutputFormat::Text => {
            let mut output = String::new();
            if show_text {
                output.push_str("Extracted Text:\n");
                output.push_str(&result.extracted_text);
                output.push_str("\n\n");
            }
            output.push_str(&format_text(&result.structured_data));
            Ok(output)
        }
    }
}

fn format_text(data: &StructuredData) -> String {
    if let StructuredData::Error(err) = data {
        let mut output = String::new();
        output.push_str(&format!("{}\n", style("Failed to extract data").red()));
        output.push_str(&format!("{}\n\n", err.error));
        output.push_str("Raw response:\n");
        output.push_str(&err.raw_response);
        return output;
    }

    let total = format!(
        "{} {}",
        data.field_or("currency", ""),
        data.field_or("total_amount", "N/A")
    );

    let mut output = String::new();
    output.push_str(&format!("Vendor:          {}\n", data.field_or("vendor_name", "N/A")));
    output.push_str(&format!("Invoice Number:  {}\n", data.field_or("invoice_number", "N/A")));
    output.push_str(&format!("Invoice Date:    {}\n", data.field_or("invoice_date", "N/A")));
    output.push_str(&format!("Due Date:        {}\n", data.field_or("due_date", "N/A")));
    output.push_str(&format!("Total Amount:    {}\n", total.trim_start()));

    let items = data.record().map(|r| r.line_items).unwrap_or_default();
    if !items.is_empty() {
        let rows: Vec<[&str; 4]> = items
            .iter()
            .map(|i| [&*i.description, &*i.quantity, &*i.unit_price, &*i.total])
            .collect();

        let mut widths = LINE_ITEM_FIELDS.map(str::len);
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        output.push_str("\nLine Items:\n");
        output.push_str(&format_row(&LINE_ITEM_FIELDS, &widths));
        for row in &rows {
            output.push_str(&format_row(row, &widths));
        }
    }

    output
}

fn format_row(cells: &[&str; 4], widths: &[usize; 4]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
        .collect();
    format!("  {}\n", padded.join(" | ").trim_end())
}

fn format_csv(data: &StructuredData) -> anyhow::Result<String> {
    if let StructuredData::Error(err) = data {
        anyhow::bail!("Failed to extract data: {}", err.error);
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(LINE_ITEM_FIELDS)?;

    for item in data.record().map(|r| r.line_items).unwrap_or_default() {
        wtr.write_record([&item.description, &item.quantity, &item.unit_price, &item.total])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use invex_core::ExtractionError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn acme() -> StructuredData {
        StructuredData::Record(json!({
            "vendor_name": "Acme Corp",
            "invoice_number": "123",
            "invoice_date": "Not Found",
            "due_date": "2024-01-01",
            "total_amount": "50.00",
            "currency": "USD",
            "line_items": [
                {"description": "Widget", "quantity": "2", "unit_price": "25.00", "total": "50.00"}
            ]
        }))
    }

    #[test]
    fn test_text_summary() {
        console::set_colors_enabled(false);
        let text = format_text(&acme());
        assert!(text.contains("Vendor:          Acme Corp\n"));
        assert!(text.contains("Invoice Number:  123\n"));
        assert!(text.contains("Total Amount:    USD 50.00\n"));
        assert!(text.contains("  description | quantity | unit_price | total\n"));
        assert!(text.contains("  Widget      | 2        | 25.00      | 50.00\n"));
    }

    #[test]
    fn test_text_summary_missing_fields() {
        let text = format_text(&StructuredData::Record(json!({"vendor_name": "Acme Corp"})));
        assert!(text.contains("Due Date:        N/A\n"));
        assert!(text.contains("Total Amount:    N/A\n"));
        assert!(!text.contains("Line Items"));
    }

    #[test]
    fn test_text_failure_shows_raw_response() {
        console::set_colors_enabled(false);
        let data = StructuredData::Error(ExtractionError {
            error: "Failed to parse JSON: expected value at line 1 column 1".to_string(),
            raw_response: "Sorry, I cannot process this.".to_string(),
        });
        let text = format_text(&data);
        assert!(text.starts_with("Failed to extract data\n"));
        assert!(text.ends_with("Raw response:\nSorry, I cannot process this."));
    }

    #[test]
    fn test_csv_line_items() {
        assert_eq!(
            format_csv(&acme()).unwrap(),
            "description,quantity,unit_price,total\nWidget,2,25.00,50.00\n"
        );
    }

    #[test]
    fn test_json_output() {
        let result = ProcessingResult {
            extracted_text: "Invoice #123".to_string(),
            structured_data: StructuredData::Record(json!({"invoice_number": "123"})),
        };
        assert_eq!(
            format_result(&result, OutputFormat::Json, false).unwrap(),
            "{\n  \"invoice_number\": \"123\"\n}"
        );

        let full: serde_json::Value =
            serde_json::from_str(&format_result(&result, OutputFormat::Json, true).unwrap())
                .unwrap();
        assert_eq!(full["extracted_text"], "Invoice #123");
    }

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        process: ProcessArgs,
    }

    fn parse(args: &[&str]) -> ProcessArgs {
        TestCli::try_parse_from(std::iter::once("invex").chain(args.iter().copied()))
            .unwrap()
            .process
    }

    #[test]
    fn test_output_flag_defaults_to_invoice_data_json() {
        let args = parse(&["invoice.pdf", "-o"]);
        assert_eq!(args.output, Some(PathBuf::from(DEFAULT_OUTPUT_NAME)));
        assert_eq!(args.input, PathBuf::from("invoice.pdf"));

        let args = parse(&["invoice.pdf", "--output", "acme.json"]);
        assert_eq!(args.output, Some(PathBuf::from("acme.json")));

        assert_eq!(parse(&["invoice.pdf"]).output, None);
    }

    #[test]
    fn test_write_output_two_space_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_NAME);

        write_output(&path, &acme()).unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.starts_with("{\n  \"vendor_name\": \"Acme Corp\",\n  \"invoice_number\": \"123\","));
        assert!(saved.contains("\n    {\n      \"description\": \"Widget\","));
        let reloaded: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(Some(&reloaded), acme().as_value());
    }

    #[test]
    fn test_write_output_refuses_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_NAME);
        let data = StructuredData::Error(ExtractionError {
            error: "Failed to parse JSON: expected value at line 1 column 1".to_string(),
            raw_response: "Sorry".to_string(),
        });

        let err = write_output(&path, &data).unwrap_err();
        assert!(err.to_string().contains("nothing written"));
        assert!(!path.exists());
    }
}
