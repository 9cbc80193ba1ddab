use anyhow::{Context, Result};
use clap::Parser;
use shelf_etl::app::export::write_goodreads_csv;
use shelf_etl::domain::model::BookRecord;
use shelf_etl::utils::logger;

/// 把抓取輸出的 JSON 攤平成 Goodreads 匯入用的 CSV
#[derive(Parser)]
#[command(name = "convert-csv")]
#[command(about = "Flatten scraped book JSON into a Goodreads-compatible CSV")]
struct Args {
    /// Path to the JSON file produced by a scrape run
    #[arg(short, long, default_value = "books_data.json")]
    input: String,

    /// Path of the CSV file to write
    #[arg(short, long, default_value = "books_data.csv")]
    output: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("📁 Reading records from: {}", args.input);
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input file '{}'", args.input))?;

    let records: Vec<BookRecord> = serde_json::from_str(&content)
        .with_context(|| format!("'{}' is not a valid scrape output file", args.input))?;

    tracing::info!("🔄 Flattening {} records", records.len());
    write_goodreads_csv(&records, &args.output)
        .with_context(|| format!("failed to write CSV to '{}'", args.output))?;

    tracing::info!("✅ CSV written to: {}", args.output);
    println!(
        "✅ Converted {} records to {}",
        records.len(),
        args.output
    );

    Ok(())
}
