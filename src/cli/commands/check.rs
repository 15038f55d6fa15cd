//! The `check` subcommand.

use crate::check::{self, CheckOptions};
use crate::cli::args::CheckCommand;
use crate::config::AppConfig;
use crate::error::Result;
use crate::text::part::format_quantity;
use std::path::Path;

pub async fn run(config_path: &Path, cmd: CheckCommand) -> Result<i32> {
    let config = AppConfig::load(config_path)?;
    let options = CheckOptions { write_json: cmd.json };

    // Table IO and the check itself are synchronous; keep them off the
    // runtime threads.
    let bom = cmd.bom.clone();
    let outcome =
        tokio::task::spawn_blocking(move || check::run_check(&config, &bom, &options))
            .await
            .map_err(|e| anyhow::anyhow!("check task failed: {e}"))??;

    let report = &outcome.report;
    let replacements = &report.replacement_summary;
    println!(
        "Invalid parts: {} found, {} replaced, {} previously marked",
        replacements.total_invalid_found,
        replacements.total_replaced,
        replacements.total_invalid_previously_marked
    );
    println!("Binding projects evaluated: {}", report.binding_results.len());

    if report.missing_items.is_empty() {
        println!("Missing items: none");
    } else {
        println!("Missing items: {}", report.missing_items.len());
        for item in &report.missing_items {
            println!(
                "  {}  short {}  {}",
                item.part_no,
                format_quantity(item.missing_qty),
                item.desc
            );
        }
    }

    println!("Important material hits: {}", report.important_hits.len());
    println!("Remainder parts: {}", report.remainder.len());
    println!("Checked table: {}", outcome.checked_path.display());
    println!("Summary: {}", outcome.summary_path.display());
    println!("Remainder: {}", outcome.remainder_path.display());
    if let Some(path) = &outcome.report_path {
        println!("Report: {}", path.display());
    }

    Ok(0)
}
