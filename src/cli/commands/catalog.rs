//! The `catalog` subcommand.

use crate::catalog::{self, PartCatalog, SystemPartRecord};
use crate::cli::args::CatalogCommand;
use crate::config::AppConfig;
use crate::error::Result;
use std::collections::BTreeMap;
use std::path::Path;

pub fn run(config_path: &Path, cmd: CatalogCommand) -> Result<i32> {
    match cmd {
        CatalogCommand::Build { source } => {
            let config = AppConfig::load(config_path)?;
            let destination = catalog::build_catalog(
                &source,
                &config.invalid_part_db,
                &config.blocked_requesters,
            )?;
            println!("✓ Catalog written to {}", destination.display());
        }
        CatalogCommand::Search {
            catalog: catalog_path,
            keywords,
        } => {
            let catalog = PartCatalog::load(&catalog_path)?;
            let results = catalog.search(&keywords.join(" "));

            let mut by_category: BTreeMap<String, Vec<&SystemPartRecord>> = BTreeMap::new();
            for record in results.iter().copied() {
                by_category
                    .entry(record.categories().remove(0))
                    .or_default()
                    .push(record);
            }
            for (category, records) in &by_category {
                println!("[{}]", category);
                for record in records {
                    println!(
                        "  {}  {}  {}  {}",
                        record.part_no,
                        record.description,
                        record.requester,
                        record.inventory_display()
                    );
                }
            }
            println!("{} parts", results.len());
        }
    }

    Ok(0)
}
