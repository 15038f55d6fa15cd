//! System part catalog.
//!
//! The raw inventory export is a wide tab-separated dump. Building the
//! catalog filters it down to the in-house `UC3` part range, drops
//! invalidated parts and rows requested by blocked people, dedupes by
//! normalized part number and writes a five-column table that the rest of
//! the tooling can search.

pub mod blocked;

pub use blocked::BlockedMatcher;

use crate::error::{DataError, Result};
use crate::table::Table;
use crate::text::part::{format_quantity, normalize_part_no};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Column layout of a generated catalog table.
pub const CATALOG_HEADER: [&str; 5] = ["料号", "描述", "单位", "申请人", "库存"];

static QUERY_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s,;，；]+").unwrap_or_else(|e| panic!("invalid query pattern: {e}"))
});

const REQUESTER_TRIM: &[char] = &[',', '，', ';', '；'];

/// One catalog row.
#[derive(Debug, Clone)]
pub struct SystemPartRecord {
    pub part_no: String,
    pub description: String,
    pub unit: String,
    pub requester: String,
    pub inventory: Option<f64>,
}

impl SystemPartRecord {
    /// Category path encoded in the description, segments separated by `;`.
    pub fn categories(&self) -> Vec<String> {
        let segments: Vec<String> = self
            .description
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            vec!["未分类".to_string()]
        } else {
            segments
        }
    }

    pub fn inventory_display(&self) -> String {
        match self.inventory {
            Some(value) => format_quantity(value),
            None => String::new(),
        }
    }
}

/// A loaded catalog table.
#[derive(Debug)]
pub struct PartCatalog {
    path: PathBuf,
    records: Vec<SystemPartRecord>,
}

impl PartCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let table = Table::load(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            records: records_from_catalog_table(&table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[SystemPartRecord] {
        &self.records
    }

    /// Keyword search: every keyword must appear in the part number,
    /// description or requester. An empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<&SystemPartRecord> {
        let keywords = prepare_keywords(query);
        if keywords.is_empty() {
            return self.records.iter().collect();
        }
        self.records
            .iter()
            .filter(|record| matches_query(record, &keywords))
            .collect()
    }
}

/// Builds the filtered catalog next to the raw export and returns its path.
pub fn build_catalog(
    source: &Path,
    invalid_db: &Path,
    blocklist: &Path,
) -> Result<PathBuf> {
    if !source.exists() {
        return Err(DataError::MissingInput {
            path: source.to_path_buf(),
        }
        .into());
    }

    let invalid_parts = load_invalid_part_numbers(invalid_db)?;
    let blocked = BlockedMatcher::from_file(blocklist)?;
    let records = parse_source(source)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut filtered: Vec<SystemPartRecord> = Vec::new();
    for record in records {
        let normalized = normalize_part_no(&record.part_no);
        if !normalized.starts_with("UC3") {
            continue;
        }
        if invalid_parts.contains(&normalized) {
            continue;
        }
        if !record.requester.is_empty() && blocked.matches(&record.requester) {
            continue;
        }
        if !seen.insert(normalized) {
            continue;
        }
        filtered.push(record);
    }

    let destination = catalog_destination(source);
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(filtered.len() + 1);
    rows.push(CATALOG_HEADER.iter().map(|s| s.to_string()).collect());
    for record in &filtered {
        rows.push(vec![
            record.part_no.clone(),
            record.description.clone(),
            record.unit.clone(),
            record.requester.clone(),
            record.inventory_display(),
        ]);
    }
    Table::from_rows("系统料号", rows).save_as(&destination)?;

    log::info!(
        "✓ Wrote part catalog: {} ({} parts)",
        destination.display(),
        filtered.len()
    );
    Ok(destination)
}

fn catalog_destination(source: &Path) -> PathBuf {
    let destination = source.with_extension("csv");
    if destination != source {
        return destination;
    }
    match source.file_name() {
        Some(name) => source.with_file_name(format!("{}.csv", name.to_string_lossy())),
        None => destination,
    }
}

fn parse_source(path: &Path) -> Result<Vec<SystemPartRecord>> {
    let suffix = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match suffix.as_str() {
        "tsv" | "txt" => parse_raw_export(path),
        "csv" => Ok(records_from_catalog_table(&Table::load(path)?)),
        _ => Err(DataError::UnsupportedFormat {
            path: path.to_path_buf(),
        }
        .into()),
    }
}

/// Raw export layout: part number at column 1, description 3, unit 6,
/// requester 9, inventory 10. Narrower rows are headers or noise.
fn parse_raw_export(path: &Path) -> Result<Vec<SystemPartRecord>> {
    let table = Table::load(path)?;
    let mut records = Vec::new();
    for row in table.rows() {
        if row.len() < 11 {
            continue;
        }
        let part_no = row[1].trim().to_string();
        if part_no.is_empty() {
            continue;
        }
        records.push(SystemPartRecord {
            part_no,
            description: row[3].trim().to_string(),
            unit: row[6].trim().to_string(),
            requester: clean_requester_text(&row[9]),
            inventory: convert_inventory(&row[10]),
        });
    }
    Ok(records)
}

fn records_from_catalog_table(table: &Table) -> Vec<SystemPartRecord> {
    let mut records = Vec::new();
    for row_idx in 1..table.row_count() {
        let part_no = table.cell(row_idx, 0).trim().to_string();
        if part_no.is_empty() {
            continue;
        }
        records.push(SystemPartRecord {
            part_no,
            description: table.cell(row_idx, 1).trim().to_string(),
            unit: table.cell(row_idx, 2).trim().to_string(),
            requester: clean_requester_text(table.cell(row_idx, 3)),
            inventory: convert_inventory(table.cell(row_idx, 4)),
        });
    }
    records
}

fn load_invalid_part_numbers(path: &Path) -> Result<HashSet<String>> {
    let mut numbers = HashSet::new();
    if !path.exists() {
        return Ok(numbers);
    }
    let table = Table::load(path)?;
    for row_idx in 1..table.row_count() {
        let invalid_no = table.cell(row_idx, 0).trim();
        if !invalid_no.is_empty() {
            numbers.insert(normalize_part_no(invalid_no));
        }
    }
    Ok(numbers)
}

fn convert_inventory(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn clean_requester_text(value: &str) -> String {
    value.trim().trim_matches(REQUESTER_TRIM).to_string()
}

fn prepare_keywords(query: &str) -> Vec<String> {
    QUERY_SPLIT
        .split(query)
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

fn matches_query(record: &SystemPartRecord, keywords: &[String]) -> bool {
    let haystack = format!(
        "{} {} {}",
        record.part_no.to_lowercase(),
        record.description.to_lowercase(),
        record.requester.to_lowercase()
    );
    keywords.iter().all(|keyword| haystack.contains(keyword.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_line(part_no: &str, desc: &str, unit: &str, requester: &str, inventory: &str) -> String {
        let mut fields = vec![""; 11];
        fields[1] = part_no;
        fields[3] = desc;
        fields[6] = unit;
        fields[9] = requester;
        fields[10] = inventory;
        fields.join("\t")
    }

    #[test]
    fn build_filters_blocks_and_dedupes() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("export.tsv");
        let lines = [
            "编号\t物料编码\t一列\t物料描述\t二列\t三列\t单位\t四列\t五列\t申请人\t库存".to_string(),
            raw_line("UC3100-001", "五金;十字螺丝", "PCS", "王小明", "20"),
            raw_line("UC3100-001", "重复行", "PCS", "王小明", "20"),
            raw_line("UC3100-002", "五金;垫片", "PCS", "张三丰", "8.5"),
            raw_line("UC3100-003", "被屏蔽", "PCS", "李大壮", "3"),
            raw_line("UC3100-004", "已失效", "PCS", "王小明", "1"),
            raw_line("UC8000-001", "范围外", "PCS", "王小明", "9"),
        ];
        std::fs::write(&source, lines.join("\n")).unwrap();

        let invalid_db = tmp.path().join("失效料号.csv");
        std::fs::write(&invalid_db, "失效料号,失效描述,替换料号,替换描述\nUC3100-004,已失效,,\n")
            .unwrap();
        let blocklist = tmp.path().join("屏蔽申请人.txt");
        std::fs::write(&blocklist, "李大壮\n").unwrap();

        let destination = build_catalog(&source, &invalid_db, &blocklist).unwrap();
        assert_eq!(destination, tmp.path().join("export.csv"));

        let catalog = PartCatalog::load(&destination).unwrap();
        let parts: Vec<&str> = catalog
            .records()
            .iter()
            .map(|record| record.part_no.as_str())
            .collect();
        assert_eq!(parts, vec!["UC3100-001", "UC3100-002"]);
        assert_eq!(catalog.records()[1].inventory, Some(8.5));
    }

    #[test]
    fn search_requires_every_keyword() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.csv");
        let rows = vec![
            CATALOG_HEADER.iter().map(|s| s.to_string()).collect(),
            vec![
                "UC3100-001".into(),
                "五金;十字螺丝".into(),
                "PCS".into(),
                "王小明".into(),
                "20".into(),
            ],
            vec![
                "UC3200-001".into(),
                "线材;电源线".into(),
                "PCS".into(),
                "张三".into(),
                "4".into(),
            ],
        ];
        Table::from_rows("catalog", rows).save_as(&path).unwrap();

        let catalog = PartCatalog::load(&path).unwrap();
        assert_eq!(catalog.search("").len(), 2);
        assert_eq!(catalog.search("uc3100 王小明").len(), 1);
        assert_eq!(catalog.search("uc3100 张三").len(), 0);
        assert_eq!(catalog.search("螺丝").len(), 1);
    }

    #[test]
    fn categories_fall_back_when_description_is_empty() {
        let record = SystemPartRecord {
            part_no: "UC3100-001".into(),
            description: "五金; 螺丝 ;".into(),
            unit: "PCS".into(),
            requester: String::new(),
            inventory: None,
        };
        assert_eq!(record.categories(), vec!["五金", "螺丝"]);

        let bare = SystemPartRecord {
            description: String::new(),
            ..record
        };
        assert_eq!(bare.categories(), vec!["未分类"]);
    }

    #[test]
    fn inventory_display_keeps_integers_plain() {
        let mut record = SystemPartRecord {
            part_no: "UC3100-001".into(),
            description: String::new(),
            unit: String::new(),
            requester: String::new(),
            inventory: Some(5.0),
        };
        assert_eq!(record.inventory_display(), "5");
        record.inventory = Some(2.5);
        assert_eq!(record.inventory_display(), "2.5");
        record.inventory = None;
        assert_eq!(record.inventory_display(), "");
    }

    #[test]
    fn unsupported_source_extension_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("export.xlsx");
        std::fs::write(&source, b"binary").unwrap();

        let err = build_catalog(
            &source,
            &tmp.path().join("absent.csv"),
            &tmp.path().join("absent.txt"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported file format"));
    }
}
