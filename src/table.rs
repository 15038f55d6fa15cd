//! Delimited table files (CSV/TSV) and BOM column detection.
//!
//! BOM exports rarely announce which column holds what. The detection
//! heuristics here score columns by their content shape instead of trusting
//! headers alone: quantity columns are mostly numeric, part columns are
//! dominated by `U`-prefixed designators, description columns are found by
//! header keywords. Rows are kept as raw strings so a table can be written
//! back without disturbing cells the check never touched.

use crate::error::{DataError, Result};
use crate::text::part::{is_integral, parse_quantity};
use std::path::{Path, PathBuf};

const QUANTITY_KEYWORDS: [&str; 4] = ["数量", "數量", "qty", "quantity"];

/// One delimited table, header row included.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    name: String,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Reads a table, picking the delimiter from the file extension:
    /// `.tsv` and `.txt` are tab-separated, everything else comma-separated.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DataError::MissingInput {
                path: path.to_path_buf(),
            }
            .into());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter_for(path))
            .from_path(path)?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }

        // Excel CSV exports often start with a UTF-8 BOM.
        if let Some(first_cell) = rows.first_mut().and_then(|cells| cells.first_mut()) {
            if let Some(stripped) = first_cell.strip_prefix('\u{feff}') {
                *first_cell = stripped.to_string();
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            name: table_name(path),
            rows,
        })
    }

    /// Builds a table from in-memory rows.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            rows,
        }
    }

    /// Writes the table to `target` with the delimiter its extension implies.
    pub fn save_as(&self, target: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .delimiter(delimiter_for(target))
            .from_path(target)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Short name used in debug output, normally the file stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the table.
    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell content, empty for anything out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Sets a cell, padding the row with empty cells as needed.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) {
        while self.rows.len() <= row {
            self.rows.push(Vec::new());
        }
        let cells = &mut self.rows[row];
        while cells.len() <= col {
            cells.push(String::new());
        }
        cells[col] = value.into();
    }

    /// Index of the header cell whose trimmed content equals `name`.
    pub fn find_header_column(&self, name: &str) -> Option<usize> {
        let header = self.rows.first()?;
        header.iter().position(|cell| cell.trim() == name)
    }

    /// Finds or appends a header column with the given name.
    pub fn ensure_header_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.find_header_column(name) {
            return idx;
        }
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        let idx = self.max_columns().max(self.rows[0].len());
        self.set_cell(0, idx, name);
        idx
    }

    /// Guesses the quantity column by combining header keywords and numeric
    /// shape.
    ///
    /// Counting both successful and failed parses keeps a mostly-numeric
    /// column selectable even when remark cells like `合计` sit inside it.
    /// The first two columns are skipped since they normally hold the row
    /// number and the part number; ties are broken toward the column with
    /// the most integral values.
    pub fn quantity_column(&self) -> Option<usize> {
        let mut header_candidates: Vec<usize> = Vec::new();
        if let Some(header) = self.rows.first() {
            for (idx, value) in header.iter().enumerate() {
                if idx < 2 {
                    continue;
                }
                let lowered = value.trim().to_lowercase();
                if lowered.is_empty() {
                    continue;
                }
                if QUANTITY_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
                    header_candidates.push(idx);
                }
            }
        }

        // (col, integer_count, numeric_count, failure_count)
        let mut numeric_scores: Vec<(usize, usize, usize, usize)> = Vec::new();
        for col in 2..self.max_columns() {
            let mut integer_count = 0;
            let mut numeric_count = 0;
            let mut failure_count = 0;
            for row in self.rows.iter().skip(1) {
                let value = row.get(col).map(String::as_str).unwrap_or("");
                if value.is_empty() {
                    continue;
                }
                match parse_quantity(value) {
                    None => failure_count += 1,
                    Some(parsed) => {
                        numeric_count += 1;
                        if is_integral(parsed) {
                            integer_count += 1;
                        }
                    }
                }
            }
            if numeric_count > 0 {
                numeric_scores.push((col, integer_count, numeric_count, failure_count));
            }
        }

        if !header_candidates.is_empty() {
            let header_scores: Vec<_> = numeric_scores
                .iter()
                .copied()
                .filter(|score| header_candidates.contains(&score.0))
                .collect();
            if let Some(selected) = select_best(header_scores) {
                return Some(selected);
            }
            // Header names a quantity column but it holds no parsable data;
            // trust the header anyway.
            return Some(header_candidates[0]);
        }

        select_best(numeric_scores)
    }

    /// Guesses the part-number column: the one with the most `U`-prefixed
    /// cells, then the one with the most text overall.
    pub fn part_column(&self) -> Option<usize> {
        // (col, u_count, text_count)
        let mut candidates: Vec<(usize, usize, usize)> = Vec::new();
        for col in 0..self.max_columns() {
            let mut u_count = 0;
            let mut text_count = 0;
            for row in self.rows.iter().skip(1) {
                let text = row.get(col).map(String::as_str).unwrap_or("").trim();
                if text.is_empty() {
                    continue;
                }
                text_count += 1;
                if text.to_uppercase().starts_with('U') {
                    u_count += 1;
                }
            }
            if text_count > 0 {
                candidates.push((col, u_count, text_count));
            }
        }
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.2.cmp(&a.2)));
        Some(candidates[0].0)
    }

    /// Guesses the description column from header keywords in the first five
    /// rows, falling back to the column right of the part column. Columns in
    /// `exclude` are never chosen by keyword.
    pub fn description_column(&self, part_col: Option<usize>, exclude: &[usize]) -> Option<usize> {
        for row in self.rows.iter().take(self.rows.len().min(5)) {
            for (idx, value) in row.iter().enumerate() {
                if exclude.contains(&idx) {
                    continue;
                }
                let lowered = value.trim().to_lowercase();
                if !lowered.is_empty() && (lowered.contains("desc") || lowered.contains("描述")) {
                    return Some(idx);
                }
            }
        }
        if let Some(part) = part_col {
            if part + 1 < self.max_columns() {
                return Some(part + 1);
            }
        }
        None
    }
}

/// Sorts scores by integral count, then parsable count, then fewest
/// failures, then column order, and takes the winner.
fn select_best(mut scores: Vec<(usize, usize, usize, usize)>) -> Option<usize> {
    if scores.is_empty() {
        return None;
    }
    scores.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.3.cmp(&b.3))
            .then_with(|| a.0.cmp(&b.0))
    });
    Some(scores[0].0)
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => b'\t',
        _ => b',',
    }
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Human-readable column reference for debug output.
pub fn column_debug(col: Option<usize>) -> String {
    match col {
        None => "未识别".to_string(),
        Some(idx) => format!("第{}列", idx + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn sample_bom() -> Table {
        Table::from_rows(
            "bom",
            vec![
                row(&["序号", "料号", "描述", "数量"]),
                row(&["1", "U3100-A", "连接器", "2"]),
                row(&["2", "U3200-B", "电阻", "10"]),
                row(&["3", "UL1007", "线材", "合计"]),
            ],
        )
    }

    #[test]
    fn quantity_column_prefers_header_keyword() {
        assert_eq!(sample_bom().quantity_column(), Some(3));
    }

    #[test]
    fn quantity_column_survives_remark_cells() {
        let table = Table::from_rows(
            "bom",
            vec![
                row(&["a", "b", "c", "d"]),
                row(&["1", "U1", "x", "5"]),
                row(&["2", "U2", "y", "-"]),
                row(&["3", "U3", "z", "7"]),
            ],
        );
        assert_eq!(table.quantity_column(), Some(3));
    }

    #[test]
    fn header_keyword_wins_even_without_numeric_data() {
        let table = Table::from_rows(
            "bom",
            vec![
                row(&["a", "b", "Qty", "d"]),
                row(&["1", "U1", "", "x"]),
            ],
        );
        assert_eq!(table.quantity_column(), Some(2));
    }

    #[test]
    fn part_column_follows_u_prefixes() {
        assert_eq!(sample_bom().part_column(), Some(1));
    }

    #[test]
    fn description_column_prefers_keyword_then_neighbor() {
        let table = sample_bom();
        assert_eq!(table.description_column(table.part_column(), &[]), Some(2));

        let headerless = Table::from_rows(
            "bom",
            vec![
                row(&["x", "y", "z", "w"]),
                row(&["1", "U1", "part one", "3"]),
            ],
        );
        assert_eq!(headerless.description_column(Some(1), &[]), Some(2));
    }

    #[test]
    fn description_column_skips_excluded_columns() {
        let table = Table::from_rows(
            "bom",
            vec![
                row(&["x", "y", "z", "替换描述"]),
                row(&["1", "U1", "part one", ""]),
            ],
        );
        assert_eq!(table.description_column(Some(1), &[3]), Some(2));
    }

    #[test]
    fn ensure_header_column_appends_once() {
        let mut table = sample_bom();
        let status = table.ensure_header_column("状态");
        assert_eq!(status, 4);
        assert_eq!(table.ensure_header_column("状态"), 4);
        assert_eq!(table.cell(0, 4), "状态");
    }

    #[test]
    fn roundtrip_preserves_ragged_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bom.csv");
        let mut table = sample_bom();
        table.set_cell(2, 6, "extra");
        table.save_as(&path).unwrap();

        let reloaded = Table::load(&path).unwrap();
        assert_eq!(reloaded.cell(2, 6), "extra");
        assert_eq!(reloaded.cell(1, 1), "U3100-A");
    }

    #[test]
    fn missing_table_is_reported_with_its_path() {
        let err = Table::load(Path::new("no/such/bom.csv")).unwrap_err();
        assert!(err.to_string().contains("no/such/bom.csv"));
    }
}
