//! BOM check engine.
//!
//! A check run walks one BOM table through four stages: invalid parts are
//! marked and given replacements from the database, quantities are
//! aggregated per normalized part number, binding projects consume inventory
//! greedily, and important-material keywords are matched against whatever
//! the parts and descriptions call themselves. The marked table plus summary
//! and remainder tables are written next to the input; the input itself is
//! never modified.

pub mod report;

use crate::binding::{BindingChoice, BindingGroup, BindingLibrary};
use crate::config::AppConfig;
use crate::error::{DataError, Result};
use crate::table::{Table, column_debug};
use crate::text::part::{format_quantity, is_probable_part_no, normalize_part_no, parse_quantity};
use crate::text::{normalize_text, normalized_variants};
use report::{
    BindingProjectResult, CheckReport, ImportantMaterialHit, MatchedPart, MissingItem,
    RemainderItem, ReplacementRecord, ReplacementSummary, RequirementGroupResult,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Header of the column that flags a row as invalid.
pub const STATUS_HEADER: &str = "状态";
/// Header of the column holding the replacement part number.
pub const REPLACEMENT_NO_HEADER: &str = "替换料号";
/// Header of the column holding the replacement description.
pub const REPLACEMENT_DESC_HEADER: &str = "替换描述";
/// Cell value marking a row whose part number is invalid.
pub const INVALID_MARK: &str = "已失效";

/// Switches for a check run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Also write the full report as JSON.
    pub write_json: bool,
}

/// Where a check run puts its outputs.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub report: CheckReport,
    pub checked_path: PathBuf,
    pub summary_path: PathBuf,
    pub remainder_path: PathBuf,
    pub report_path: Option<PathBuf>,
}

/// Runs the full check against one BOM table.
pub fn run_check(config: &AppConfig, bom_path: &Path, options: &CheckOptions) -> Result<CheckOutcome> {
    let library = BindingLibrary::load(&config.binding_library)?;
    let mut table = Table::load(bom_path)?;
    if table.row_count() == 0 {
        return Err(DataError::EmptyTable {
            path: bom_path.to_path_buf(),
        }
        .into());
    }

    let invalid_entries = load_invalid_entries(&config.invalid_part_db)?;
    let mut markers = MarkerColumns::locate(&table);
    let mut debug_logs: Vec<String> = Vec::new();

    // 1. Mark invalid parts and attach replacements.
    let (replacement_summary, replacement_logs) =
        apply_replacements(&mut table, &invalid_entries, &mut markers);
    debug_logs.extend(replacement_logs);

    // 2. Aggregate quantities, descriptions and display names per part.
    let (mut quantities, mut descriptions, mut display, extract_logs) =
        extract_part_quantities(&table, &markers);
    debug_logs.extend(extract_logs);

    // 3. Fold replaced parts into their replacements.
    for record in &replacement_summary.records {
        let Some(replacement_no) = &record.replacement_part_no else {
            continue;
        };
        let invalid_key = normalize_part_no(&record.invalid_part_no);
        let replacement_key = normalize_part_no(replacement_no);

        let qty = quantities.remove(&invalid_key).unwrap_or(0.0);
        descriptions.remove(&invalid_key);
        display.remove(&invalid_key);

        if qty != 0.0 {
            *quantities.entry(replacement_key.clone()).or_insert(0.0) += qty;
        }
        display
            .entry(replacement_key.clone())
            .or_insert_with(|| replacement_no.clone());
        if let Some(desc) = &record.replacement_desc {
            descriptions
                .entry(replacement_key)
                .or_insert_with(|| desc.clone());
        }
    }

    // 4. Evaluate binding projects against the aggregated inventory.
    let mut available = quantities.clone();
    let (binding_results, missing_items, used_parts, binding_logs) = evaluate_binding(
        &quantities,
        &mut available,
        &descriptions,
        &display,
        &library,
    );
    debug_logs.extend(binding_logs);

    // 5. Scan for important materials.
    let (important_hits, important_parts, important_logs) = scan_important_materials(
        &config.important_materials,
        &quantities,
        &display,
        &descriptions,
    )?;
    debug_logs.extend(important_logs);

    // 6. Whatever no binding consumed, plus every important hit, remains.
    let mut remainder_keys: BTreeSet<String> = quantities
        .keys()
        .filter(|key| !used_parts.contains(*key))
        .cloned()
        .collect();
    remainder_keys.extend(important_parts);

    let mut remainder: Vec<RemainderItem> = remainder_keys
        .iter()
        .map(|key| RemainderItem {
            part_no: display.get(key).cloned().unwrap_or_else(|| key.clone()),
            desc: descriptions.get(key).cloned().unwrap_or_default(),
            quantity: quantities.get(key).copied().unwrap_or(0.0),
        })
        .collect();
    remainder.sort_by(|a, b| a.part_no.cmp(&b.part_no));

    let report_doc = CheckReport {
        replacement_summary,
        binding_results,
        important_hits,
        missing_items,
        remainder,
        debug_logs,
    };

    // 7. Write the outputs next to the input.
    let paths = OutputPaths::for_input(bom_path);
    table.save_as(&paths.checked)?;
    report::write_summary_csv(&report_doc, &paths.summary)?;
    report::write_remainder_csv(&report_doc, &paths.remainder)?;
    let report_path = if options.write_json {
        report::write_json(&report_doc, &paths.report)?;
        Some(paths.report.clone())
    } else {
        None
    };

    log::info!("✓ Wrote checked table: {}", paths.checked.display());
    log::info!("✓ Wrote summary: {}", paths.summary.display());
    log::info!("✓ Wrote remainder: {}", paths.remainder.display());

    Ok(CheckOutcome {
        report: report_doc,
        checked_path: paths.checked,
        summary_path: paths.summary,
        remainder_path: paths.remainder,
        report_path,
    })
}

struct OutputPaths {
    checked: PathBuf,
    summary: PathBuf,
    remainder: PathBuf,
    report: PathBuf,
}

impl OutputPaths {
    /// Derives sibling output paths from the input table. Re-checking a
    /// `.checked` output overwrites it in place instead of stacking
    /// suffixes.
    fn for_input(bom_path: &Path) -> Self {
        let dir = match bom_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = bom_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bom".to_string());
        let base = stem.strip_suffix(".checked").unwrap_or(&stem).to_string();
        let extension = bom_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("csv")
            .to_string();

        Self {
            checked: dir.join(format!("{}.checked.{}", base, extension)),
            summary: dir.join(format!("{}.summary.csv", base)),
            remainder: dir.join(format!("{}.remainder.csv", base)),
            report: dir.join(format!("{}.report.json", base)),
        }
    }
}

/// Positions of the marker columns, when present.
#[derive(Debug, Clone, Copy, Default)]
struct MarkerColumns {
    status: Option<usize>,
    replacement_no: Option<usize>,
    replacement_desc: Option<usize>,
}

impl MarkerColumns {
    fn locate(table: &Table) -> Self {
        Self {
            status: table.find_header_column(STATUS_HEADER),
            replacement_no: table.find_header_column(REPLACEMENT_NO_HEADER),
            replacement_desc: table.find_header_column(REPLACEMENT_DESC_HEADER),
        }
    }

    /// Columns that detection heuristics must not mistake for data.
    fn excluded(&self) -> Vec<usize> {
        [self.status, self.replacement_no, self.replacement_desc]
            .iter()
            .flatten()
            .copied()
            .collect()
    }

    /// Appends any missing marker headers and returns all three positions.
    /// Called lazily so tables without invalid parts stay untouched.
    fn ensure(&mut self, table: &mut Table) -> (usize, usize, usize) {
        let status = match self.status {
            Some(idx) => idx,
            None => {
                let idx = table.ensure_header_column(STATUS_HEADER);
                self.status = Some(idx);
                idx
            }
        };
        let replacement_no = match self.replacement_no {
            Some(idx) => idx,
            None => {
                let idx = table.ensure_header_column(REPLACEMENT_NO_HEADER);
                self.replacement_no = Some(idx);
                idx
            }
        };
        let replacement_desc = match self.replacement_desc {
            Some(idx) => idx,
            None => {
                let idx = table.ensure_header_column(REPLACEMENT_DESC_HEADER);
                self.replacement_desc = Some(idx);
                idx
            }
        };
        (status, replacement_no, replacement_desc)
    }

    fn is_marked(&self, table: &Table, row: usize) -> bool {
        match self.status {
            Some(col) => table.cell(row, col).trim() == INVALID_MARK,
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
struct InvalidEntry {
    invalid_no: String,
    invalid_desc: String,
    replacement_no: Option<String>,
    replacement_desc: Option<String>,
}

/// Loads the invalid-part database keyed by normalized part number.
///
/// The table must carry four columns: invalid part, its description, the
/// replacement part and the replacement description. Later rows win when a
/// part is listed twice.
fn load_invalid_entries(path: &Path) -> Result<BTreeMap<String, InvalidEntry>> {
    let table = Table::load(path)?;
    if table.row_count() > 0 && table.max_columns() < 4 {
        return Err(DataError::BadDatabase {
            path: path.to_path_buf(),
            reason: format!(
                "expected 4 columns (invalid part, description, replacement, replacement description), found {}",
                table.max_columns()
            ),
        }
        .into());
    }

    let mut entries = BTreeMap::new();
    for row in 1..table.row_count() {
        let invalid_no = table.cell(row, 0).trim().to_string();
        if invalid_no.is_empty() {
            continue;
        }
        let invalid_desc = table.cell(row, 1).trim().to_string();
        let replacement_no = non_empty(table.cell(row, 2));
        let replacement_desc = non_empty(table.cell(row, 3));
        entries.insert(
            normalize_part_no(&invalid_no),
            InvalidEntry {
                invalid_no,
                invalid_desc,
                replacement_no,
                replacement_desc,
            },
        );
    }
    Ok(entries)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Marks rows whose part number is in the invalid database and writes the
/// replacement columns. Rows already carrying a mark are counted but left
/// alone.
fn apply_replacements(
    table: &mut Table,
    entries: &BTreeMap<String, InvalidEntry>,
    markers: &mut MarkerColumns,
) -> (ReplacementSummary, Vec<String>) {
    let mut summary = ReplacementSummary::default();
    let mut debug_logs = Vec::new();

    let part_col = table.part_column();
    debug_logs.push(format!(
        "[{}] 识别料号列: {}",
        table.name(),
        column_debug(part_col)
    ));
    let Some(part_col) = part_col else {
        return (summary, debug_logs);
    };

    for row_idx in 1..table.row_count() {
        if part_col >= table.rows()[row_idx].len() {
            continue;
        }
        let part_text = table.cell(row_idx, part_col).trim().to_string();
        if part_text.is_empty() {
            continue;
        }
        let Some(entry) = entries.get(&normalize_part_no(&part_text)) else {
            continue;
        };

        summary.total_invalid_found += 1;
        if row_already_replaced(table, row_idx, part_col, markers, entry.replacement_no.as_deref())
        {
            summary.total_invalid_previously_marked += 1;
            debug_logs.push(format!(
                "[{}] 行{} 失效料号 {} 已标记替换，跳过",
                table.name(),
                row_idx + 1,
                part_text
            ));
            continue;
        }

        let (status_col, replacement_col, desc_col) = markers.ensure(table);
        table.set_cell(row_idx, status_col, INVALID_MARK);
        if let Some(replacement_no) = &entry.replacement_no {
            table.set_cell(row_idx, replacement_col, replacement_no.clone());
            table.set_cell(
                row_idx,
                desc_col,
                entry.replacement_desc.clone().unwrap_or_default(),
            );
            summary.total_replaced += 1;
        }

        summary.records.push(ReplacementRecord {
            invalid_part_no: entry.invalid_no.clone(),
            invalid_desc: entry.invalid_desc.clone(),
            replacement_part_no: entry.replacement_no.clone(),
            replacement_desc: entry.replacement_desc.clone(),
            table_name: table.name().to_string(),
            row_index: row_idx + 1,
        });

        debug_logs.push(format!(
            "[{}] 行{} 命中失效料号 {} -> {}",
            table.name(),
            row_idx + 1,
            part_text,
            entry.replacement_no.as_deref().unwrap_or("无替换")
        ));
    }

    (summary, debug_logs)
}

/// A row counts as already replaced when the replacement part is present
/// anywhere in it, or when it carries the invalid mark and either has a
/// replacement filled in or no replacement exists to add.
fn row_already_replaced(
    table: &Table,
    row: usize,
    part_col: usize,
    markers: &MarkerColumns,
    replacement_no: Option<&str>,
) -> bool {
    if let Some(replacement) = replacement_no {
        if row_contains_part(table, row, part_col, replacement) {
            return true;
        }
    }
    if markers.is_marked(table, row) {
        let has_replacement_value = markers
            .replacement_no
            .map(|col| !table.cell(row, col).trim().is_empty())
            .unwrap_or(false);
        if has_replacement_value {
            return true;
        }
        if replacement_no.is_none() {
            return true;
        }
    }
    false
}

fn row_contains_part(table: &Table, row: usize, part_col: usize, part_no: &str) -> bool {
    if part_no.is_empty() {
        return false;
    }
    let target = normalize_part_no(part_no);
    for (idx, value) in table.rows()[row].iter().enumerate() {
        if idx == part_col || value.is_empty() {
            continue;
        }
        if normalize_part_no(value) == target {
            return true;
        }
    }
    false
}

/// Reads the replacement columns of a row, yielding display text, normalized
/// key and optional description.
fn replacement_in_row(
    table: &Table,
    row: usize,
    markers: &MarkerColumns,
) -> Option<(String, String, Option<String>)> {
    let col = markers.replacement_no?;
    let text = table.cell(row, col).trim();
    if text.is_empty() || !is_probable_part_no(text) {
        return None;
    }
    let desc = markers
        .replacement_desc
        .and_then(|desc_col| non_empty(table.cell(row, desc_col)));
    Some((text.to_string(), normalize_part_no(text), desc))
}

/// Resolves which part a row contributes to the aggregation: the row's own
/// part unless the row is marked invalid, in which case its replacement.
fn resolve_row_part(
    table: &Table,
    row: usize,
    part_col: usize,
    markers: &MarkerColumns,
) -> Option<(String, String, Option<String>)> {
    let text = table.cell(row, part_col).trim().to_string();
    let marked = markers.is_marked(table, row);

    if !text.is_empty() && !marked && is_probable_part_no(&text) {
        return Some((normalize_part_no(&text), text, None));
    }

    if let Some((display_no, normalized, desc)) = replacement_in_row(table, row, markers) {
        return Some((normalized, display_no, desc));
    }

    // Header-like rows and rows whose only content was marked away.
    if !text.is_empty() && !is_probable_part_no(&text) {
        return None;
    }
    if marked {
        return None;
    }
    if !text.is_empty() {
        return Some((normalize_part_no(&text), text, None));
    }
    None
}

type Aggregates = (
    BTreeMap<String, f64>,
    BTreeMap<String, String>,
    BTreeMap<String, String>,
    Vec<String>,
);

/// Aggregates quantity, description and display name per normalized part.
/// Rows without a parsable quantity count as zero; a missing quantity
/// column counts every row once.
fn extract_part_quantities(table: &Table, markers: &MarkerColumns) -> Aggregates {
    let mut quantities: BTreeMap<String, f64> = BTreeMap::new();
    let mut descriptions: BTreeMap<String, String> = BTreeMap::new();
    let mut display: BTreeMap<String, String> = BTreeMap::new();
    let mut debug_logs: Vec<String> = Vec::new();

    let qty_col = table.quantity_column();
    let part_col = table.part_column();
    let desc_col = table.description_column(part_col, &markers.excluded());
    debug_logs.push(format!(
        "[{}] 数量列: {}, 料号列: {}, 描述列: {}",
        table.name(),
        column_debug(qty_col),
        column_debug(part_col),
        column_debug(desc_col)
    ));

    let Some(part_col) = part_col else {
        return (quantities, descriptions, display, debug_logs);
    };

    for row_idx in 1..table.row_count() {
        let row_len = table.rows()[row_idx].len();
        if part_col >= row_len {
            continue;
        }

        let Some((normalized, display_no, override_desc)) =
            resolve_row_part(table, row_idx, part_col, markers)
        else {
            continue;
        };
        display.entry(normalized.clone()).or_insert(display_no);

        let mut desc_value = override_desc;
        if desc_value.is_none() {
            let desc_text = match desc_col {
                Some(col) => table.cell(row_idx, col).trim(),
                None => table.cell(row_idx, part_col + 1).trim(),
            };
            if !desc_text.is_empty() {
                desc_value = Some(desc_text.to_string());
            }
        }
        if let Some(desc) = desc_value {
            descriptions.entry(normalized.clone()).or_insert(desc);
        }

        let mut quantity = 1.0;
        if let Some(col) = qty_col {
            if col < row_len {
                let raw = table.cell(row_idx, col);
                match parse_quantity(raw) {
                    Some(parsed) => quantity = parsed,
                    None => {
                        quantity = 0.0;
                        debug_logs.push(format!(
                            "[{}] 行{} 数量列值 {:?} 无法解析，按0处理",
                            table.name(),
                            row_idx + 1,
                            raw
                        ));
                    }
                }
            }
        }

        *quantities.entry(normalized).or_insert(0.0) += quantity;
    }

    (quantities, descriptions, display, debug_logs)
}

type BindingEvaluation = (
    Vec<BindingProjectResult>,
    Vec<MissingItem>,
    BTreeSet<String>,
    Vec<String>,
);

/// Walks every binding project whose index part is present, consuming
/// inventory and collecting shortages.
fn evaluate_binding(
    quantities: &BTreeMap<String, f64>,
    available: &mut BTreeMap<String, f64>,
    descriptions: &BTreeMap<String, String>,
    display: &BTreeMap<String, String>,
    library: &BindingLibrary,
) -> BindingEvaluation {
    let mut results = Vec::new();
    let mut missing_keys: Vec<String> = Vec::new();
    let mut missing_items: Vec<MissingItem> = Vec::new();
    let mut used_parts: BTreeSet<String> = BTreeSet::new();
    let mut debug_logs = Vec::new();

    for project in library.projects() {
        let index_key = normalize_part_no(&project.index_part_no);
        let project_qty = quantities.get(&index_key).copied().unwrap_or(0.0);
        if project_qty <= 0.0 {
            continue;
        }
        let available_index_qty = available.get(&index_key).copied().unwrap_or(0.0);
        if available_index_qty <= 0.0 {
            continue;
        }

        let consumption_qty = project_qty.min(available_index_qty);
        available.insert(index_key.clone(), (available_index_qty - consumption_qty).max(0.0));
        used_parts.insert(index_key);

        debug_logs.push(format!(
            "[绑定]{}({}) 主料需求: {} 可用: {}",
            project.project_desc,
            project.index_part_no,
            format_quantity(project_qty),
            format_quantity(available_index_qty)
        ));

        let mut group_results = Vec::new();
        for group in &project.required_groups {
            let result = evaluate_group(group, consumption_qty, available, quantities, display);

            if result.missing_qty > 0.0 {
                for part_no in &result.missing_choices {
                    let part_key = normalize_part_no(part_no);
                    let description = descriptions
                        .get(&part_key)
                        .cloned()
                        .filter(|desc| !desc.is_empty())
                        .unwrap_or_else(|| lookup_choice_desc(group, part_no));
                    let display_no = display.get(&part_key).cloned().unwrap_or_else(|| part_no.clone());

                    let position = match missing_keys.iter().position(|key| *key == part_key) {
                        Some(position) => position,
                        None => {
                            missing_keys.push(part_key);
                            missing_items.push(MissingItem {
                                part_no: display_no,
                                desc: description.clone(),
                                missing_qty: 0.0,
                            });
                            missing_items.len() - 1
                        }
                    };
                    let item = &mut missing_items[position];
                    if item.desc.is_empty() && !description.is_empty() {
                        item.desc = description;
                    }
                    item.missing_qty += result.missing_qty;
                }
            }

            for matched in &result.matched_details {
                used_parts.insert(normalize_part_no(&matched.part_no));
            }

            group_results.push(result);
        }

        results.push(BindingProjectResult {
            project_desc: project.project_desc.clone(),
            index_part_no: project.index_part_no.clone(),
            matched_quantity: consumption_qty,
            requirement_results: group_results,
        });
    }

    (results, missing_items, used_parts, debug_logs)
}

/// Satisfies one requirement group greedily, richest stock first.
fn evaluate_group(
    group: &BindingGroup,
    project_qty: f64,
    available: &mut BTreeMap<String, f64>,
    reference: &BTreeMap<String, f64>,
    display: &BTreeMap<String, String>,
) -> RequirementGroupResult {
    let required_qty = project_qty * group.number;
    let mut available_qty = 0.0;
    let mut fulfilled_qty = 0.0;
    let mut matched_details: Vec<MatchedPart> = Vec::new();
    // (choice order, part, normalized key, free stock)
    let mut applicable: Vec<(usize, String, String, f64)> = Vec::new();
    let mut fallback_choices: Vec<String> = Vec::new();
    let mut first_applicable: Option<String> = None;
    let mut requirement_enabled = false;

    for (idx, choice) in group.choices.iter().enumerate() {
        if choice.part_no.is_empty() {
            continue;
        }
        if !choice_condition_met(choice, reference) {
            continue;
        }

        requirement_enabled = true;
        fallback_choices.push(choice.part_no.clone());

        let choice_key = normalize_part_no(&choice.part_no);
        let total_stock = reference.get(&choice_key).copied().unwrap_or(0.0);
        if total_stock > 0.0 {
            available_qty += total_stock;
        }
        let stock = available.get(&choice_key).copied().unwrap_or(0.0).max(0.0);
        applicable.push((idx, choice.part_no.clone(), choice_key, stock));
        if first_applicable.is_none() {
            first_applicable = Some(choice.part_no.clone());
        }
    }

    if !requirement_enabled {
        return RequirementGroupResult {
            group_name: group.group_name.clone(),
            required_qty: 0.0,
            available_qty: 0.0,
            missing_qty: 0.0,
            missing_choices: Vec::new(),
            matched_details: Vec::new(),
        };
    }

    applicable.sort_by(|a, b| {
        b.3.partial_cmp(&a.3)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    for (_idx, part_no, choice_key, _stock) in &applicable {
        let remaining_need = (required_qty - fulfilled_qty).max(0.0);
        if remaining_need <= 0.0 {
            break;
        }

        let current_stock = available.get(choice_key).copied().unwrap_or(0.0).max(0.0);
        if current_stock <= 0.0 {
            continue;
        }

        let take_amount = current_stock.min(remaining_need);
        if take_amount <= 0.0 {
            continue;
        }

        let display_no = display.get(choice_key).cloned().unwrap_or_else(|| part_no.clone());
        match matched_details.iter_mut().find(|item| item.part_no == display_no) {
            Some(item) => item.quantity += take_amount,
            None => matched_details.push(MatchedPart {
                part_no: display_no,
                quantity: take_amount,
            }),
        }
        fulfilled_qty += take_amount;
        available.insert(choice_key.clone(), (current_stock - take_amount).max(0.0));
    }

    let missing_qty = (required_qty - fulfilled_qty).max(0.0);
    let mut missing_choices: Vec<String> = Vec::new();
    if missing_qty > 0.0 {
        if let Some(first) = first_applicable {
            missing_choices.push(first);
        } else if let Some(fallback) = fallback_choices.first() {
            missing_choices.push(fallback.clone());
        }
        if missing_choices.is_empty() {
            missing_choices = group
                .choices
                .iter()
                .filter(|choice| !choice.part_no.is_empty())
                .map(|choice| choice.part_no.clone())
                .collect();
        }
    }

    RequirementGroupResult {
        group_name: group.group_name.clone(),
        required_qty,
        available_qty,
        missing_qty,
        missing_choices,
        matched_details,
    }
}

fn lookup_choice_desc(group: &BindingGroup, part_no: &str) -> String {
    group
        .choices
        .iter()
        .find(|choice| choice.part_no == part_no && !choice.desc.is_empty())
        .map(|choice| choice.desc.clone())
        .unwrap_or_default()
}

/// Whether a choice's condition gate passes against the full inventory.
/// An empty mode always passes; a mode without condition parts never does.
fn choice_condition_met(choice: &BindingChoice, quantities: &BTreeMap<String, f64>) -> bool {
    let mode = choice
        .condition_mode
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_uppercase();
    if mode.is_empty() {
        return true;
    }

    let condition_keys: Vec<String> = choice
        .condition_part_nos
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| normalize_part_no(part))
        .collect();
    if condition_keys.is_empty() {
        return false;
    }

    let has_part =
        |key: &String| quantities.get(key).map(|qty| *qty > 0.0).unwrap_or(false);
    match mode.as_str() {
        "ALL" => condition_keys.iter().all(has_part),
        "ANY" => condition_keys.iter().any(has_part),
        "NOTANY" => !condition_keys.iter().any(has_part),
        _ => true,
    }
}

type ImportantScan = (Vec<ImportantMaterialHit>, BTreeSet<String>, Vec<String>);

/// Matches every keyword from the important-material list against part
/// numbers, display names and descriptions, in both Chinese scripts.
fn scan_important_materials(
    keywords_path: &Path,
    quantities: &BTreeMap<String, f64>,
    display: &BTreeMap<String, String>,
    descriptions: &BTreeMap<String, String>,
) -> Result<ImportantScan> {
    let mut hits = Vec::new();
    let mut matched_parts: BTreeSet<String> = BTreeSet::new();
    let mut debug_logs = Vec::new();

    if !keywords_path.exists() {
        return Ok((hits, matched_parts, debug_logs));
    }

    let content = std::fs::read_to_string(keywords_path)?;
    let keywords: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut variant_cache: HashMap<String, BTreeSet<String>> = HashMap::new();

    for keyword in keywords {
        let normalized_keyword = normalize_text(keyword);
        let mut keyword_variants = normalized_variants(keyword);
        if !normalized_keyword.is_empty() {
            keyword_variants.insert(normalized_keyword.clone());
        }

        let mut total_qty = 0.0;
        let mut matched_detail: Vec<MatchedPart> = Vec::new();

        for (part_key, qty) in quantities {
            let variants = variant_cache.entry(part_key.clone()).or_insert_with(|| {
                collect_part_variants(
                    display.get(part_key).map(String::as_str).unwrap_or(part_key),
                    part_key,
                    descriptions.get(part_key).map(String::as_str).unwrap_or(""),
                )
            });

            if !variants_match(&keyword_variants, variants) {
                continue;
            }

            let display_no = display.get(part_key).cloned().unwrap_or_else(|| part_key.clone());
            total_qty += qty;
            match matched_detail.iter_mut().find(|item| item.part_no == display_no) {
                Some(item) => item.quantity += qty,
                None => matched_detail.push(MatchedPart {
                    part_no: display_no,
                    quantity: *qty,
                }),
            }
            matched_parts.insert(part_key.clone());
        }

        if total_qty != 0.0 {
            debug_logs.push(format!(
                "[重要物料] {} 命中 {} 项，数量 {}",
                keyword,
                matched_detail.len(),
                format_quantity(total_qty)
            ));
            hits.push(ImportantMaterialHit {
                keyword: keyword.to_string(),
                converted_keyword: normalized_keyword,
                total_quantity: total_qty,
                matched_parts: matched_detail,
            });
        } else {
            debug_logs.push(format!("[重要物料] {} 未命中", keyword));
        }
    }

    Ok((hits, matched_parts, debug_logs))
}

fn collect_part_variants(display_no: &str, part_key: &str, description: &str) -> BTreeSet<String> {
    let mut variants = normalized_variants(display_no);
    variants.extend(normalized_variants(part_key));
    if !description.is_empty() {
        variants.extend(normalized_variants(description));
    }
    variants
}

/// Substring match in either direction across all variant spellings.
fn variants_match(keyword_variants: &BTreeSet<String>, value_variants: &BTreeSet<String>) -> bool {
    if keyword_variants.is_empty() || value_variants.is_empty() {
        return false;
    }
    for keyword in keyword_variants {
        if keyword.is_empty() {
            continue;
        }
        for value in value_variants {
            if value.is_empty() {
                continue;
            }
            if value.contains(keyword.as_str()) || keyword.contains(value.as_str()) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    fn test_config(dir: &Path) -> AppConfig {
        AppConfig {
            invalid_part_db: dir.join("失效料号.csv"),
            binding_library: dir.join("绑定料号.js"),
            important_materials: dir.join("重要物料.txt"),
            blocked_requesters: dir.join("屏蔽申请人.txt"),
        }
    }

    fn seed_data(dir: &Path) {
        write_file(
            &dir.join("失效料号.csv"),
            "失效料号,失效描述,替换料号,替换描述\n\
             UC1000-001,旧连接器,UC1000-002,新连接器\n\
             UC1000-009,停产电阻,,\n",
        );
        write_file(
            &dir.join("绑定料号.js"),
            r#"[{
                "projectDesc": "主板",
                "indexPartNo": "UC3000-001",
                "indexPartDesc": "主板",
                "requiredGroups": [{
                    "groupName": "螺丝",
                    "number": 2,
                    "choices": [
                        {"partNo": "UC3100-001", "desc": "十字螺丝"},
                        {"partNo": "UC3100-002", "desc": "替代螺丝"}
                    ]
                }]
            }]"#,
        );
        write_file(&dir.join("重要物料.txt"), "保险丝\n");
    }

    fn seed_bom(dir: &Path) -> PathBuf {
        let bom = dir.join("bom.csv");
        write_file(
            &bom,
            "序号,料号,描述,数量\n\
             1,UC3000-001,主板,2\n\
             2,UC3100-001,十字螺丝,3\n\
             3,UC3100-002,替代螺丝,5\n\
             4,UC1000-001,旧连接器,1\n\
             5,UC1000-009,停产电阻,4\n\
             6,UC8000-001,保险丝 5A,6\n",
        );
        bom
    }

    #[test]
    fn full_check_marks_replaces_and_binds() {
        let tmp = tempfile::tempdir().unwrap();
        seed_data(tmp.path());
        let bom = seed_bom(tmp.path());
        let config = test_config(tmp.path());

        let outcome = run_check(&config, &bom, &CheckOptions::default()).unwrap();
        let report = &outcome.report;

        assert_eq!(report.replacement_summary.total_invalid_found, 2);
        assert_eq!(report.replacement_summary.total_replaced, 1);
        assert_eq!(report.replacement_summary.total_invalid_previously_marked, 0);

        // 2 boards need 4 screws; 5 + 3 on hand, biggest stock first.
        assert_eq!(report.binding_results.len(), 1);
        let group = &report.binding_results[0].requirement_results[0];
        assert_eq!(group.required_qty, 4.0);
        assert_eq!(group.missing_qty, 0.0);
        assert_eq!(group.matched_details[0].part_no, "UC3100-002");
        assert_eq!(group.matched_details[0].quantity, 4.0);

        // The fuse keyword matches through the description.
        assert_eq!(report.important_hits.len(), 1);
        assert_eq!(report.important_hits[0].total_quantity, 6.0);

        // The replaced connector flows into its replacement.
        let remainder_parts: Vec<&str> = report
            .remainder
            .iter()
            .map(|item| item.part_no.as_str())
            .collect();
        assert!(remainder_parts.contains(&"UC1000-002"));
        assert!(!remainder_parts.iter().any(|p| *p == "UC1000-001"));

        let checked = std::fs::read_to_string(&outcome.checked_path).unwrap();
        assert!(checked.contains(INVALID_MARK));
        assert!(checked.contains("UC1000-002"));
    }

    #[test]
    fn rechecking_the_output_marks_nothing_twice() {
        let tmp = tempfile::tempdir().unwrap();
        seed_data(tmp.path());
        let bom = seed_bom(tmp.path());
        let config = test_config(tmp.path());

        let first = run_check(&config, &bom, &CheckOptions::default()).unwrap();
        let second = run_check(&config, &first.checked_path, &CheckOptions::default()).unwrap();

        assert_eq!(second.report.replacement_summary.total_invalid_found, 2);
        assert_eq!(
            second.report.replacement_summary.total_invalid_previously_marked,
            2
        );
        assert_eq!(second.report.replacement_summary.total_replaced, 0);

        // Aggregates stay identical across the re-run.
        assert_eq!(second.report.remainder.len(), first.report.remainder.len());
        assert_eq!(second.checked_path, first.checked_path);
    }

    #[test]
    fn condition_gated_choices_only_apply_when_met() {
        let choice_always = BindingChoice {
            part_no: "UC1-1".into(),
            ..BindingChoice::default()
        };
        let choice_notany = BindingChoice {
            part_no: "UC1-2".into(),
            condition_mode: Some("NOTANY".into()),
            condition_part_nos: vec!["UC1-1".into()],
            ..BindingChoice::default()
        };
        let mut quantities = BTreeMap::new();
        quantities.insert("UC1-1".to_string(), 3.0);

        assert!(choice_condition_met(&choice_always, &quantities));
        assert!(!choice_condition_met(&choice_notany, &quantities));

        quantities.insert("UC1-1".to_string(), 0.0);
        assert!(choice_condition_met(&choice_notany, &quantities));

        // A mode without condition parts can never pass.
        let broken = BindingChoice {
            part_no: "UC1-3".into(),
            condition_mode: Some("ALL".into()),
            ..BindingChoice::default()
        };
        assert!(!choice_condition_met(&broken, &quantities));
    }

    #[test]
    fn missing_bom_quantity_column_defaults_each_row_to_one() {
        let table = Table::from_rows(
            "bom",
            vec![
                vec!["料号".to_string(), "备注".to_string()],
                vec!["U100-A".to_string(), "x".to_string()],
                vec!["U100-A".to_string(), "y".to_string()],
            ],
        );
        let markers = MarkerColumns::default();
        let (quantities, _, _, _) = extract_part_quantities(&table, &markers);
        assert_eq!(quantities.get("U100-A"), Some(&2.0));
    }

    #[test]
    fn shortages_name_the_first_applicable_choice() {
        let group = BindingGroup {
            group_name: "螺丝".into(),
            number: 3.0,
            choices: vec![
                BindingChoice {
                    part_no: "UC1-1".into(),
                    desc: "首选".into(),
                    ..BindingChoice::default()
                },
                BindingChoice {
                    part_no: "UC1-2".into(),
                    ..BindingChoice::default()
                },
            ],
        };
        let mut reference = BTreeMap::new();
        reference.insert("UC1-1".to_string(), 1.0);
        let mut available = reference.clone();
        let display = BTreeMap::new();

        let result = evaluate_group(&group, 2.0, &mut available, &reference, &display);
        assert_eq!(result.required_qty, 6.0);
        assert_eq!(result.missing_qty, 5.0);
        assert_eq!(result.missing_choices, vec!["UC1-1".to_string()]);
        assert_eq!(result.matched_details.len(), 1);
        assert_eq!(result.matched_details[0].quantity, 1.0);
    }
}
