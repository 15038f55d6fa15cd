//! Check result models and the writers that persist them.
//!
//! The summary table mirrors the sections a reviewer expects: headline
//! counters first, then the replacement details, binding statistics, missing
//! parts, important-material hits and finally the debug trail.

use crate::error::Result;
use crate::text::part::format_quantity;
use serde::Serialize;
use std::path::Path;

/// One invalid part found in the BOM, with its replacement when the
/// database names one.
#[derive(Debug, Clone, Serialize)]
pub struct ReplacementRecord {
    pub invalid_part_no: String,
    pub invalid_desc: String,
    pub replacement_part_no: Option<String>,
    pub replacement_desc: Option<String>,
    pub table_name: String,
    /// 1-based line number in the source table, header included.
    pub row_index: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplacementSummary {
    pub total_invalid_found: u32,
    pub total_invalid_previously_marked: u32,
    pub total_replaced: u32,
    pub records: Vec<ReplacementRecord>,
}

/// Part and quantity pair in allocation order.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedPart {
    pub part_no: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequirementGroupResult {
    pub group_name: String,
    pub required_qty: f64,
    pub available_qty: f64,
    pub missing_qty: f64,
    /// Parts to order when the group is short, preferring the first
    /// applicable choice.
    pub missing_choices: Vec<String>,
    pub matched_details: Vec<MatchedPart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BindingProjectResult {
    pub project_desc: String,
    pub index_part_no: String,
    pub matched_quantity: f64,
    pub requirement_results: Vec<RequirementGroupResult>,
}

impl BindingProjectResult {
    pub fn has_missing(&self) -> bool {
        self.requirement_results
            .iter()
            .any(|group| group.missing_qty > 0.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportantMaterialHit {
    pub keyword: String,
    pub converted_keyword: String,
    pub total_quantity: f64,
    pub matched_parts: Vec<MatchedPart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingItem {
    pub part_no: String,
    pub desc: String,
    pub missing_qty: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemainderItem {
    pub part_no: String,
    pub desc: String,
    pub quantity: f64,
}

/// Everything one check run produced.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub replacement_summary: ReplacementSummary,
    pub binding_results: Vec<BindingProjectResult>,
    pub important_hits: Vec<ImportantMaterialHit>,
    pub missing_items: Vec<MissingItem>,
    pub remainder: Vec<RemainderItem>,
    pub debug_logs: Vec<String>,
}

impl CheckReport {
    /// Whether anything at all is short.
    pub fn has_missing(&self) -> bool {
        !self.missing_items.is_empty()
            || self.binding_results.iter().any(|result| result.has_missing())
    }
}

/// Renders matched parts as `part:qty` pairs joined by commas.
fn matched_parts_text(parts: &[MatchedPart]) -> String {
    parts
        .iter()
        .map(|item| format!("{}:{}", item.part_no, format_quantity(item.quantity)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Writes the execution summary table.
pub fn write_summary_csv(report: &CheckReport, target: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(target)?;

    let summary = &report.replacement_summary;
    writer.write_record(["失效料号数量", &summary.total_invalid_found.to_string()])?;
    writer.write_record([
        "已标记失效料号数量",
        &summary.total_invalid_previously_marked.to_string(),
    ])?;
    writer.write_record(["已替换数量", &summary.total_replaced.to_string()])?;
    writer.write_record(["绑定项目数量", &report.binding_results.len().to_string()])?;
    let group_count: usize = report
        .binding_results
        .iter()
        .map(|result| result.requirement_results.len())
        .sum();
    writer.write_record(["绑定分组数量", &group_count.to_string()])?;
    writer.write_record(["重要物料数量", &report.important_hits.len().to_string()])?;

    writer.write_record([""])?;
    writer.write_record(["失效料号明细"])?;
    writer.write_record(["工作表", "行号", "失效料号", "失效描述", "替换料号", "替换描述"])?;
    for record in &summary.records {
        writer.write_record([
            record.table_name.as_str(),
            &record.row_index.to_string(),
            record.invalid_part_no.as_str(),
            record.invalid_desc.as_str(),
            record.replacement_part_no.as_deref().unwrap_or(""),
            record.replacement_desc.as_deref().unwrap_or(""),
        ])?;
    }

    writer.write_record([""])?;
    writer.write_record(["绑定料号统计"])?;
    writer.write_record([
        "项目描述",
        "索引料号",
        "主料数量",
        "需求分组",
        "需求数量",
        "可用数量",
        "缺少数量",
        "缺少料号",
        "满足料号",
    ])?;
    for result in &report.binding_results {
        for group in &result.requirement_results {
            writer.write_record([
                result.project_desc.as_str(),
                result.index_part_no.as_str(),
                &format_quantity(result.matched_quantity),
                group.group_name.as_str(),
                &format_quantity(group.required_qty),
                &format_quantity(group.available_qty),
                &format_quantity(group.missing_qty),
                &group.missing_choices.join(","),
                &matched_parts_text(&group.matched_details),
            ])?;
        }
    }

    writer.write_record([""])?;
    writer.write_record(["缺失物料"])?;
    writer.write_record(["料号", "描述", "缺少数量"])?;
    for item in &report.missing_items {
        writer.write_record([
            item.part_no.as_str(),
            item.desc.as_str(),
            &format_quantity(item.missing_qty),
        ])?;
    }

    writer.write_record([""])?;
    writer.write_record(["重要物料统计"])?;
    writer.write_record(["关键字", "标准关键字", "数量", "命中料号"])?;
    for hit in &report.important_hits {
        writer.write_record([
            hit.keyword.as_str(),
            hit.converted_keyword.as_str(),
            &format_quantity(hit.total_quantity),
            &matched_parts_text(&hit.matched_parts),
        ])?;
    }

    writer.write_record([""])?;
    writer.write_record(["调试信息"])?;
    for line in &report.debug_logs {
        writer.write_record([line.as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the leftover-material table, one row per unconsumed part.
pub fn write_remainder_csv(report: &CheckReport, target: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(target)?;
    writer.write_record(["料号", "描述", "数量"])?;
    for item in &report.remainder {
        writer.write_record([
            item.part_no.as_str(),
            item.desc.as_str(),
            &format_quantity(item.quantity),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the full report as pretty JSON for downstream tooling.
pub fn write_json(report: &CheckReport, target: &Path) -> Result<()> {
    let body = serde_json::to_string_pretty(report)?;
    std::fs::write(target, body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> CheckReport {
        CheckReport {
            replacement_summary: ReplacementSummary {
                total_invalid_found: 2,
                total_invalid_previously_marked: 1,
                total_replaced: 1,
                records: vec![ReplacementRecord {
                    invalid_part_no: "UC1000-001".into(),
                    invalid_desc: "旧款连接器".into(),
                    replacement_part_no: Some("UC1000-002".into()),
                    replacement_desc: Some("新款连接器".into()),
                    table_name: "bom".into(),
                    row_index: 3,
                }],
            },
            binding_results: vec![BindingProjectResult {
                project_desc: "主板组件".into(),
                index_part_no: "UC3000-001".into(),
                matched_quantity: 2.0,
                requirement_results: vec![RequirementGroupResult {
                    group_name: "螺丝".into(),
                    required_qty: 4.0,
                    available_qty: 3.0,
                    missing_qty: 1.0,
                    missing_choices: vec!["UC3100-001".into()],
                    matched_details: vec![MatchedPart {
                        part_no: "UC3100-001".into(),
                        quantity: 3.0,
                    }],
                }],
            }],
            important_hits: vec![],
            missing_items: vec![MissingItem {
                part_no: "UC3100-001".into(),
                desc: "十字螺丝".into(),
                missing_qty: 1.0,
            }],
            remainder: vec![RemainderItem {
                part_no: "UC9000-001".into(),
                desc: "备用电缆".into(),
                quantity: 5.0,
            }],
            debug_logs: vec!["[bom] 识别料号列: 第2列".into()],
        }
    }

    #[test]
    fn summary_csv_contains_every_section() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bom.summary.csv");
        write_summary_csv(&sample_report(), &path).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        for label in [
            "失效料号数量",
            "已标记失效料号数量",
            "失效料号明细",
            "绑定料号统计",
            "缺失物料",
            "重要物料统计",
            "调试信息",
        ] {
            assert!(body.contains(label), "missing section {}", label);
        }
        assert!(body.contains("UC3100-001:3"));
    }

    #[test]
    fn remainder_csv_lists_parts_with_quantities() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bom.remainder.csv");
        write_remainder_csv(&sample_report(), &path).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("料号,描述,数量"));
        assert!(body.contains("UC9000-001,备用电缆,5"));
    }

    #[test]
    fn report_flags_missing_parts() {
        let report = sample_report();
        assert!(report.has_missing());
    }
}
