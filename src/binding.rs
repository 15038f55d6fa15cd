//! Binding part number library.
//!
//! A binding project declares that whenever its index part appears in a BOM,
//! certain companion parts must appear with it, organized into requirement
//! groups of interchangeable choices. The library lives as a JSON array on
//! disk; older files that contain a bare object instead of an array are
//! still accepted.

use crate::error::{DataError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// One interchangeable part inside a requirement group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingChoice {
    #[serde(default)]
    pub part_no: String,
    #[serde(default)]
    pub desc: String,
    /// How `condition_part_nos` gates this choice: `ALL`, `ANY` or `NOTANY`.
    /// Absent means the choice always applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub condition_part_nos: Vec<String>,
    /// Per-choice quantity override, unused by matching but kept for export.
    #[serde(
        default,
        deserialize_with = "flexible_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub number: Option<f64>,
}

/// A requirement group: the index part needs `number` units satisfied from
/// any mix of the listed choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingGroup {
    #[serde(default)]
    pub group_name: String,
    #[serde(default = "default_group_number", deserialize_with = "group_number")]
    pub number: f64,
    #[serde(default)]
    pub choices: Vec<BindingChoice>,
}

impl Default for BindingGroup {
    fn default() -> Self {
        Self {
            group_name: String::new(),
            number: default_group_number(),
            choices: Vec::new(),
        }
    }
}

/// One binding project keyed by its index part number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingProject {
    #[serde(default)]
    pub project_desc: String,
    #[serde(default)]
    pub index_part_no: String,
    #[serde(default)]
    pub index_part_desc: String,
    #[serde(default)]
    pub required_groups: Vec<BindingGroup>,
}

fn default_group_number() -> f64 {
    1.0
}

/// Accepts numbers written as JSON numbers or as strings, treating blanks
/// and unparsable text as absent.
fn flexible_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(text)) => text.trim().parse().ok(),
    })
}

/// Group quantities fall back to 1; zero and unparsable values count as
/// unset so a group never multiplies requirements away.
fn group_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = flexible_number(deserializer)?;
    Ok(parsed.filter(|n| *n != 0.0).unwrap_or_else(default_group_number))
}

const EXPORT_HEADER: [&str; 10] = [
    "项目描述",
    "索引料号",
    "索引描述",
    "分组名称",
    "分组数量",
    "料号",
    "描述",
    "条件模式",
    "条件料号",
    "数量",
];

/// The binding library file plus its in-memory projects.
#[derive(Debug, Clone)]
pub struct BindingLibrary {
    path: PathBuf,
    projects: Vec<BindingProject>,
}

impl BindingLibrary {
    /// Loads the library; a missing file yields an empty library.
    ///
    /// Legacy files hold a bare project object (or several, comma-separated)
    /// without the surrounding array brackets; those are wrapped before
    /// parsing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                projects: Vec::new(),
            });
        }

        let raw_text = std::fs::read_to_string(path)?;
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return Ok(Self {
                path: path.to_path_buf(),
                projects: Vec::new(),
            });
        }

        let wrapped;
        let body = if trimmed.starts_with('[') {
            trimmed
        } else {
            wrapped = format!("[{}]", trimmed);
            &wrapped
        };

        let projects: Vec<BindingProject> =
            serde_json::from_str(body).map_err(|e| DataError::BadLibrary {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            projects,
        })
    }

    /// Writes the library back as a pretty-printed JSON array.
    pub fn save(&self) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self.projects)?;
        std::fs::write(&self.path, serialized + "\n")?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn projects(&self) -> &[BindingProject] {
        &self.projects
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn find_project(&self, index_part_no: &str) -> Option<&BindingProject> {
        self.projects
            .iter()
            .find(|project| project.index_part_no == index_part_no)
    }

    /// Adds a project and persists the library.
    pub fn add_project(&mut self, project: BindingProject) -> Result<()> {
        self.projects.push(project);
        self.save()
    }

    /// Removes the project with the given index part number, returning
    /// whether anything was removed. Persists on change.
    pub fn remove_project(&mut self, index_part_no: &str) -> Result<bool> {
        let before = self.projects.len();
        self.projects
            .retain(|project| project.index_part_no != index_part_no);
        if self.projects.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Exports the library as a flat review table, one row per choice.
    /// Groups without choices still produce a row so they survive a
    /// round trip.
    pub fn export_csv(&self, target: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(target)?;
        writer.write_record(EXPORT_HEADER)?;

        let placeholder = [BindingChoice::default()];
        for project in &self.projects {
            for group in &project.required_groups {
                let choices: &[BindingChoice] = if group.choices.is_empty() {
                    &placeholder
                } else {
                    &group.choices
                };
                let group_number = format_number(Some(group.number));
                for choice in choices {
                    let choice_number = format_number(choice.number);
                    let conditions = choice.condition_part_nos.join(",");
                    writer.write_record([
                        project.project_desc.as_str(),
                        project.index_part_no.as_str(),
                        project.index_part_desc.as_str(),
                        group.group_name.as_str(),
                        group_number.as_str(),
                        choice.part_no.as_str(),
                        choice.desc.as_str(),
                        choice.condition_mode.as_deref().unwrap_or(""),
                        conditions.as_str(),
                        choice_number.as_str(),
                    ])?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Replaces the library content with the rows of a review table and
    /// persists the result. Rows group by project description plus index
    /// part number; rows without a group name only establish the project.
    pub fn import_csv(&mut self, source: &Path) -> Result<()> {
        if !source.exists() {
            return Err(DataError::MissingInput {
                path: source.to_path_buf(),
            }
            .into());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(source)?;

        let mut rows = reader.records();
        let header: Vec<String> = match rows.next() {
            Some(record) => record?.iter().map(|cell| cell.to_string()).collect(),
            None => Vec::new(),
        };
        let column = |name: &str, fallback: usize| -> usize {
            header
                .iter()
                .position(|cell| cell.trim() == name)
                .unwrap_or(fallback)
        };

        let col_project = column("项目描述", 0);
        let col_index = column("索引料号", 1);
        let col_index_desc = column("索引描述", 2);
        let col_group = column("分组名称", 3);
        let col_group_number = column("分组数量", 4);
        let col_part = column("料号", 5);
        let col_desc = column("描述", 6);
        let col_mode = column("条件模式", 7);
        let col_conditions = column("条件料号", 8);
        let col_number = column("数量", 9);

        let mut keys: Vec<String> = Vec::new();
        let mut projects: Vec<BindingProject> = Vec::new();

        for record in rows {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

            let project_desc = field(col_project);
            let index_part_no = field(col_index);
            let key = format!("{}::{}", project_desc, index_part_no);
            let position = match keys.iter().position(|existing| *existing == key) {
                Some(position) => position,
                None => {
                    keys.push(key);
                    projects.push(BindingProject {
                        project_desc,
                        index_part_no,
                        index_part_desc: field(col_index_desc),
                        required_groups: Vec::new(),
                    });
                    projects.len() - 1
                }
            };
            let project = &mut projects[position];

            let group_name = field(col_group);
            if group_name.is_empty() {
                continue;
            }
            let group_number: f64 = field(col_group_number).parse().unwrap_or(1.0);
            let group_position = match project
                .required_groups
                .iter()
                .position(|group| group.group_name == group_name)
            {
                Some(position) => position,
                None => {
                    project.required_groups.push(BindingGroup {
                        group_name,
                        number: group_number,
                        choices: Vec::new(),
                    });
                    project.required_groups.len() - 1
                }
            };

            let part_no = field(col_part);
            if part_no.is_empty() {
                continue;
            }
            let condition_part_nos: Vec<String> = field(col_conditions)
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
            let condition_mode = {
                let mode = field(col_mode);
                if mode.is_empty() { None } else { Some(mode) }
            };
            project.required_groups[group_position]
                .choices
                .push(BindingChoice {
                    part_no,
                    desc: field(col_desc),
                    condition_mode,
                    condition_part_nos,
                    number: field(col_number).parse().ok(),
                });
        }

        self.projects = projects;
        self.save()
    }
}

fn format_number(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(n) => crate::text::part::format_quantity(n),
    }
}

/// A minimal one-project skeleton for authoring new library files.
pub fn template_project() -> BindingProject {
    BindingProject {
        project_desc: "示例项目".to_string(),
        index_part_no: "UC3000-000".to_string(),
        index_part_desc: "索引料号描述".to_string(),
        required_groups: vec![BindingGroup {
            group_name: "配套螺丝".to_string(),
            number: 2.0,
            choices: vec![
                BindingChoice {
                    part_no: "UC3100-001".to_string(),
                    desc: "首选料".to_string(),
                    ..BindingChoice::default()
                },
                BindingChoice {
                    part_no: "UC3100-002".to_string(),
                    desc: "替代料".to_string(),
                    condition_mode: Some("NOTANY".to_string()),
                    condition_part_nos: vec!["UC3100-001".to_string()],
                    ..BindingChoice::default()
                },
            ],
        }],
    }
}
