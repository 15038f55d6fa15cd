//! The `binding` subcommand.

use crate::binding::{BindingLibrary, BindingProject, template_project};
use crate::cli::args::BindingCommand;
use crate::config::AppConfig;
use crate::error::Result;
use crate::text::part::format_quantity;
use std::path::Path;

pub fn run(config_path: &Path, cmd: BindingCommand) -> Result<i32> {
    let config = AppConfig::load(config_path)?;
    let mut library = BindingLibrary::load(&config.binding_library)?;

    match cmd {
        BindingCommand::Show { index_part } => match index_part {
            Some(index) => match library.find_project(&index) {
                Some(project) => print_project(project),
                None => {
                    println!("No project bound to {}", index);
                    return Ok(1);
                }
            },
            None => {
                if library.is_empty() {
                    println!("Binding library is empty: {}", library.path().display());
                }
                for project in library.projects() {
                    print_project(project);
                }
            }
        },
        BindingCommand::Template => {
            library.add_project(template_project())?;
            println!("✓ Appended template project to {}", library.path().display());
        }
        BindingCommand::Export { target } => {
            library.export_csv(&target)?;
            println!(
                "✓ Exported {} projects to {}",
                library.projects().len(),
                target.display()
            );
        }
        BindingCommand::Import { source } => {
            library.import_csv(&source)?;
            println!(
                "✓ Imported {} projects from {}",
                library.projects().len(),
                source.display()
            );
        }
        BindingCommand::Remove { index_part } => {
            if library.remove_project(&index_part)? {
                println!("✓ Removed project bound to {}", index_part);
            } else {
                println!("No project bound to {}", index_part);
                return Ok(1);
            }
        }
    }

    Ok(0)
}

fn print_project(project: &BindingProject) {
    println!("{} ({})", project.project_desc, project.index_part_no);
    for group in &project.required_groups {
        println!("  [{}] x{}", group.group_name, format_quantity(group.number));
        for choice in &group.choices {
            let mut line = format!("    {}", choice.part_no);
            if !choice.desc.is_empty() {
                line.push_str("  ");
                line.push_str(&choice.desc);
            }
            if let Some(mode) = &choice.condition_mode {
                line.push_str(&format!(
                    "  [{} {}]",
                    mode,
                    choice.condition_part_nos.join("/")
                ));
            }
            println!("{}", line);
        }
    }
}
