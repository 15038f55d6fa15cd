//! Archive step: pack the stage directory into a single zip artifact.

use super::error::{Error, ErrorExt, Result};
use super::settings::Settings;
use std::io;
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

pub async fn run(settings: &Settings, stage_dir: &Path) -> Result<PathBuf> {
    let archive_path = settings.out_dir().join(settings.archive_name());
    let compress = settings.compress();

    let stage = stage_dir.to_path_buf();
    let target = archive_path.clone();
    tokio::task::spawn_blocking(move || write_archive(&stage, &target, compress))
        .await
        .map_err(|e| Error::GenericError(format!("archive task panicked: {}", e)))??;

    log::info!("✓ Created archive: {}", archive_path.display());
    Ok(archive_path)
}

/// Writes the stage tree into a zip file.
///
/// Entries are added in lexicographic path order so identical stage trees
/// produce identical archives. The compress flag switches between Deflate
/// and plain store.
fn write_archive(stage_dir: &Path, archive_path: &Path, compress: bool) -> Result<()> {
    let method = if compress {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };

    let file =
        std::fs::File::create(archive_path).fs_context("creating archive file", archive_path)?;
    let mut writer = zip::ZipWriter::new(file);

    let mut entries: Vec<_> = walkdir::WalkDir::new(stage_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    for entry in entries {
        let relative = match entry.path().strip_prefix(stage_dir) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel,
            _ => continue,
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let mut options = SimpleFileOptions::default().compression_method(method);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = entry.metadata() {
                options = options.unix_permissions(metadata.permissions().mode());
            }
        }

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            let mut source = std::fs::File::open(entry.path())
                .fs_context("opening staged file", entry.path())?;
            io::copy(&mut source, &mut writer).fs_context("archiving staged file", entry.path())?;
        }
    }

    writer.finish()?;
    Ok(())
}
