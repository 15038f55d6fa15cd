//! The `dist` subcommand.

use crate::cli::args::DistCommand;
use crate::dist::{self, Pipeline, PipelineOptions};
use crate::error::Result;

pub async fn run(cmd: DistCommand) -> Result<i32> {
    let settings = dist::load_settings(&cmd.manifest)?;
    let options = PipelineOptions {
        skip_bootstrap: cmd.no_bootstrap,
        skip_build: cmd.skip_build,
    };

    let artifact = Pipeline::new(settings, options).run().await?;
    println!("{} ({} bytes)", artifact.path.display(), artifact.size);
    Ok(0)
}
