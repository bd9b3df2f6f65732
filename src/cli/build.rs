//! Full-build orchestration.
//!
//! `build` first mirrors the pristine source tree into the output
//! directory, then runs every pipeline stage over the copy. Because the
//! copy happens on every build, repeated builds never stack injected
//! markup: the passes always start from pristine pages.

use crate::{config::SiteConfig, log, pipeline};
use anyhow::{Context, Result};
use std::fs;

/// Run a full build: sync the output tree, then all stages.
pub fn run_build(config: &SiteConfig) -> Result<()> {
    let copied = sync_output(config)?;
    log!("build"; "{} files copied to {}", copied, config.output_dir().display());

    pipeline::run_all(config)?;
    log!("build"; "done");
    Ok(())
}

/// Mirror the source tree into the output directory. Returns the number
/// of files copied.
pub fn sync_output(config: &SiteConfig) -> Result<usize> {
    let source = config.source_dir();
    let output = config.output_dir();

    fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut copied = 0;
    for entry in jwalk::WalkDir::new(source).sort(true) {
        let entry = entry.with_context(|| format!("failed to read {}", source.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let relative = path
            .strip_prefix(source)
            .with_context(|| format!("{} escapes the source tree", path.display()))?;
        let target = output.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(&path, &target)
            .with_context(|| format!("failed to copy {}", path.display()))?;
        copied += 1;
    }

    Ok(copied)
}
