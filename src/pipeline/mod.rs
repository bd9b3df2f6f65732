//! The build pipeline: an explicit, ordered list of named stages.
//!
//! Each stage is a file-rewriting or artifact-generating pass over the
//! output tree. Stages declare their dependencies; the runner executes
//! them in list order and checks that every dependency already ran.
//!
//! ```text
//! inject ─┐
//! lazy   ─┤ (independent)
//! articles ──> related      (articles-db.json hand-off)
//! knowledge ─┤ (independent)
//! sitemap  ──┘ (independent, fatal-on-error)
//! ```
//!
//! Two error policies coexist (see `StageReport`): scanning passes
//! isolate per-file failures and keep going; the sitemap pass and all
//! artifact writes treat any error as fatal.

pub mod inject;
pub mod lazy;
pub mod related;

use crate::{config::SiteConfig, debug, log};
use anyhow::{Result, bail};
use rustc_hash::FxHashSet;
use serde::Serialize;

// =============================================================================
// Stage Reports
// =============================================================================

/// A per-file failure or skip, with the reason.
///
/// Serializable so the knowledge-base stats can embed the skip list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    pub file: String,
    pub reason: String,
}

impl Skipped {
    pub fn new(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Aggregate result of one stage run.
///
/// A non-empty `skipped` list does not fail the build: the stage completed
/// and wrote whatever it successfully collected.
#[derive(Debug, Default)]
pub struct StageReport {
    /// Files examined.
    pub scanned: usize,
    /// Files rewritten or records produced.
    pub modified: usize,
    /// Per-file failures and skips.
    pub skipped: Vec<Skipped>,
}

impl StageReport {
    /// Fold another report into this one (multi-partial inject).
    pub fn merge(&mut self, other: StageReport) {
        self.scanned += other.scanned;
        self.modified += other.modified;
        self.skipped.extend(other.skipped);
    }

    /// Log the aggregate summary plus the embedded failure list.
    pub fn log_summary(&self, stage: &str) {
        log!(stage; "{} scanned, {} modified, {} skipped",
            self.scanned, self.modified, self.skipped.len());
        for skip in &self.skipped {
            log!(stage; "skipped {}: {}", skip.file, skip.reason);
        }
    }
}

// =============================================================================
// Stage List
// =============================================================================

/// A named pipeline stage with declared dependencies.
pub struct StageDef {
    pub name: &'static str,
    pub needs: &'static [&'static str],
    pub run: fn(&SiteConfig) -> Result<StageReport>,
}

/// All stages in execution order. `related` consumes the articles
/// database, so it must come after `articles`; everything else is
/// independent.
pub const STAGES: &[StageDef] = &[
    StageDef {
        name: "inject",
        needs: &[],
        run: inject::run_all,
    },
    StageDef {
        name: "lazy",
        needs: &[],
        run: lazy::run,
    },
    StageDef {
        name: "articles",
        needs: &[],
        run: crate::articles::run,
    },
    StageDef {
        name: "related",
        needs: &["articles"],
        run: related::run,
    },
    StageDef {
        name: "knowledge",
        needs: &[],
        run: crate::knowledge::run,
    },
    StageDef {
        name: "sitemap",
        needs: &[],
        run: crate::generator::sitemap::run,
    },
];

/// Run every stage in order, enforcing declared dependencies.
pub fn run_all(config: &SiteConfig) -> Result<()> {
    let mut done: FxHashSet<&str> = FxHashSet::default();

    for stage in STAGES {
        for dep in stage.needs {
            if !done.contains(dep) {
                bail!("stage '{}' requires '{}' to run first", stage.name, dep);
            }
        }
        debug!("build"; "running stage '{}'", stage.name);
        let report = (stage.run)(config)?;
        report.log_summary(stage.name);
        done.insert(stage.name);
    }

    Ok(())
}
