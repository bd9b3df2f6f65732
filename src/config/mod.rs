//! Site configuration management for `sitewerk.toml`.
//!
//! Loaded once at startup and passed by reference into every pipeline
//! stage; no stage reads configuration from anywhere else.
//!
//! # Sections
//!
//! | Section       | Purpose                                         |
//! |---------------|-------------------------------------------------|
//! | `[site]`      | Site metadata (title, base url, language)       |
//! | `[build]`     | Source/output/fragment directories              |
//! | `[inject]`    | Fragment/placeholder pairs                      |
//! | `[articles]`  | Articles-database builder settings              |
//! | `[related]`   | Related-articles scoring settings               |
//! | `[knowledge]` | Knowledge-base extraction limits                |
//! | `[sitemap]`   | Sitemap paths, exclusions, priorities           |
//! | `[lazy]`      | Lazy-loading skip rules                         |

mod section;

pub use section::{
    ArticlesSection, BuildSection, InjectSection, KnowledgeSection, LazySection, Partial,
    RelatedSection, SiteSection, SitemapSection,
};

use crate::{cli::Cli, log};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config file '{0}' not found (searched upward from the current directory)")]
    NotFound(PathBuf),
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sitewerk.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Site metadata
    pub site: SiteSection,

    /// Build tree locations
    pub build: BuildSection,

    /// Partial injection
    pub inject: InjectSection,

    /// Articles database builder
    pub articles: ArticlesSection,

    /// Related-articles injector
    pub related: RelatedSection,

    /// Knowledge-base generator
    pub knowledge: KnowledgeSection,

    /// Sitemap generator
    pub sitemap: SitemapSection,

    /// Lazy-loading injector
    pub lazy: LazySection,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            cli: None,
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            site: SiteSection::default(),
            build: BuildSection::default(),
            inject: InjectSection::default(),
            articles: ArticlesSection::default(),
            related: RelatedSection::default(),
            knowledge: KnowledgeSection::default(),
            sitemap: SitemapSection::default(),
            lazy: LazySection::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root
    /// is the config file's parent directory.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let config_path = match find_config_file(&cli.config) {
            Some(path) => path,
            None => return Err(ConfigError::NotFound(cli.config.clone()).into()),
        };

        let mut config = Self::from_path(&config_path)?;
        config.config_path = config_path;
        config.cli = Some(cli);
        config.finalize(cli);
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            log!("warning"; "unknown fields in {}, ignoring:", display_path);
            for field in &ignored {
                log!("warning"; "- {}", field);
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Parse)?;
        Ok((config, ignored))
    }

    /// Finalize configuration after loading: resolve the root directory,
    /// normalize paths and apply CLI overrides.
    fn finalize(&mut self, cli: &Cli) {
        self.root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        if let Some(ref source) = cli.source {
            self.build.source = source.clone();
        }
        if let Some(ref output) = cli.output {
            self.build.output = output.clone();
        }
        if let Some(ref url) = cli.base_url {
            self.site.url = url.clone();
        }

        self.build.source = self.root_join(&self.build.source);
        self.build.output = self.root_join(&self.build.output);
        self.build.fragments = self.root_join(&self.build.fragments);
    }

    /// Join a path with the root directory. Absolute paths pass through.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Source tree directory (pristine pages).
    pub fn source_dir(&self) -> &Path {
        &self.build.source
    }

    /// Output tree directory (the one the passes mutate).
    pub fn output_dir(&self) -> &Path {
        &self.build.output
    }

    /// Fragments directory.
    pub fn fragments_dir(&self) -> &Path {
        &self.build.fragments
    }

    /// Directory for generated JSON artifacts.
    pub fn data_dir(&self) -> PathBuf {
        self.build.output.join(&self.build.data_dir)
    }

    /// Full path of the articles database artifact.
    pub fn articles_db_path(&self) -> PathBuf {
        self.data_dir().join(&self.articles.db_file)
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        self.site.url.trim_end_matches('/')
    }
}

/// Search for the config file upward from the current directory.
fn find_config_file(name: &Path) -> Option<PathBuf> {
    if name.is_absolute() {
        return name.exists().then(|| name.to_path_buf());
    }

    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Parse a config snippet for tests, asserting no unknown fields.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SiteConfig {
    let config = format!("[site]\ntitle = \"Test\"\nurl = \"https://example.de\"\n{extra}");
    let (parsed, ignored) = SiteConfig::parse_with_ignored(&config).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
