//! Contest catalog
//!
//! Read-only store of contest definitions, built once at startup from a
//! directory of JSON documents and shared through the application state.
//! The slug of each contest is the file stem of its document.

pub mod definition;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{TimeDelta, Utc};

pub use definition::*;

/// Errors raised while loading the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid contest '{slug}': {reason}")]
    Invalid { slug: String, reason: String },
}

/// All known contests, keyed by slug
#[derive(Debug, Clone, Default)]
pub struct ContestCatalog {
    contests: BTreeMap<String, ContestDefinition>,
}

impl ContestCatalog {
    /// Build a catalog from already parsed definitions
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = (String, ContestDefinition)>,
    ) -> Result<Self, CatalogError> {
        let mut contests = BTreeMap::new();
        for (slug, definition) in definitions {
            validate(&slug, &definition)?;
            contests.insert(slug, definition);
        }
        Ok(Self { contests })
    }

    /// Load every `*.json` document in `dir`
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let io_err = |source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(io_err)?;
        paths.retain(|p| p.extension().is_some_and(|ext| ext == "json"));
        paths.sort();

        let mut definitions = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned) else {
                tracing::warn!(path = %path.display(), "Skipping contest file with non UTF-8 name");
                continue;
            };

            let contents = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            let definition: ContestDefinition =
                serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                    path: path.clone(),
                    source,
                })?;

            tracing::info!(
                slug = %slug,
                name = %definition.name,
                tasks = definition.tasks.len(),
                "Loaded contest definition"
            );
            definitions.push((slug, definition));
        }

        Self::from_definitions(definitions)
    }

    pub fn get(&self, slug: &str) -> Option<&ContestDefinition> {
        self.contests.get(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContestDefinition)> {
        self.contests.iter().map(|(slug, c)| (slug.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.contests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contests.is_empty()
    }
}

/// A span of `secs` seconds starting now must end at a representable instant
fn representable(secs: u64) -> bool {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|span| Utc::now().checked_add_signed(span))
        .is_some()
}

fn validate(slug: &str, contest: &ContestDefinition) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::Invalid {
        slug: slug.to_string(),
        reason: reason.to_string(),
    };

    if contest.duration == 0 {
        return Err(invalid("duration must be positive"));
    }
    if !representable(contest.duration) {
        return Err(invalid("duration is too long"));
    }
    if !representable(contest.submission_cooldown) {
        return Err(invalid("submission cooldown is too long"));
    }

    let scoring = &contest.scoring;
    for points in [scoring.subtask_score, scoring.test_score, scoring.answer_score] {
        if !points.is_finite() || points < 0.0 {
            return Err(invalid("scores must be finite and non-negative"));
        }
    }

    if contest.tasks.is_empty() {
        return Err(invalid("at least one task is required"));
    }

    let languages = &contest.judge.languages;
    if languages.is_empty() {
        return Err(invalid("at least one language is required"));
    }
    for (i, language) in languages.iter().enumerate() {
        if language.run.is_empty() {
            return Err(invalid(&format!("language '{}' has an empty run command", language.name)));
        }
        if language.compile.as_ref().is_some_and(Vec::is_empty) {
            return Err(invalid(&format!("language '{}' has an empty compile command", language.name)));
        }
        if languages[..i].iter().any(|l| l.name == language.name) {
            return Err(invalid(&format!("language '{}' is declared twice", language.name)));
        }
    }

    for task in &contest.tasks {
        if task.is_answer_task() && !task.subtasks.is_empty() {
            tracing::warn!(
                slug = %slug,
                task = %task.name,
                "Answer task declares subtasks; they are never judged"
            );
        }
    }

    Ok(())
}
