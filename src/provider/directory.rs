//! Filesystem search provider

use std::io;
use std::path::{Path, PathBuf};

use super::{Match, SearchProvider};

/// Provider that looks a name up as a relative path under each root directory
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    label: String,
    roots: Vec<PathBuf>,
}

impl DirectoryProvider {
    pub fn new(label: impl Into<String>, roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let label = label.into();
        let roots: Vec<PathBuf> = roots.into_iter().map(Into::into).collect();
        if roots.is_empty() {
            tracing::warn!(provider = %label, "no search roots configured");
        }
        Self { label, roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn read(&self, root: &Path, name: &str) -> Option<Match> {
        let path = root.join(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::trace!(provider = %self.label, path = %path.display(), "matched");
                Some(Match::new(content, path.display().to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(provider = %self.label, path = %path.display(), "tried");
                None
            }
            Err(e) => {
                tracing::warn!(
                    provider = %self.label,
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable template"
                );
                None
            }
        }
    }
}

impl SearchProvider for DirectoryProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn matches<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = Match> + 'a> {
        Box::new(self.roots.iter().filter_map(move |root| self.read(root, name)))
    }
}
