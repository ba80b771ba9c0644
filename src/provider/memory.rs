//! In-memory search provider

use std::collections::HashMap;

use super::{Match, SearchProvider};

#[derive(Debug, Clone)]
struct MemoryRoot {
    label: String,
    templates: HashMap<String, String>,
}

/// Provider whose roots are in-memory name-to-source maps
///
/// Origins have the form `<root label>/<name>`.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    label: String,
    roots: Vec<MemoryRoot>,
}

impl MemoryProvider {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            roots: Vec::new(),
        }
    }

    /// Append a root holding the given templates
    pub fn with_root<N, C>(
        mut self,
        label: impl Into<String>,
        templates: impl IntoIterator<Item = (N, C)>,
    ) -> Self
    where
        N: Into<String>,
        C: Into<String>,
    {
        self.roots.push(MemoryRoot {
            label: label.into(),
            templates: templates
                .into_iter()
                .map(|(name, content)| (name.into(), content.into()))
                .collect(),
        });
        self
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }
}

impl SearchProvider for MemoryProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn matches<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = Match> + 'a> {
        Box::new(self.roots.iter().filter_map(move |root| {
            root.templates
                .get(name)
                .map(|content| Match::new(content.clone(), format!("{}/{}", root.label, name)))
        }))
    }
}
