// src/services/classifier.rs

//! Extension-based classification of links into files and pages.

use std::collections::HashSet;

use crate::models::DEFAULT_EXTENSIONS;

/// Decides whether a link names a file of interest.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    extensions: HashSet<String>,
}

impl FileClassifier {
    /// Build a classifier from an allow-list such as `["pdf", ".DOCX"]`.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self { extensions }
    }

    /// Extension of the link's path if it is on the allow-list.
    ///
    /// Only the path is inspected: `report.pdf?id=5` matches,
    /// `page?file=report.pdf` does not.
    pub fn extension(&self, link: &str) -> Option<String> {
        let path = link.split(['?', '#']).next().unwrap_or("");
        let name = path.rsplit('/').next().unwrap_or("");
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }

        let ext = ext.to_lowercase();
        self.extensions.contains(&ext).then_some(ext)
    }

    pub fn is_file(&self, link: &str) -> bool {
        self.extension(link).is_some()
    }
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}
