//! Work resolver
//!
//! Wraps the identifier matcher with arity policy and fallbacks:
//! 1. Match the file domains with the requested extensions
//! 2. Retry with `.mxl` when the identifier ends in `.xml`
//! 3. Look the identifier up in the virtual works
//!
//! One match yields a single path, several yield the sorted list, none is
//! `Error::NotFound`.

use crate::corpus::{Corpus, FILE_DOMAINS};
use crate::domain::{CorpusPath, Domain};
use crate::error::{Error, Result};
use crate::extensions::ExtensionSet;
use crate::identifier::{Movement, WorkIdentifier};
use crate::matcher;
use crate::virtual_works::VIRTUAL_WORKS;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Single(CorpusPath),
    Multiple(Vec<CorpusPath>),
}

impl Resolution {
    fn from_paths(mut paths: Vec<CorpusPath>) -> Option<Self> {
        match paths.len() {
            0 => None,
            1 => paths.pop().map(Resolution::Single),
            _ => Some(Resolution::Multiple(paths)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Resolution::Single(_) => 1,
            Resolution::Multiple(paths) => paths.len(),
        }
    }

    pub fn single(&self) -> Option<&CorpusPath> {
        match self {
            Resolution::Single(path) => Some(path),
            Resolution::Multiple(_) => None,
        }
    }

    pub fn paths(&self) -> &[CorpusPath] {
        match self {
            Resolution::Single(path) => std::slice::from_ref(path),
            Resolution::Multiple(paths) => paths,
        }
    }

    pub fn into_paths(self) -> Vec<CorpusPath> {
        match self {
            Resolution::Single(path) => vec![path],
            Resolution::Multiple(paths) => paths,
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Drop `<stem>.xml` files that have an `<stem>.mxl` sibling
fn prefer_compressed(paths: Vec<CorpusPath>) -> Vec<CorpusPath> {
    let compressed: HashSet<PathBuf> = paths
        .iter()
        .filter_map(CorpusPath::as_path)
        .filter(|file| has_extension(file, "mxl"))
        .map(|file| file.with_extension(""))
        .collect();
    if compressed.is_empty() {
        return paths;
    }

    paths
        .into_iter()
        .filter(|path| match path.as_path() {
            Some(file) if has_extension(file, "xml") => {
                let shadowed = compressed.contains(&file.with_extension(""));
                if shadowed {
                    debug!("Preferring compressed container over {}", file.display());
                }
                !shadowed
            }
            _ => true,
        })
        .collect()
}

impl Corpus {
    /// Matching paths across the file domains, always a list
    pub fn work_list(
        &self,
        identifier: &WorkIdentifier,
        movement: Option<&Movement>,
        extensions: Option<&ExtensionSet>,
    ) -> Result<Vec<CorpusPath>> {
        let extensions = extensions.cloned().unwrap_or_else(ExtensionSet::all);
        let mut listings = Vec::with_capacity(FILE_DOMAINS.len());
        for domain in FILE_DOMAINS {
            listings.push(self.listing_or_empty(domain, &extensions)?);
        }

        Ok(matcher::match_work(
            listings.iter().flat_map(|listing| listing.iter()),
            identifier,
            movement,
        ))
    }

    /// URLs of the first virtual work whose corpus path contains the
    /// identifier
    pub fn virtual_work_list(
        &self,
        identifier: &WorkIdentifier,
        extensions: Option<&ExtensionSet>,
    ) -> Vec<CorpusPath> {
        let needle = identifier.components().join("/");
        if needle.is_empty() {
            return Vec::new();
        }

        VIRTUAL_WORKS
            .iter()
            .find(|work| work.corpus_path.to_lowercase().contains(&needle))
            .map(|work| {
                debug!("Virtual work match for '{}': {}", identifier, work.corpus_path);
                work.urls_by_extension(extensions)
                    .iter()
                    .map(|url| CorpusPath::from_url(&work.corpus_path, url))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolve a work to one path or an ordered list of paths
    pub fn resolve(
        &self,
        work: impl Into<WorkIdentifier>,
        movement: Option<Movement>,
        extensions: Option<&ExtensionSet>,
    ) -> Result<Resolution> {
        let identifier = work.into();
        let movement = movement.as_ref();

        let mut found = self.work_list(&identifier, movement, extensions)?;

        if found.is_empty() {
            if let Some(compressed) = identifier.with_extension_replaced(".xml", ".mxl") {
                debug!("No match for '{}', retrying as '{}'", identifier, compressed);
                found = self.work_list(&compressed, movement, extensions)?;
            }
        }

        if found.is_empty() {
            found = self.virtual_work_list(&identifier, extensions);
        }

        Resolution::from_paths(prefer_compressed(found)).ok_or_else(|| Error::NotFound {
            work: identifier.to_string(),
            movement: movement.map(|m| m.to_string()),
            extensions: extensions
                .map(|set| set.as_slice().to_vec())
                .unwrap_or_default(),
        })
    }

    /// Every path, in any domain, with a segment naming `composer`
    pub fn match_composer(
        &self,
        composer: &str,
        extensions: Option<&ExtensionSet>,
    ) -> Result<Vec<CorpusPath>> {
        let extensions = extensions.cloned().unwrap_or_else(ExtensionSet::all);
        let mut listings = Vec::with_capacity(Domain::ALL.len());
        for domain in Domain::ALL {
            listings.push(self.listing_or_empty(domain, &extensions)?);
        }

        Ok(matcher::match_composer(
            listings.iter().flat_map(|listing| listing.iter()),
            composer,
        ))
    }

    /// Top-level core directory for a composer, if present
    pub fn composer_directory(&self, composer: &str) -> Result<Option<PathBuf>> {
        let root = self.core_root();
        if !root.is_dir() {
            return Err(Error::DomainUnavailable {
                domain: Domain::Core,
                path: root.to_path_buf(),
            });
        }

        let wanted = composer.to_lowercase();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir()
                && entry.file_name().to_string_lossy().to_lowercase() == wanted
            {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;

    fn file(path: &str) -> CorpusPath {
        let root = PathBuf::from("/c");
        CorpusPath::from_file(Domain::Core, &root, root.join(path))
    }

    #[test]
    fn test_resolution_arity() {
        assert!(Resolution::from_paths(Vec::new()).is_none());

        let single = Resolution::from_paths(vec![file("a/b.krn")]).unwrap();
        assert!(single.single().is_some());
        assert_eq!(single.len(), 1);

        let multiple = Resolution::from_paths(vec![file("a/b.krn"), file("a/c.krn")]).unwrap();
        assert!(multiple.single().is_none());
        assert_eq!(multiple.paths().len(), 2);
    }

    #[test]
    fn test_prefer_compressed_drops_shadowed_xml() {
        let kept = prefer_compressed(vec![
            file("haydn/movement4.mxl"),
            file("haydn/movement4.xml"),
            file("haydn/movement3.xml"),
        ]);
        let names: Vec<&str> = kept.iter().map(|p| p.file_name()).collect();
        assert_eq!(names, vec!["movement4.mxl", "movement3.xml"]);
    }

    #[test]
    fn test_prefer_compressed_ignores_urls() {
        let url = CorpusPath::new(
            Domain::Virtual,
            vec!["bach".into()],
            Location::Url("http://example.org/x.xml".into()),
        );
        assert_eq!(prefer_compressed(vec![url.clone()]), vec![url]);
    }

    #[test]
    fn test_virtual_work_list_uses_first_url_without_filter() {
        let corpus = Corpus::new("/nonexistent", Vec::new());
        let found = corpus.virtual_work_list(&WorkIdentifier::from("bwv1007"), None);
        assert_eq!(found.len(), 1);
        assert!(found[0].as_url().unwrap().contains("f=xml"));

        let krn = ExtensionSet::expand(Some(&["krn"][..]), true);
        let kern = corpus.virtual_work_list(&WorkIdentifier::from("bwv1007"), Some(&krn));
        assert_eq!(kern.len(), 1);
        assert!(kern[0].as_url().unwrap().contains("f=kern"));
    }
}
