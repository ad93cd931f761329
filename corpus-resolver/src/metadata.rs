//! Metadata bundle cache
//!
//! One lazily built bundle per domain, searched by composer, title, corpus
//! path or format. With a cache directory configured, bundles are stored as
//! `<dir>/<domain>.json` and later processes load them instead of walking
//! the corpus again.

use crate::composers::find_by_directory;
use crate::corpus::Corpus;
use crate::domain::{split_segments, CorpusPath, Domain, Location};
use crate::error::{Error, Result};
use crate::extensions::{find_format_url, ExtensionSet, Format};
use crate::references::{strip_extension, stub_title};
use crate::virtual_works::VIRTUAL_WORKS;
use corpus_common::Error as CommonError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Searchable metadata fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Composer,
    Title,
    CorpusPath,
    Format,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetadataField::Composer => "composer",
            MetadataField::Title => "title",
            MetadataField::CorpusPath => "corpus_path",
            MetadataField::Format => "format",
        })
    }
}

impl FromStr for MetadataField {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "composer" => Ok(MetadataField::Composer),
            "title" => Ok(MetadataField::Title),
            "corpus_path" | "path" => Ok(MetadataField::CorpusPath),
            "format" => Ok(MetadataField::Format),
            other => Err(CommonError::InvalidInput(format!("Unknown metadata field: {}", other))),
        }
    }
}

/// What is known about one corpus entry without parsing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub domain: Domain,
    pub corpus_path: String,
    pub composer: Option<String>,
    pub title: String,
    pub format: Format,
    pub ext: String,
    /// File path or URL
    pub location: String,
}

impl MetadataEntry {
    fn from_path(path: &CorpusPath) -> Option<Self> {
        let (format, ext) = match path.format_ext() {
            Some((Some(format), ext)) => (format, ext),
            _ => return None,
        };

        let segments = path.segments();
        let composer_index = segments
            .iter()
            .position(|segment| find_by_directory(segment).is_some());
        let composer = composer_index
            .and_then(|i| find_by_directory(&segments[i]))
            .map(|record| record.name.to_string());

        let stub = match composer_index {
            Some(i) if i + 1 < segments.len() => segments[i + 1].as_str(),
            _ => path.file_name(),
        };
        let stub = strip_extension(stub, &ext);

        Some(Self {
            domain: path.domain(),
            corpus_path: path.corpus_path(),
            composer,
            title: stub_title(stub),
            format,
            ext,
            location: path.to_string(),
        })
    }

    fn virtual_entries() -> Vec<Self> {
        VIRTUAL_WORKS
            .iter()
            .flat_map(|work| {
                work.urls.iter().filter_map(move |url| {
                    let (format, ext) = find_format_url(url)?;
                    Some(Self {
                        domain: Domain::Virtual,
                        corpus_path: work.corpus_path.clone(),
                        composer: Some(work.composer.clone()),
                        title: work.title.clone(),
                        format,
                        ext,
                        location: url.clone(),
                    })
                })
            })
            .collect()
    }

    fn field_values(&self, field: Option<MetadataField>) -> Vec<&str> {
        let composer = self.composer.as_deref().unwrap_or("");
        match field {
            Some(MetadataField::Composer) => vec![composer],
            Some(MetadataField::Title) => vec![self.title.as_str()],
            Some(MetadataField::CorpusPath) => vec![self.corpus_path.as_str()],
            Some(MetadataField::Format) => vec![self.format.name()],
            None => vec![
                composer,
                self.title.as_str(),
                self.corpus_path.as_str(),
                self.format.name(),
            ],
        }
    }

    /// Case-insensitive substring match on one field, or any field
    pub fn matches(&self, query: &str, field: Option<MetadataField>) -> bool {
        let query = query.to_lowercase();
        self.field_values(field)
            .iter()
            .any(|value| value.to_lowercase().contains(&query))
    }

    pub fn to_corpus_path(&self) -> CorpusPath {
        let location = match self.domain {
            Domain::Virtual => Location::Url(self.location.clone()),
            _ => Location::File(PathBuf::from(&self.location)),
        };
        CorpusPath::new(self.domain, split_segments(&self.corpus_path), location)
    }
}

/// All metadata of one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataBundle {
    pub domain: Domain,
    pub entries: Vec<MetadataEntry>,
}

#[derive(Debug, Default)]
struct BundleState {
    bundles: HashMap<Domain, Arc<MetadataBundle>>,
    /// Domains whose stored JSON must not be trusted until rebuilt
    stale: HashSet<Domain>,
}

#[derive(Debug)]
pub struct MetadataCache {
    dir: Option<PathBuf>,
    state: RwLock<BundleState>,
}

impl MetadataCache {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            state: RwLock::new(BundleState::default()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn bundle_path(&self, domain: Domain) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", domain)))
    }

    /// Drop the in-memory bundle and ignore any stored one
    pub fn invalidate(&self, domain: Domain) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.bundles.remove(&domain);
        state.stale.insert(domain);
        debug!("Invalidated {} metadata bundle", domain);
    }

    /// The bundle for `domain`, loading or building it on first use
    pub fn get_or_build<F>(&self, domain: Domain, build: F) -> Result<Arc<MetadataBundle>>
    where
        F: FnOnce() -> Result<Vec<MetadataEntry>>,
    {
        let stale = {
            let state = self.state.read().unwrap_or_else(|e| e.into_inner());
            if let Some(bundle) = state.bundles.get(&domain) {
                return Ok(Arc::clone(bundle));
            }
            state.stale.contains(&domain)
        };

        if !stale {
            if let Some(bundle) = self.load(domain) {
                let bundle = Arc::new(bundle);
                let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
                state.bundles.insert(domain, Arc::clone(&bundle));
                return Ok(bundle);
            }
        }

        self.rebuild(domain, build)
    }

    /// Build a fresh bundle, store it when a directory is configured
    pub fn rebuild<F>(&self, domain: Domain, build: F) -> Result<Arc<MetadataBundle>>
    where
        F: FnOnce() -> Result<Vec<MetadataEntry>>,
    {
        let bundle = MetadataBundle {
            domain,
            entries: build()?,
        };
        self.store(&bundle)?;

        let bundle = Arc::new(bundle);
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.bundles.insert(domain, Arc::clone(&bundle));
        state.stale.remove(&domain);
        info!(
            "Rebuilt {} metadata bundle: {} entries",
            domain,
            bundle.entries.len()
        );
        Ok(bundle)
    }

    fn load(&self, domain: Domain) -> Option<MetadataBundle> {
        let path = self.bundle_path(domain)?;
        if !path.exists() {
            return None;
        }
        let loaded = fs::read_to_string(&path)
            .map_err(Error::from)
            .and_then(|content| serde_json::from_str::<MetadataBundle>(&content).map_err(Error::from));
        match loaded {
            Ok(bundle) if bundle.domain == domain => {
                debug!("Loaded {} metadata from {}", domain, path.display());
                Some(bundle)
            }
            Ok(_) => {
                warn!("Ignoring metadata bundle for another domain: {}", path.display());
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable metadata bundle {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Atomic write (temp file + rename)
    fn store(&self, bundle: &MetadataBundle) -> Result<()> {
        let target = match self.bundle_path(bundle.domain) {
            Some(path) => path,
            None => return Ok(()),
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = target.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            serde_json::to_writer_pretty(&mut file, bundle)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }

        if let Err(e) = fs::rename(&temp_path, &target) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        debug!("Stored metadata bundle: {}", target.display());
        Ok(())
    }
}

impl Corpus {
    fn collect_metadata(&self, domain: Domain, strict: bool) -> Result<Vec<MetadataEntry>> {
        if domain == Domain::Virtual {
            return Ok(MetadataEntry::virtual_entries());
        }

        let extensions = ExtensionSet::all();
        let listing = if strict {
            self.listing(domain, &extensions)?
        } else {
            self.listing_or_empty(domain, &extensions)?
        };

        let mut entries = Vec::with_capacity(listing.len());
        for path in listing.iter() {
            match MetadataEntry::from_path(path) {
                Some(entry) => entries.push(entry),
                None => warn!("Could not classify corpus entry: {}", path),
            }
        }
        Ok(entries)
    }

    /// Rebuild the metadata bundles of `domains`; returns the entry count
    pub fn rebuild_metadata(&self, domains: &[Domain]) -> Result<usize> {
        let mut total = 0;
        for &domain in domains {
            let bundle = self
                .metadata()
                .rebuild(domain, || self.collect_metadata(domain, true))?;
            total += bundle.entries.len();
        }
        Ok(total)
    }

    /// Paths whose metadata matches `query`, ordered by location
    pub fn search(
        &self,
        query: &str,
        field: Option<MetadataField>,
        domains: &[Domain],
        extensions: Option<&ExtensionSet>,
    ) -> Result<Vec<CorpusPath>> {
        let mut results = Vec::new();
        for &domain in domains {
            let bundle = self
                .metadata()
                .get_or_build(domain, || self.collect_metadata(domain, false))?;
            results.extend(
                bundle
                    .entries
                    .iter()
                    .filter(|entry| extensions.map_or(true, |set| set.contains(&entry.ext)))
                    .filter(|entry| entry.matches(query, field))
                    .map(MetadataEntry::to_corpus_path),
            );
        }
        results.sort();
        results.dedup();
        debug!("Search '{}' ({:?}): {} results", query, field, results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(path: &str) -> MetadataEntry {
        let root = PathBuf::from("/corpus");
        MetadataEntry::from_path(&CorpusPath::from_file(Domain::Core, &root, root.join(path))).unwrap()
    }

    #[test]
    fn test_entry_from_path() {
        let e = entry("beethoven/opus18no1/movement1.mxl");
        assert_eq!(e.composer.as_deref(), Some("Ludwig van Beethoven"));
        assert_eq!(e.title, "Opus 18No1");
        assert_eq!(e.format, Format::MusicXml);
        assert_eq!(e.corpus_path, "beethoven/opus18no1/movement1.mxl");

        let upper = entry("luca/Gloria.MXL");
        assert_eq!(upper.title, "Gloria");
        assert_eq!(upper.ext, ".mxl");

        let loose = entry("mine/laDonnaEMobile.abc");
        assert!(loose.composer.is_none());
        assert_eq!(loose.title, "La Donna E Mobile");
    }

    #[test]
    fn test_field_matching() {
        let e = entry("beethoven/opus18no1/movement1.mxl");
        assert!(e.matches("BEETHOVEN", Some(MetadataField::Composer)));
        assert!(!e.matches("beethoven", Some(MetadataField::Title)));
        assert!(e.matches("musicxml", Some(MetadataField::Format)));
        assert!(e.matches("opus 18", None));
    }

    #[test]
    fn test_field_parse() {
        assert_eq!("corpus-path".parse::<MetadataField>().unwrap(), MetadataField::CorpusPath);
        assert!("mood".parse::<MetadataField>().is_err());
    }

    #[test]
    fn test_virtual_entries_have_known_formats() {
        let entries = MetadataEntry::virtual_entries();
        assert!(!entries.is_empty());
        assert!(entries.iter().all(|e| e.domain == Domain::Virtual));
        assert!(entries.iter().any(|e| e.format == Format::Humdrum));
    }

    #[test]
    fn test_rebuild_stores_and_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MetadataCache::new(Some(temp_dir.path().to_path_buf()));
        cache
            .rebuild(Domain::Core, || Ok(vec![entry("bach/bwv1.mxl")]))
            .unwrap();
        assert!(temp_dir.path().join("core.json").exists());

        let fresh = MetadataCache::new(Some(temp_dir.path().to_path_buf()));
        let bundle = fresh
            .get_or_build(Domain::Core, || panic!("stored bundle not used"))
            .unwrap();
        assert_eq!(bundle.entries.len(), 1);
    }

    #[test]
    fn test_invalidate_ignores_stored_bundle() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MetadataCache::new(Some(temp_dir.path().to_path_buf()));
        cache
            .rebuild(Domain::Local, || Ok(vec![entry("bach/bwv1.mxl")]))
            .unwrap();

        cache.invalidate(Domain::Local);
        let bundle = cache.get_or_build(Domain::Local, || Ok(Vec::new())).unwrap();
        assert!(bundle.entries.is_empty());
    }

    #[test]
    fn test_to_corpus_path_round_trip() {
        let e = entry("bach/bwv1.mxl");
        let path = e.to_corpus_path();
        assert_eq!(path.corpus_path(), "bach/bwv1.mxl");
        assert_eq!(path.as_path(), Some(Path::new("/corpus/bach/bwv1.mxl")));
    }
}
