//! Path domain sources
//!
//! One source per domain enumerates every corpus entry it knows about,
//! filtered by extension. Directory walks can be slow, so listings are kept
//! in a `PathCache` owned by the corpus facade.

use crate::domain::{CorpusPath, Domain};
use crate::error::{Error, Result};
use crate::extensions::ExtensionSet;
use crate::virtual_works::VIRTUAL_WORKS;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Names never descended into or listed
const IGNORE_PATTERNS: &[&str] = &[".git", ".svn", ".DS_Store", "Thumbs.db", "__pycache__"];

/// A source of corpus paths for one domain
pub trait PathDomainSource: Send + Sync {
    fn domain(&self) -> Domain;

    /// All entries whose extension is in `extensions`, sorted
    fn list_paths(&self, extensions: &ExtensionSet) -> Result<Vec<CorpusPath>>;
}

fn should_process_entry(entry: &DirEntry) -> bool {
    // The walk root may itself be a dot-directory (temp dirs are)
    if entry.depth() == 0 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !name.starts_with('.') && !IGNORE_PATTERNS.iter().any(|p| name == *p)
}

/// Recursively collect files below `root` matching `extensions`
fn walk_directory(domain: Domain, root: &Path, extensions: &ExtensionSet) -> Vec<CorpusPath> {
    let mut found = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(should_process_entry);

    for entry in walker {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if extensions.matches_file_name(&name) {
                    found.push(CorpusPath::from_file(domain, root, entry.into_path()));
                }
            }
            Err(e) => {
                warn!("Error accessing corpus entry: {}", e);
            }
        }
    }

    debug!(
        "Walked {} ({}): {} matching files",
        root.display(),
        domain,
        found.len()
    );
    found
}

/// The corpus bundled with the distribution
#[derive(Debug, Clone)]
pub struct CoreCorpus {
    root: PathBuf,
}

impl CoreCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PathDomainSource for CoreCorpus {
    fn domain(&self) -> Domain {
        Domain::Core
    }

    fn list_paths(&self, extensions: &ExtensionSet) -> Result<Vec<CorpusPath>> {
        if !self.root.is_dir() {
            return Err(Error::DomainUnavailable {
                domain: Domain::Core,
                path: self.root.clone(),
            });
        }
        let mut paths = walk_directory(Domain::Core, &self.root, extensions);
        paths.sort();
        Ok(paths)
    }
}

/// User directories: persistent ones from configuration plus any
/// registered during this session
#[derive(Debug, Default)]
pub struct LocalCorpus {
    configured: Vec<PathBuf>,
    session: Mutex<Vec<PathBuf>>,
}

impl LocalCorpus {
    pub fn new(configured: Vec<PathBuf>) -> Self {
        Self {
            configured,
            session: Mutex::new(Vec::new()),
        }
    }

    /// Configured directories followed by session-registered ones
    pub fn directories(&self) -> Vec<PathBuf> {
        let session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        self.configured.iter().chain(session.iter()).cloned().collect()
    }

    /// Register a directory for the rest of this session
    pub fn add_path(&self, dir: impl Into<PathBuf>) -> Result<()> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::InvalidPath {
                path: dir,
                reason: "directory does not exist".to_string(),
            });
        }

        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        if session.iter().any(|p| same_directory(p, &dir)) {
            return Err(Error::InvalidPath {
                path: dir,
                reason: "already added to the local corpus".to_string(),
            });
        }
        if self.configured.iter().any(|p| same_directory(p, &dir)) {
            return Err(Error::InvalidPath {
                path: dir,
                reason: "already in the local corpus configuration".to_string(),
            });
        }

        info!("Added local corpus path: {}", dir.display());
        session.push(dir);
        Ok(())
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl PathDomainSource for LocalCorpus {
    fn domain(&self) -> Domain {
        Domain::Local
    }

    fn list_paths(&self, extensions: &ExtensionSet) -> Result<Vec<CorpusPath>> {
        let mut paths = Vec::new();
        for dir in self.directories() {
            if !dir.is_dir() {
                warn!("Skipping missing local corpus directory: {}", dir.display());
                continue;
            }
            paths.extend(walk_directory(Domain::Local, &dir, extensions));
        }
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

/// Remotely hosted works, enumerated as URLs
#[derive(Debug, Default, Clone, Copy)]
pub struct VirtualCorpus;

impl PathDomainSource for VirtualCorpus {
    fn domain(&self) -> Domain {
        Domain::Virtual
    }

    fn list_paths(&self, extensions: &ExtensionSet) -> Result<Vec<CorpusPath>> {
        let mut paths: Vec<CorpusPath> = VIRTUAL_WORKS
            .iter()
            .flat_map(|work| {
                work.urls_by_extension(Some(extensions))
                    .into_iter()
                    .map(move |url| CorpusPath::from_url(&work.corpus_path, &url))
            })
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<(Domain, ExtensionSet), Arc<Vec<CorpusPath>>>,
    generations: HashMap<Domain, u64>,
}

/// Per-domain listing cache keyed by extension set.
///
/// Each domain carries a generation counter bumped by `invalidate`; a
/// listing computed before an invalidation is never stored after it.
#[derive(Debug, Default)]
pub struct PathCache {
    state: RwLock<CacheState>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, domain: Domain, extensions: &ExtensionSet) -> Option<Arc<Vec<CorpusPath>>> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.entries.get(&(domain, extensions.clone())).cloned()
    }

    /// Cached listing, or compute it with `list` and store the result
    pub fn get_or_try_insert_with<F>(
        &self,
        domain: Domain,
        extensions: &ExtensionSet,
        list: F,
    ) -> Result<Arc<Vec<CorpusPath>>>
    where
        F: FnOnce() -> Result<Vec<CorpusPath>>,
    {
        let generation = {
            let state = self.state.read().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = state.entries.get(&(domain, extensions.clone())) {
                debug!("Path cache hit: {} ({} extensions)", domain, extensions.len());
                return Ok(Arc::clone(hit));
            }
            state.generations.get(&domain).copied().unwrap_or(0)
        };

        debug!("Path cache miss: {} ({} extensions)", domain, extensions.len());
        let listing = Arc::new(list()?);

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.generations.get(&domain).copied().unwrap_or(0) == generation {
            state
                .entries
                .insert((domain, extensions.clone()), Arc::clone(&listing));
        }
        Ok(listing)
    }

    /// Drop every listing of one domain
    pub fn invalidate(&self, domain: Domain) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        Self::invalidate_locked(&mut state, domain);
    }

    /// Run `update` and invalidate `domain` while holding the write lock,
    /// so no listing can interleave with the change
    pub fn invalidate_with<T, F>(&self, domain: Domain, update: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let value = update()?;
        Self::invalidate_locked(&mut state, domain);
        Ok(value)
    }

    fn invalidate_locked(state: &mut CacheState, domain: Domain) {
        state.entries.retain(|(d, _), _| *d != domain);
        *state.generations.entry(domain).or_insert(0) += 1;
        debug!("Invalidated cached {} listings", domain);
    }

    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
