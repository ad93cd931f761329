//! Corpus facade
//!
//! Owns one source per domain, the listing cache and the metadata cache.
//! Resolution, reference building, metadata search and archive helpers are
//! implemented on `Corpus` in their own modules.

use crate::domain::{CorpusPath, Domain};
use crate::error::{Error, Result};
use crate::extensions::ExtensionSet;
use crate::metadata::MetadataCache;
use crate::source::{CoreCorpus, LocalCorpus, PathCache, PathDomainSource, VirtualCorpus};
use corpus_common::config::RootFolderResolver;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// The domains searched for on-disk files, in search order
pub const FILE_DOMAINS: [Domain; 2] = [Domain::Core, Domain::Local];

pub struct Corpus {
    core: CoreCorpus,
    local: LocalCorpus,
    virtual_corpus: VirtualCorpus,
    cache: PathCache,
    metadata: MetadataCache,
}

impl Corpus {
    /// Corpus over a core root and persistent local directories, with an
    /// in-memory metadata cache
    pub fn new(core_root: impl Into<PathBuf>, local_dirs: Vec<PathBuf>) -> Self {
        Self {
            core: CoreCorpus::new(core_root),
            local: LocalCorpus::new(local_dirs),
            virtual_corpus: VirtualCorpus,
            cache: PathCache::new(),
            metadata: MetadataCache::new(None),
        }
    }

    /// Store metadata bundles as JSON below `dir`
    pub fn with_metadata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.metadata = MetadataCache::new(Some(dir.into()));
        self
    }

    /// Build from resolved configuration; `extra_local` directories are
    /// appended to the configured ones
    pub fn from_config(resolver: &RootFolderResolver, extra_local: Vec<PathBuf>) -> Self {
        let root = resolver.resolve();
        let mut local_dirs = resolver.config().local_corpus_paths.clone();
        for dir in extra_local {
            if !local_dirs.contains(&dir) {
                local_dirs.push(dir);
            }
        }

        if !root.is_dir() {
            warn!("Core corpus root does not exist: {}", root.display());
        }
        info!(
            "Corpus root: {} ({} local directories)",
            root.display(),
            local_dirs.len()
        );

        Self::new(root, local_dirs).with_metadata_dir(resolver.metadata_cache_dir())
    }

    pub fn core_root(&self) -> &Path {
        self.core.root()
    }

    pub fn local_directories(&self) -> Vec<PathBuf> {
        self.local.directories()
    }

    pub fn metadata(&self) -> &MetadataCache {
        &self.metadata
    }

    pub fn source(&self, domain: Domain) -> &dyn PathDomainSource {
        match domain {
            Domain::Core => &self.core,
            Domain::Local => &self.local,
            Domain::Virtual => &self.virtual_corpus,
        }
    }

    /// All paths of one domain.
    ///
    /// `extensions` of `None` lists every known format; with `expand`, each
    /// requested extension is widened to its whole format family.
    pub fn paths<S: AsRef<str>>(
        &self,
        domain: Domain,
        extensions: Option<&[S]>,
        expand: bool,
    ) -> Result<Arc<Vec<CorpusPath>>> {
        self.listing(domain, &ExtensionSet::expand(extensions, expand))
    }

    /// Cached listing for an already-expanded extension set
    pub fn listing(&self, domain: Domain, extensions: &ExtensionSet) -> Result<Arc<Vec<CorpusPath>>> {
        self.cache
            .get_or_try_insert_with(domain, extensions, || self.source(domain).list_paths(extensions))
    }

    /// Listing for use in multi-domain searches: an unavailable domain
    /// contributes nothing instead of failing the whole search
    pub(crate) fn listing_or_empty(
        &self,
        domain: Domain,
        extensions: &ExtensionSet,
    ) -> Result<Arc<Vec<CorpusPath>>> {
        match self.listing(domain, extensions) {
            Err(Error::DomainUnavailable { domain, path }) => {
                warn!("Skipping unavailable {} corpus at {}", domain, path.display());
                Ok(Arc::new(Vec::new()))
            }
            other => other,
        }
    }

    /// Register a local directory for this session and drop stale local
    /// listings and metadata
    pub fn add_path(&self, dir: impl Into<PathBuf>) -> Result<()> {
        let dir = dir.into();
        self.cache
            .invalidate_with(Domain::Local, || self.local.add_path(dir))?;
        self.metadata.invalidate(Domain::Local);
        Ok(())
    }

    /// Forget every cached listing of one domain and its metadata bundle
    pub fn invalidate(&self, domain: Domain) {
        self.cache.invalidate(domain);
        self.metadata.invalidate(domain);
    }
}
