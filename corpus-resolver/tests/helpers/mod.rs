//! Test Helper Utilities
//!
//! Builds a small on-disk corpus shaped like the bundled one.

#![allow(dead_code)]

use corpus_resolver::Corpus;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Core corpus files, relative to the root
pub const CORE_FILES: &[&str] = &[
    "beethoven/opus18no1/movement1.mxl",
    "beethoven/opus18no1/movement1.krn",
    "beethoven/opus18no1/movement2.mxl",
    "beethoven/opus18no1/movement2.krn",
    "beethoven/opus18no1/movement3.mxl",
    "beethoven/opus18no1/movement3.krn",
    "beethoven/opus18no1/movement4.mxl",
    "beethoven/opus18no1/movement4.krn",
    "beethoven/README",
    "handel/hwv56/movement1-01.md",
    "handel/hwv56/movement1-02.md",
    "handel/hwv56/movement1-03.md",
    "handel/hwv56/movement2-01.md",
    "handel/hwv56/movement2-02.md",
    "handel/hwv56/movement3-01.md",
    "haydn/opus74no2/movement1.mxl",
    "haydn/opus74no2/movement2.mxl",
    "haydn/opus74no2/movement3.mxl",
    "haydn/opus74no2/movement4.mxl",
    "monteverdi/madrigal.3.1.mxl",
    "monteverdi/madrigal.3.2.mxl",
    "verdi/laDonnaEMobile.mxl",
    "bach/bwv66.6.mxl",
    "bach/bwv1080/contrapunctus1.krn",
    "luca/gloria.mxl",
    "schumann/opus41no1/movement2.xml",
    "schumann/opus41no1/movement2.mxl",
    ".svn/entries.krn",
];

pub const SCORE_XML: &str = "<?xml version=\"1.0\"?>\n<score-partwise/>\n";

pub fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, SCORE_XML).unwrap();
    path
}

/// A temporary core corpus plus a scratch directory for local paths
pub struct FixtureCorpus {
    pub core: TempDir,
    pub scratch: TempDir,
}

impl FixtureCorpus {
    pub fn new() -> Self {
        let core = TempDir::new().unwrap();
        for file in CORE_FILES {
            touch(core.path(), file);
        }
        Self {
            core,
            scratch: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.core.path()
    }

    pub fn corpus(&self) -> Corpus {
        Corpus::new(self.root(), Vec::new())
    }

    /// Corpus storing metadata bundles in the scratch directory
    pub fn corpus_with_metadata(&self) -> Corpus {
        self.corpus().with_metadata_dir(self.scratch.path().join("metadata"))
    }
}
