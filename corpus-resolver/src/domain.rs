//! Corpus domains and enumerated paths
//!
//! A `CorpusPath` carries its corpus-relative segments, populated once at
//! enumeration. All matching works on those segments, never on
//! separator-delimited strings.

use crate::extensions::{find_format_file, find_format_url, Format};
use corpus_common::Error as CommonError;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Independent sources of corpus paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Bundled with the distribution
    Core,
    /// Directories added by the user
    Local,
    /// Hosted remotely, resolved to URLs
    Virtual,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Core, Domain::Local, Domain::Virtual];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Core => "core",
            Domain::Local => "local",
            Domain::Virtual => "virtual",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "core" => Ok(Domain::Core),
            "local" => Ok(Domain::Local),
            "virtual" => Ok(Domain::Virtual),
            other => Err(CommonError::InvalidInput(format!("Unknown corpus domain: {}", other))),
        }
    }
}

/// Where a corpus entry can be loaded from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Url(url) => f.write_str(url),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One enumerated corpus entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CorpusPath {
    domain: Domain,
    segments: Vec<String>,
    location: Location,
}

impl CorpusPath {
    /// A file below `root`; segments are taken relative to the root
    pub fn from_file(domain: Domain, root: &Path, file: PathBuf) -> Self {
        let relative = file.strip_prefix(root).unwrap_or(&file);
        let segments = relative
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        Self {
            domain,
            segments,
            location: Location::File(file),
        }
    }

    /// A remotely hosted entry, addressed by its `/`-separated corpus path
    pub fn from_url(corpus_path: &str, url: &str) -> Self {
        Self {
            domain: Domain::Virtual,
            segments: split_segments(corpus_path),
            location: Location::Url(url.to_string()),
        }
    }

    /// Build directly from segments (fixtures, in-memory sources)
    pub fn new(domain: Domain, segments: Vec<String>, location: Location) -> Self {
        Self {
            domain,
            segments,
            location,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Final segment for files; the last URL path element for URLs
    pub fn file_name(&self) -> &str {
        match &self.location {
            Location::File(_) => self.segments.last().map(String::as_str).unwrap_or(""),
            Location::Url(url) => {
                let path = url.split('?').next().unwrap_or(url);
                path.rsplit('/').next().unwrap_or(path)
            }
        }
    }

    /// Corpus-relative path joined with `/`
    pub fn corpus_path(&self) -> String {
        self.segments.join("/")
    }

    /// Format and extension of the entry, if recognisable
    pub fn format_ext(&self) -> Option<(Option<Format>, String)> {
        match &self.location {
            Location::File(_) => find_format_file(self.file_name()),
            Location::Url(url) => find_format_url(url).map(|(format, ext)| (Some(format), ext)),
        }
    }

    pub fn extension(&self) -> Option<String> {
        self.format_ext().map(|(_, ext)| ext)
    }

    pub fn as_path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Url(_) => None,
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match &self.location {
            Location::File(_) => None,
            Location::Url(url) => Some(url),
        }
    }

    /// Full location string, used as the deterministic sort key
    pub fn sort_key(&self) -> String {
        self.location.to_string()
    }
}

impl fmt::Display for CorpusPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.location.fmt(f)
    }
}

impl PartialOrd for CorpusPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CorpusPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.domain.cmp(&other.domain))
    }
}

/// Split a `/` or `\` separated string into non-empty segments
pub fn split_segments(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == '/' || c == '\\')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_relative_segments() {
        let root = PathBuf::from("/srv/corpus");
        let path = CorpusPath::from_file(
            Domain::Core,
            &root,
            root.join("haydn").join("opus74no2").join("movement4.mxl"),
        );

        assert_eq!(path.segments(), &["haydn", "opus74no2", "movement4.mxl"]);
        assert_eq!(path.file_name(), "movement4.mxl");
        assert_eq!(path.corpus_path(), "haydn/opus74no2/movement4.mxl");
        assert_eq!(path.extension().as_deref(), Some(".mxl"));
        assert!(path.as_path().is_some());
    }

    #[test]
    fn test_from_url() {
        let path = CorpusPath::from_url(
            "bach/bwv1007/prelude",
            "http://kern.ccarh.org/cgi-bin/ksdata?l=cc/bach/cello&file=bwv1007-01.krn&f=xml",
        );

        assert_eq!(path.domain(), Domain::Virtual);
        assert_eq!(path.segments(), &["bach", "bwv1007", "prelude"]);
        assert_eq!(path.extension().as_deref(), Some(".xml"));
        assert!(path.as_url().is_some());
    }

    #[test]
    fn test_domain_round_trip_names() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
        }
        assert!("elsewhere".parse::<Domain>().is_err());
    }

    #[test]
    fn test_ordering_uses_location() {
        let root = PathBuf::from("/c");
        let a = CorpusPath::from_file(Domain::Core, &root, root.join("a").join("x.krn"));
        let b = CorpusPath::from_file(Domain::Core, &root, root.join("b").join("a.krn"));
        assert!(a < b);
    }

    #[test]
    fn test_split_segments() {
        assert_eq!(split_segments("beethoven/opus18no1"), vec!["beethoven", "opus18no1"]);
        assert_eq!(split_segments("a\\b//c/"), vec!["a", "b", "c"]);
    }
}
