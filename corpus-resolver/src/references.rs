//! Reference index builder
//!
//! Groups every corpus file under its composer and work stub (the first
//! path segment after the composer directory), then folds in the virtual
//! works. The output feeds documentation generation and is rebuilt on
//! every call.

use crate::composers::{ComposerRecord, COMPOSERS};
use crate::corpus::{Corpus, FILE_DOMAINS};
use crate::domain::CorpusPath;
use crate::error::Result;
use crate::extensions::{find_format_url, ExtensionSet, Format};
use crate::matcher;
use crate::virtual_works::{VirtualWork, VIRTUAL_WORKS};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One file (or URL) of a work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub format: Format,
    pub ext: String,
    pub corpus_path: String,
    pub file_name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkReference {
    pub title: String,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub files: Vec<FileRecord>,
}

/// All works of one composer (or collection)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
    pub composer: String,
    pub composer_dir: String,
    pub works: BTreeMap<String, WorkReference>,
    /// Work stubs ordered by (title, stub); present on sorted output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted_work_keys: Option<Vec<String>>,
}

impl ReferenceEntry {
    fn new(composer: &str, composer_dir: &str) -> Self {
        Self {
            composer: composer.to_string(),
            composer_dir: composer_dir.to_string(),
            works: BTreeMap::new(),
            sorted_work_keys: None,
        }
    }

    /// Works in display order: the sorted keys when present, else by stub
    pub fn ordered_works(&self) -> Vec<(&str, &WorkReference)> {
        match &self.sorted_work_keys {
            Some(keys) => keys
                .iter()
                .filter_map(|key| self.works.get(key).map(|work| (key.as_str(), work)))
                .collect(),
            None => self.works.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        }
    }
}

/// Insert spaces at camel-case boundaries and before the first number:
/// `opus18no1` -> `opus 18no1`, `laDonnaEMobile` -> `la Donna E Mobile`
pub fn space_camel_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    let mut seen_number = false;
    let mut last_is_number = false;

    for (i, c) in value.chars().enumerate() {
        let is_number = c.is_ascii_digit() || c == '.';
        if is_number && !seen_number && !last_is_number {
            seen_number = true;
            out.push(' ');
        } else if c.is_uppercase() && i > 0 && !last_is_number {
            out.push(' ');
        }
        out.push(c);
        last_is_number = is_number;
    }

    out.trim().to_string()
}

/// Capitalise the first letter of every run of letters, lowercase the rest
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Human-readable title from a file or directory stub
pub fn stub_title(stub: &str) -> String {
    title_case(&space_camel_case(stub))
}

/// `value` without a trailing `ext`, compared ignoring ASCII case
pub(crate) fn strip_extension<'a>(value: &'a str, ext: &str) -> &'a str {
    if value.len() < ext.len() {
        return value;
    }
    let split = value.len() - ext.len();
    match value.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(ext) => &value[..split],
        _ => value,
    }
}

fn composer_entry(record: &ComposerRecord, files: &[CorpusPath]) -> ReferenceEntry {
    let mut entry = ReferenceEntry::new(record.name, record.directory);

    for path in matcher::match_composer(files, record.directory) {
        let (format, ext) = match path.format_ext() {
            Some((Some(format), ext)) => (format, ext),
            _ => {
                debug!("Skipping unclassified corpus file: {}", path);
                continue;
            }
        };
        let index = match matcher::composer_segment(&path, record.directory) {
            Some(index) => index,
            None => continue,
        };

        let segments = path.segments();
        let stub = if index + 1 < segments.len() {
            &segments[index + 1..]
        } else {
            &segments[segments.len() - 1..]
        };

        let work_stub = strip_extension(&stub[0], &ext).to_string();
        let file_name = path.file_name().to_string();
        let corpus_path = std::iter::once(record.directory)
            .chain(stub.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("/");

        let file_record = FileRecord {
            format,
            ext: ext.clone(),
            corpus_path,
            title: stub_title(strip_extension(&file_name, &ext)),
            file_name,
            url: None,
        };

        entry
            .works
            .entry(work_stub)
            .or_insert_with_key(|stub| WorkReference {
                title: stub_title(stub),
                is_virtual: false,
                files: Vec::new(),
            })
            .files
            .push(file_record);
    }

    entry
}

fn fold_virtual_work(entries: &mut Vec<ReferenceEntry>, work: &VirtualWork) {
    let composer_dir = work.composer_dir();
    let index = match entries
        .iter()
        .position(|e| e.composer == work.composer || e.composer_dir == composer_dir)
    {
        Some(index) => index,
        None => {
            entries.push(ReferenceEntry::new(&work.composer, composer_dir));
            entries.len() - 1
        }
    };

    let prefix = format!("{}/", composer_dir);
    let work_stub = work
        .corpus_path
        .strip_prefix(&prefix)
        .unwrap_or(&work.corpus_path)
        .to_string();

    let files = work
        .urls
        .iter()
        .filter_map(|url| {
            let (format, ext) = find_format_url(url)?;
            let file_name = CorpusPath::from_url(&work.corpus_path, url)
                .file_name()
                .to_string();
            Some(FileRecord {
                format,
                ext,
                corpus_path: work.corpus_path.clone(),
                file_name,
                title: work.title.clone(),
                url: Some(url.clone()),
            })
        })
        .collect();

    entries[index].works.insert(
        work_stub,
        WorkReference {
            title: work.title.clone(),
            is_virtual: true,
            files,
        },
    );
}

fn sort_references(entries: &mut [ReferenceEntry]) {
    for entry in entries.iter_mut() {
        let mut keys: Vec<(&String, &String)> = entry
            .works
            .iter()
            .map(|(stub, work)| (&work.title, stub))
            .collect();
        keys.sort();
        entry.sorted_work_keys = Some(keys.into_iter().map(|(_, stub)| stub.clone()).collect());
    }
    entries.sort_by(|a, b| a.composer_dir.cmp(&b.composer_dir));
}

impl Corpus {
    /// Reference entries for every composer plus the virtual works
    pub fn build_references(&self, sort: bool) -> Result<Vec<ReferenceEntry>> {
        let extensions = ExtensionSet::all();
        let mut files = Vec::new();
        for domain in FILE_DOMAINS {
            files.extend(self.listing_or_empty(domain, &extensions)?.iter().cloned());
        }

        let mut entries: Vec<ReferenceEntry> = COMPOSERS
            .iter()
            .map(|record| composer_entry(record, &files))
            .collect();

        for work in VIRTUAL_WORKS.iter() {
            fold_virtual_work(&mut entries, work);
        }

        if sort {
            sort_references(&mut entries);
        }

        info!(
            "Built references: {} composers, {} works",
            entries.len(),
            entries.iter().map(|e| e.works.len()).sum::<usize>()
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_camel_case() {
        assert_eq!(space_camel_case("thisIsATest"), "this Is A Test");
        assert_eq!(space_camel_case("ThisIsATest"), "This Is A Test");
        assert_eq!(space_camel_case("movement3"), "movement 3");
        assert_eq!(space_camel_case("opus41no1"), "opus 41no1");
        assert_eq!(space_camel_case("opus23402no219235"), "opus 23402no219235");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("opus 18no1"), "Opus 18No1");
        assert_eq!(title_case("la Donna E Mobile"), "La Donna E Mobile");
        assert_eq!(stub_title("movement1-01"), "Movement 1-01");
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("bwv66.6.mxl", ".mxl"), "bwv66.6");
        assert_eq!(strip_extension("Gloria.MXL", ".mxl"), "Gloria");
        assert_eq!(strip_extension("opus18no1", ".mxl"), "opus18no1");
    }

    #[test]
    fn test_virtual_fold_into_existing_composer() {
        let mut entries = vec![ReferenceEntry::new("Johann Sebastian Bach", "bach")];
        let work = VirtualWork::new(
            "Johann Sebastian Bach",
            "Invention",
            "bach/bwv772",
            &["http://example.org/inven01.krn"],
        );
        fold_virtual_work(&mut entries, &work);

        assert_eq!(entries.len(), 1);
        let folded = &entries[0].works["bwv772"];
        assert!(folded.is_virtual);
        assert_eq!(folded.files[0].url.as_deref(), Some("http://example.org/inven01.krn"));
        assert_eq!(folded.files[0].format, Format::Humdrum);
    }

    #[test]
    fn test_virtual_fold_creates_new_composer() {
        let mut entries = vec![ReferenceEntry::new("Johann Sebastian Bach", "bach")];
        let work = VirtualWork::new(
            "John Coltrane",
            "Giant Steps",
            "coltrane/giantSteps",
            &["http://example.org/musicxml.mxl"],
        );
        fold_virtual_work(&mut entries, &work);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].composer_dir, "coltrane");
        assert!(entries[1].works.contains_key("giantSteps"));
    }

    #[test]
    fn test_sort_orders_works_by_title_then_stub() {
        let mut entry = ReferenceEntry::new("X", "x");
        for (stub, title) in [("b", "Alpha"), ("a", "Beta"), ("c", "Alpha")] {
            entry.works.insert(
                stub.to_string(),
                WorkReference {
                    title: title.to_string(),
                    is_virtual: false,
                    files: Vec::new(),
                },
            );
        }
        let mut entries = vec![ReferenceEntry::new("Z", "zeta"), entry];
        sort_references(&mut entries);

        assert_eq!(entries[0].composer_dir, "x");
        assert_eq!(
            entries[0].sorted_work_keys.as_deref(),
            Some(&["b".to_string(), "c".to_string(), "a".to_string()][..])
        );
        let order: Vec<&str> = entries[0].ordered_works().into_iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }
}
