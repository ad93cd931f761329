//! Identifier matcher
//!
//! Filters already-enumerated paths down to those denoting a work (and
//! optionally a movement). Matching is on whole segments: a request for
//! `verdi` never matches `monteverdi`. An empty result is not an error here.

use crate::domain::CorpusPath;
use crate::identifier::{Movement, WorkIdentifier};
use tracing::debug;

/// Drop the final dot group: `bwv66.6.mxl` -> `bwv66.6`
pub fn strip_last_dot_group(value: &str) -> Option<&str> {
    match value.rfind('.') {
        Some(dot) if dot > 0 => Some(&value[..dot]),
        _ => None,
    }
}

/// A path segment matches a lowercase component when equal to it, either
/// whole or with its last dot group removed
pub fn segment_matches(segment: &str, component: &str) -> bool {
    let segment = segment.to_lowercase();
    segment == component || strip_last_dot_group(&segment) == Some(component)
}

/// Index of the first segment where `components` align contiguously
fn find_alignment(segments: &[String], components: &[String]) -> Option<usize> {
    if components.is_empty() || components.len() > segments.len() {
        return None;
    }
    segments.windows(components.len()).position(|window| {
        window
            .iter()
            .zip(components)
            .all(|(segment, component)| segment_matches(segment, component))
    })
}

/// Whether the path contains the identifier's components as a contiguous
/// run of segments
pub fn matches_identifier(path: &CorpusPath, components: &[String]) -> bool {
    find_alignment(path.segments(), components).is_some()
}

/// Index of the segment naming `composer`, if any
pub fn composer_segment(path: &CorpusPath, composer: &str) -> Option<usize> {
    let composer = composer.to_lowercase();
    path.segments()
        .iter()
        .position(|segment| segment_matches(segment, &composer))
}

/// File stem before the first dot, lowercased
fn first_dot_stem(file_name: &str) -> Option<String> {
    file_name
        .split_once('.')
        .map(|(stem, _)| stem.to_lowercase())
}

/// Keep paths whose file name encodes `movement`.
///
/// Exact stem matches win; only when none exist are file names starting
/// with a movement token accepted.
pub fn filter_movement(paths: Vec<CorpusPath>, movement: &Movement) -> Vec<CorpusPath> {
    let candidates = movement.candidates();

    let direct: Vec<CorpusPath> = paths
        .iter()
        .filter(|path| match first_dot_stem(path.file_name()) {
            Some(stem) => candidates.iter().any(|c| *c == stem),
            None => false,
        })
        .cloned()
        .collect();
    if !direct.is_empty() {
        return direct;
    }

    paths
        .into_iter()
        .filter(|path| {
            let name = path.file_name().to_lowercase();
            candidates.iter().any(|c| name.starts_with(c.as_str()))
        })
        .collect()
}

/// Paths denoting `identifier` (and `movement`), sorted
pub fn match_work<'a, I>(
    paths: I,
    identifier: &WorkIdentifier,
    movement: Option<&Movement>,
) -> Vec<CorpusPath>
where
    I: IntoIterator<Item = &'a CorpusPath>,
{
    let components = identifier.components();
    let mut matched: Vec<CorpusPath> = paths
        .into_iter()
        .filter(|path| matches_identifier(path, &components))
        .cloned()
        .collect();

    if let Some(movement) = movement {
        matched = filter_movement(matched, movement);
    }

    matched.sort();
    matched.dedup();
    debug!(
        "Matched {} paths for '{}' (movement: {:?})",
        matched.len(),
        identifier,
        movement
    );
    matched
}

/// Paths with any segment naming `composer`, sorted
pub fn match_composer<'a, I>(paths: I, composer: &str) -> Vec<CorpusPath>
where
    I: IntoIterator<Item = &'a CorpusPath>,
{
    let mut matched: Vec<CorpusPath> = paths
        .into_iter()
        .filter(|path| composer_segment(path, composer).is_some())
        .cloned()
        .collect();
    matched.sort();
    matched.dedup();
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, Location};
    use std::path::PathBuf;

    fn path(relative: &str) -> CorpusPath {
        let root = PathBuf::from("/corpus");
        CorpusPath::from_file(Domain::Core, &root, root.join(relative))
    }

    fn fixture() -> Vec<CorpusPath> {
        [
            "beethoven/opus18no1/movement1.mxl",
            "beethoven/opus18no1/movement1.krn",
            "beethoven/opus18no1/movement2.mxl",
            "beethoven/opus18no1/movement2.krn",
            "handel/hwv56/movement1-01.md",
            "handel/hwv56/movement1-02.md",
            "handel/hwv56/movement2-01.md",
            "monteverdi/madrigal.3.1.mxl",
            "verdi/laDonnaEMobile.mxl",
            "luca/gloria.mxl",
        ]
        .iter()
        .map(|p| path(p))
        .collect()
    }

    #[test]
    fn test_strip_last_dot_group() {
        assert_eq!(strip_last_dot_group("bwv66.6.mxl"), Some("bwv66.6"));
        assert_eq!(strip_last_dot_group("opus18no1"), None);
        assert_eq!(strip_last_dot_group(".hidden"), None);
    }

    #[test]
    fn test_full_segment_match_only() {
        let paths = fixture();
        let verdi = match_composer(&paths, "verdi");
        assert_eq!(verdi.len(), 1);
        assert!(verdi.iter().all(|p| !p.corpus_path().contains("monteverdi")));
    }

    #[test]
    fn test_identifier_crossing_segments() {
        let paths = fixture();
        let found = match_work(&paths, &WorkIdentifier::from("beethoven/opus18no1"), None);
        assert_eq!(found.len(), 4);

        let none = match_work(&paths, &WorkIdentifier::from("opus18no1/beethoven"), None);
        assert!(none.is_empty());

        let partial = match_work(&paths, &WorkIdentifier::from("beeth"), None);
        assert!(partial.is_empty());
    }

    #[test]
    fn test_file_stem_matches_without_extension() {
        let paths = fixture();
        let found = match_work(&paths, &WorkIdentifier::from("luca/gloria"), None);
        assert_eq!(found.len(), 1);

        let dotted = match_work(&paths, &WorkIdentifier::from("madrigal.3.1"), None);
        assert_eq!(dotted.len(), 1);
    }

    #[test]
    fn test_movement_direct_match() {
        let paths = fixture();
        let found = match_work(
            &paths,
            &WorkIdentifier::from("beethoven/opus18no1"),
            Some(&Movement::Number(1)),
        );
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_movement_equivalent_shapes() {
        let paths = fixture();
        let ident = WorkIdentifier::from("handel/hwv56");
        let by_text = match_work(&paths, &ident, Some(&Movement::from("1-02")));
        let by_pair = match_work(&paths, &ident, Some(&Movement::Pair(1, 2)));
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text, by_pair);

        let second = match_work(&paths, &ident, Some(&Movement::Pair(2, 1)));
        assert_eq!(second.len(), 1);
        assert!(second[0].file_name().starts_with("movement2-01"));
    }

    #[test]
    fn test_movement_partial_fallback() {
        let paths = fixture();
        let found = match_work(
            &paths,
            &WorkIdentifier::from("handel/hwv56"),
            Some(&Movement::Number(1)),
        );
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_results_are_sorted() {
        let mut paths = fixture();
        paths.reverse();
        let found = match_work(&paths, &WorkIdentifier::from("beethoven"), None);
        let mut sorted = found.clone();
        sorted.sort();
        assert_eq!(found, sorted);
    }

    #[test]
    fn test_url_paths_match_on_corpus_segments() {
        let url = CorpusPath::new(
            Domain::Virtual,
            vec!["bach".into(), "bwv772".into()],
            Location::Url("http://example.org/inven01.krn".into()),
        );
        let found = match_work([&url], &WorkIdentifier::from("bach/bwv772"), None);
        assert_eq!(found.len(), 1);
    }
}
