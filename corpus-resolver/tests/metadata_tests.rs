//! Metadata bundles: building, storing and searching

mod helpers;

use corpus_resolver::{Domain, ExtensionSet, MetadataField};
use helpers::{touch, FixtureCorpus};

#[test]
fn test_search_by_composer() {
    let fixture = FixtureCorpus::new();
    let corpus = fixture.corpus();

    let found = corpus
        .search("beethoven", Some(MetadataField::Composer), &[Domain::Core], None)
        .unwrap();
    assert_eq!(found.len(), 8);

    let krn = ExtensionSet::expand(Some(&["krn"][..]), true);
    let kern_only = corpus
        .search("beethoven", Some(MetadataField::Composer), &[Domain::Core], Some(&krn))
        .unwrap();
    assert_eq!(kern_only.len(), 4);
    assert!(kern_only.iter().all(|p| p.file_name().ends_with(".krn")));
}

#[test]
fn test_search_any_field_across_domains() {
    let fixture = FixtureCorpus::new();
    let corpus = fixture.corpus();

    let found = corpus
        .search("giant steps", None, &Domain::ALL, None)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].domain(), Domain::Virtual);

    let titles = corpus
        .search("donna", Some(MetadataField::Title), &[Domain::Core], None)
        .unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].file_name(), "laDonnaEMobile.mxl");
}

#[test]
fn test_search_results_are_ordered() {
    let fixture = FixtureCorpus::new();
    let corpus = fixture.corpus();

    let found = corpus
        .search("musicxml", Some(MetadataField::Format), &[Domain::Core], None)
        .unwrap();
    assert!(!found.is_empty());
    let mut sorted = found.clone();
    sorted.sort();
    assert_eq!(found, sorted);
}

#[test]
fn test_rebuild_writes_bundle() {
    let fixture = FixtureCorpus::new();
    let corpus = fixture.corpus_with_metadata();

    let count = corpus.rebuild_metadata(&[Domain::Core, Domain::Virtual]).unwrap();
    assert!(count > 0);

    let dir = fixture.scratch.path().join("metadata");
    assert!(dir.join("core.json").exists());
    assert!(dir.join("virtual.json").exists());

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("core.json")).unwrap()).unwrap();
    assert_eq!(stored["domain"], "core");
}

#[test]
fn test_stored_bundle_used_by_new_corpus() {
    let fixture = FixtureCorpus::new();
    fixture.corpus_with_metadata().rebuild_metadata(&[Domain::Core]).unwrap();

    // Files added after the rebuild are not visible until the next rebuild
    touch(fixture.root(), "beethoven/opus59no1/movement1.krn");
    let corpus = fixture.corpus_with_metadata();
    let found = corpus
        .search("beethoven", Some(MetadataField::Composer), &[Domain::Core], None)
        .unwrap();
    assert_eq!(found.len(), 8);

    corpus.rebuild_metadata(&[Domain::Core]).unwrap();
    let found = corpus
        .search("beethoven", Some(MetadataField::Composer), &[Domain::Core], None)
        .unwrap();
    assert_eq!(found.len(), 9);
}

#[test]
fn test_add_path_invalidates_local_metadata() {
    let fixture = FixtureCorpus::new();
    let corpus = fixture.corpus();
    let local = fixture.scratch.path().join("local");
    touch(&local, "haydn/opus1/movement1.krn");

    let before = corpus
        .search("haydn", Some(MetadataField::Composer), &[Domain::Local], None)
        .unwrap();
    assert!(before.is_empty());

    corpus.add_path(&local).unwrap();
    let after = corpus
        .search("haydn", Some(MetadataField::Composer), &[Domain::Local], None)
        .unwrap();
    assert_eq!(after.len(), 1);
}

#[test]
fn test_invalidate_drops_deleted_files_from_search() {
    let fixture = FixtureCorpus::new();
    let corpus = fixture.corpus_with_metadata();
    corpus.rebuild_metadata(&[Domain::Core]).unwrap();

    let before = corpus
        .search("bwv66.6", Some(MetadataField::CorpusPath), &[Domain::Core], None)
        .unwrap();
    assert_eq!(before.len(), 1);

    std::fs::remove_file(fixture.root().join("bach").join("bwv66.6.mxl")).unwrap();
    corpus.invalidate(Domain::Core);

    let after = corpus
        .search("bwv66.6", Some(MetadataField::CorpusPath), &[Domain::Core], None)
        .unwrap();
    assert!(after.is_empty());
}
