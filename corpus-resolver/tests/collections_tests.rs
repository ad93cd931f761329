//! Named collections looked up in the fixture corpus

mod helpers;

use corpus_resolver::{Corpus, ExtensionSet, NamedCollection};
use helpers::{touch, FixtureCorpus};

fn names(paths: &[corpus_resolver::CorpusPath]) -> Vec<&str> {
    paths.iter().map(|p| p.file_name()).collect()
}

#[test]
fn test_bach_chorales_default_to_musicxml() {
    let fixture = FixtureCorpus::new();
    touch(fixture.root(), "bach/bwv250.xml");
    touch(fixture.root(), "bach/bwv277.krn");
    let corpus = fixture.corpus();

    let chorales = corpus.collection(NamedCollection::BachChorales, None).unwrap();
    // bwv250 has no container, so its plain document stands in
    assert_eq!(names(&chorales), vec!["bwv250.xml", "bwv66.6.mxl"]);
}

#[test]
fn test_bach_chorales_by_extension() {
    let fixture = FixtureCorpus::new();
    touch(fixture.root(), "bach/bwv250.xml");
    touch(fixture.root(), "bach/bwv277.krn");
    let corpus = fixture.corpus();

    let krn = ExtensionSet::expand(Some(&["krn"][..]), true);
    let chorales = corpus
        .collection(NamedCollection::BachChorales, Some(&krn))
        .unwrap();
    assert_eq!(names(&chorales), vec!["bwv277.krn"]);
}

#[test]
fn test_handel_messiah_in_table_order() {
    let fixture = FixtureCorpus::new();
    let corpus = fixture.corpus();

    let messiah = corpus.collection(NamedCollection::HandelMessiah, None).unwrap();
    assert_eq!(
        names(&messiah),
        vec![
            "movement1-01.md",
            "movement1-02.md",
            "movement1-03.md",
            "movement2-01.md",
            "movement3-01.md",
        ]
    );
}

#[test]
fn test_monteverdi_madrigals() {
    let fixture = FixtureCorpus::new();
    let corpus = fixture.corpus();

    let madrigals = corpus
        .collection(NamedCollection::MonteverdiMadrigals, None)
        .unwrap();
    assert_eq!(names(&madrigals), vec!["madrigal.3.1.mxl", "madrigal.3.2.mxl"]);
}

#[test]
fn test_beethoven_string_quartets() {
    let fixture = FixtureCorpus::new();
    let corpus = fixture.corpus();

    let quartets = corpus
        .collection(NamedCollection::BeethovenStringQuartets, None)
        .unwrap();
    assert_eq!(quartets.len(), 8);

    let krn = ExtensionSet::expand(Some(&["krn"][..]), true);
    let kern = corpus
        .collection(NamedCollection::BeethovenStringQuartets, Some(&krn))
        .unwrap();
    assert_eq!(kern.len(), 4);
    assert!(kern.iter().all(|p| p.file_name().ends_with(".krn")));
}

#[test]
fn test_collections_empty_without_core_corpus() {
    let fixture = FixtureCorpus::new();
    let corpus = Corpus::new(fixture.scratch.path().join("no-core"), Vec::new());

    for collection in NamedCollection::ALL {
        assert!(corpus.collection(collection, None).unwrap().is_empty());
    }
}
