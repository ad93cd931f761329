//! Composer registry
//!
//! Fixed, ordered table of the composer directories shipped in the core
//! corpus. Order is insertion order; the reference index keeps it for
//! unsorted output.

/// A composer directory and its display name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerRecord {
    pub directory: &'static str,
    pub name: &'static str,
}

const fn composer(directory: &'static str, name: &'static str) -> ComposerRecord {
    ComposerRecord { directory, name }
}

/// All composers (and collections) in the core corpus
pub static COMPOSERS: &[ComposerRecord] = &[
    composer("airdsAirs", "Aird's Airs"),
    composer("bach", "Johann Sebastian Bach"),
    composer("beethoven", "Ludwig van Beethoven"),
    composer("cpebach", "C.P.E. Bach"),
    composer("ciconia", "Johannes Ciconia"),
    composer("essenFolksong", "Essen Folksong Collection"),
    composer("handel", "George Frideric Handel"),
    composer("haydn", "Joseph Haydn"),
    composer("josquin", "Josquin des Prez"),
    composer("luca", "D. Luca"),
    composer("miscFolk", "Miscellaneous Folk"),
    composer("monteverdi", "Claudio Monteverdi"),
    composer("mozart", "Wolfgang Amadeus Mozart"),
    composer("oneills1850", "Oneill's 1850"),
    composer("ryansMammoth", "Ryan's Mammoth Collection"),
    composer("schoenberg", "Arnold Schoenberg"),
    composer("schumann", "Robert Schumann"),
];

/// Look up a composer by directory name (case-insensitive)
pub fn find_by_directory(directory: &str) -> Option<&'static ComposerRecord> {
    COMPOSERS
        .iter()
        .find(|record| record.directory.eq_ignore_ascii_case(directory))
}
