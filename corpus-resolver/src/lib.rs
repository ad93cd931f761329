//! corpus-resolver library
//!
//! Resolves work identifiers ("composer/collection/piece", optionally a
//! movement and a set of formats) to score files across three corpus
//! domains: the bundled core corpus, user-registered local directories and
//! remotely hosted virtual works.

pub mod archive;
pub mod collections;
pub mod composers;
pub mod corpus;
pub mod domain;
pub mod error;
pub mod extensions;
pub mod identifier;
pub mod matcher;
pub mod metadata;
pub mod references;
pub mod resolver;
pub mod source;
pub mod virtual_works;

pub use collections::NamedCollection;
pub use corpus::Corpus;
pub use domain::{CorpusPath, Domain, Location};
pub use error::{Error, Result};
pub use extensions::{ExtensionSet, Format};
pub use identifier::{Movement, WorkIdentifier};
pub use metadata::MetadataField;
pub use references::{FileRecord, ReferenceEntry, WorkReference};
pub use resolver::Resolution;
