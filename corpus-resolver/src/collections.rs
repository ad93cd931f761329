//! Named collections
//!
//! Fixed file tables for well-known groups of works in the core corpus,
//! plus the Beethoven string quartets assembled from work lists. Entries
//! absent from the installed corpus are skipped with a debug log.

use crate::corpus::Corpus;
use crate::domain::{CorpusPath, Domain};
use crate::error::{Error, Result};
use crate::extensions::ExtensionSet;
use crate::identifier::WorkIdentifier;
use corpus_common::Error as CommonError;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Chorale files below the `bach` directory
pub const BACH_CHORALES: &[&str] = &[
    "bwv1.6.mxl", "bwv10.7.mxl", "bwv101.7.mxl", "bwv102.7.mxl", "bwv103.6.mxl",
    "bwv104.6.mxl", "bwv108.6.mxl", "bwv11.6.mxl", "bwv110.7.mxl", "bwv111.6.mxl",
    "bwv112.5-sc.mxl", "bwv112.5.mxl", "bwv113.8.mxl", "bwv114.7.mxl",
    "bwv115.6.mxl", "bwv116.6.mxl", "bwv117.4.mxl", "bwv119.9.mxl", "bwv12.7.mxl",
    "bwv120.6.mxl", "bwv120.8-a.mxl", "bwv121.6.mxl", "bwv122.6.mxl", "bwv123.6.mxl",
    "bwv124.6.mxl", "bwv125.6.mxl", "bwv126.6.mxl", "bwv127.5.mxl", "bwv128.5.mxl",
    "bwv13.6.mxl", "bwv130.6.mxl", "bwv133.6.mxl", "bwv135.6.mxl", "bwv136.6.mxl",
    "bwv137.5.mxl", "bwv139.6.mxl", "bwv14.5.mxl", "bwv140.7.mxl", "bwv144.3.mxl",
    "bwv144.6.mxl", "bwv145-a.mxl", "bwv145.5.mxl", "bwv146.8.mxl", "bwv148.6.mxl",
    "bwv149.7.mxl", "bwv151.5.mxl", "bwv153.1.mxl", "bwv153.5.mxl", "bwv153.9.mxl",
    "bwv154.3.mxl", "bwv154.8.mxl", "bwv155.5.mxl", "bwv156.6.mxl", "bwv157.5.mxl",
    "bwv158.4.mxl", "bwv159.5.mxl", "bwv16.6.mxl", "bwv161.6.mxl",
    "bwv162.6-lpz.mxl", "bwv164.6.mxl", "bwv165.6.mxl", "bwv166.6.mxl",
    "bwv168.6.mxl", "bwv169.7.mxl", "bwv17.7.mxl", "bwv171.6.mxl", "bwv172.6.mxl",
    "bwv174.5.mxl", "bwv175.7.mxl", "bwv176.6.mxl", "bwv177.5.mxl", "bwv178.7.mxl",
    "bwv179.6.mxl", "bwv18.5-lz.mxl", "bwv18.5-w.mxl", "bwv180.7.mxl",
    "bwv183.5.mxl", "bwv184.5.mxl", "bwv185.6.mxl", "bwv187.7.mxl", "bwv188.6.mxl",
    "bwv19.7.mxl", "bwv190.7-inst.mxl", "bwv190.7.mxl", "bwv194.12.mxl",
    "bwv194.6.mxl", "bwv195.6.mxl", "bwv197.10.mxl", "bwv197.5.mxl",
    "bwv197.7-a.mxl", "bwv2.6.mxl", "bwv20.11.mxl", "bwv20.7.mxl", "bwv226.2.mxl",
    "bwv227.1.mxl", "bwv227.11.mxl", "bwv227.3.mxl", "bwv227.7.mxl", "bwv229.2.mxl",
    "bwv244.10.mxl", "bwv244.15.mxl", "bwv244.17.mxl", "bwv244.25.mxl",
    "bwv244.29-a.mxl", "bwv244.3.mxl", "bwv244.32.mxl", "bwv244.37.mxl",
    "bwv244.40.mxl", "bwv244.44.mxl", "bwv244.46.mxl", "bwv244.54.mxl",
    "bwv244.62.mxl", "bwv245.11.mxl", "bwv245.14.mxl", "bwv245.15.mxl",
    "bwv245.17.mxl", "bwv245.22.mxl", "bwv245.26.mxl", "bwv245.28.mxl",
    "bwv245.3.mxl", "bwv245.37.mxl", "bwv245.40.mxl", "bwv245.5.mxl",
    "bwv248.12-2.mxl", "bwv248.17.mxl", "bwv248.23-2.mxl", "bwv248.23-s.mxl",
    "bwv248.28.mxl", "bwv248.33-3.mxl", "bwv248.35-3.mxl", "bwv248.35-3c.mxl",
    "bwv248.42-4.mxl", "bwv248.42-s.mxl", "bwv248.46-5.mxl", "bwv248.5.mxl",
    "bwv248.53-5.mxl", "bwv248.59-6.mxl", "bwv248.64-6.mxl", "bwv248.64-s.mxl",
    "bwv248.9-1.mxl", "bwv248.9-s.mxl", "bwv25.6.mxl", "bwv250.mxl", "bwv251.mxl",
    "bwv252.mxl", "bwv253.mxl", "bwv254.mxl", "bwv255.mxl", "bwv256.mxl",
    "bwv257.mxl", "bwv258.mxl", "bwv259.mxl", "bwv26.6.mxl", "bwv260.mxl",
    "bwv261.mxl", "bwv262.mxl", "bwv263.mxl", "bwv264.mxl", "bwv265.mxl",
    "bwv266.mxl", "bwv267.mxl", "bwv268.mxl", "bwv269.mxl", "bwv27.6.mxl",
    "bwv270.mxl", "bwv271.mxl", "bwv272.mxl", "bwv273.mxl", "bwv276.mxl",
    "bwv277.krn", "bwv277.mxl", "bwv278.mxl", "bwv279.mxl", "bwv28.6.mxl",
    "bwv280.mxl", "bwv281.krn", "bwv281.mxl", "bwv282.mxl", "bwv283.mxl",
    "bwv284.mxl", "bwv285.mxl", "bwv286.mxl", "bwv287.mxl", "bwv288.mxl",
    "bwv289.mxl", "bwv29.8.mxl", "bwv290.mxl", "bwv291.mxl", "bwv292.mxl",
    "bwv293.mxl", "bwv294.mxl", "bwv295.mxl", "bwv296.mxl", "bwv297.mxl",
    "bwv298.mxl", "bwv299.mxl", "bwv3.6.mxl", "bwv30.6.mxl", "bwv300.mxl",
    "bwv301.mxl", "bwv302.mxl", "bwv303.mxl", "bwv304.mxl", "bwv305.mxl",
    "bwv306.mxl", "bwv307.mxl", "bwv308.mxl", "bwv309.mxl", "bwv31.9.mxl",
    "bwv310.mxl", "bwv311.mxl", "bwv312.mxl", "bwv313.mxl", "bwv314.mxl",
    "bwv315.mxl", "bwv316.mxl", "bwv317.mxl", "bwv318.mxl", "bwv319.mxl",
    "bwv32.6.mxl", "bwv320.mxl", "bwv321.mxl", "bwv322.mxl", "bwv323.mxl",
    "bwv324.mxl", "bwv325.mxl", "bwv326.mxl", "bwv327.mxl", "bwv328.mxl",
    "bwv329.mxl", "bwv33.6.mxl", "bwv330.mxl", "bwv331.mxl", "bwv332.mxl",
    "bwv333.mxl", "bwv334.mxl", "bwv335.mxl", "bwv336.mxl", "bwv337.mxl",
    "bwv338.mxl", "bwv339.mxl", "bwv340.mxl", "bwv341.mxl", "bwv342.mxl",
    "bwv343.mxl", "bwv344.mxl", "bwv345.mxl", "bwv346.mxl", "bwv347.mxl",
    "bwv348.mxl", "bwv349.mxl", "bwv350.mxl", "bwv351.mxl", "bwv352.mxl",
    "bwv353.mxl", "bwv354.mxl", "bwv355.mxl", "bwv356.mxl", "bwv357.mxl",
    "bwv358.mxl", "bwv359.mxl", "bwv36.4-2.mxl", "bwv36.8-2.mxl", "bwv360.mxl",
    "bwv361.mxl", "bwv362.mxl", "bwv363.mxl", "bwv364.mxl", "bwv365.mxl",
    "bwv366.krn", "bwv366.mxl", "bwv367.mxl", "bwv368.mxl", "bwv369.mxl",
    "bwv37.6.mxl", "bwv370.mxl", "bwv371.mxl", "bwv372.mxl", "bwv373.mxl",
    "bwv374.mxl", "bwv375.mxl", "bwv376.mxl", "bwv377.mxl", "bwv378.mxl",
    "bwv379.mxl", "bwv38.6.mxl", "bwv380.mxl", "bwv381.mxl", "bwv382.mxl",
    "bwv383.mxl", "bwv384.mxl", "bwv385.mxl", "bwv386.mxl", "bwv387.mxl",
    "bwv388.mxl", "bwv389.mxl", "bwv39.7.mxl", "bwv390.mxl", "bwv391.mxl",
    "bwv392.mxl", "bwv393.mxl", "bwv394.mxl", "bwv395.mxl", "bwv396.mxl",
    "bwv397.mxl", "bwv398.mxl", "bwv399.mxl", "bwv4.8.mxl", "bwv40.3.mxl",
    "bwv40.6.mxl", "bwv40.8.mxl", "bwv400.mxl", "bwv401.mxl", "bwv402.mxl",
    "bwv403.mxl", "bwv404.mxl", "bwv405.mxl", "bwv406.mxl", "bwv407.mxl",
    "bwv408.mxl", "bwv41.6.mxl", "bwv410.mxl", "bwv411.mxl", "bwv412.mxl",
    "bwv413.mxl", "bwv414.mxl", "bwv415.mxl", "bwv416.mxl", "bwv417.mxl",
    "bwv418.mxl", "bwv419.mxl", "bwv42.7.mxl", "bwv420.mxl", "bwv421.mxl",
    "bwv422.mxl", "bwv423.mxl", "bwv424.mxl", "bwv425.mxl", "bwv426.mxl",
    "bwv427.mxl", "bwv428.mxl", "bwv429.mxl", "bwv43.11.mxl", "bwv430.mxl",
    "bwv431.mxl", "bwv432.mxl", "bwv433.mxl", "bwv434.mxl", "bwv435.mxl",
    "bwv436.mxl", "bwv437.mxl", "bwv438.mxl", "bwv44.7.mxl", "bwv45.7.mxl",
    "bwv47.5.mxl", "bwv48.3.mxl", "bwv48.7.mxl", "bwv5.7.mxl", "bwv52.6.mxl",
    "bwv55.5.mxl", "bwv56.5.mxl", "bwv57.8.mxl", "bwv59.3.mxl", "bwv6.6.mxl",
    "bwv60.5.mxl", "bwv64.2.mxl", "bwv64.4.mxl", "bwv64.8.mxl", "bwv65.2.mxl",
    "bwv65.7.mxl", "bwv66.6.mxl", "bwv67.4.mxl", "bwv67.7.mxl", "bwv69.6-a.mxl",
    "bwv69.6.mxl", "bwv7.7.mxl", "bwv70.11.mxl", "bwv70.7.mxl", "bwv72.6.mxl",
    "bwv73.5.mxl", "bwv74.8.mxl", "bwv77.6.mxl", "bwv78.7.mxl", "bwv79.3.mxl",
    "bwv79.6.mxl", "bwv8.6.mxl", "bwv80.8.mxl", "bwv81.7.mxl", "bwv83.5.mxl",
    "bwv84.5.mxl", "bwv85.6.mxl", "bwv86.6.mxl", "bwv87.7.mxl", "bwv88.7.mxl",
    "bwv89.6.mxl", "bwv9.7.mxl", "bwv90.5.mxl", "bwv91.6.mxl", "bwv92.9.mxl",
    "bwv93.7.mxl", "bwv94.8.mxl", "bwv95.7.mxl", "bwv96.6.mxl", "bwv97.9.mxl",
    "bwv99.6.mxl",
];

/// Movement files below `handel/hwv56`
pub const HANDEL_MESSIAH: &[&str] = &[
    "movement1-01.md", "movement1-02.md", "movement1-03.md", "movement1-04.md",
    "movement1-05.md", "movement1-07.md", "movement1-08.md", "movement1-09.md",
    "movement1-10.md", "movement1-11.md", "movement1-12.md", "movement1-13.md",
    "movement1-15.md", "movement1-17.md", "movement1-18.md", "movement1-19.md",
    "movement1-23.md", "movement2-01.md", "movement2-03.md", "movement2-04.md",
    "movement2-05.md", "movement2-06.md", "movement2-07.md", "movement2-08.md",
    "movement2-09.md", "movement2-10.md", "movement2-11.md", "movement2-12.md",
    "movement2-13.md", "movement2-15.md", "movement2-18.md", "movement2-19.md",
    "movement2-21.md", "movement3-01.md", "movement3-02.md", "movement3-03.md",
    "movement3-04.md", "movement3-05.md", "movement3-07.md", "movement3-08.md",
    "movement3-09.md", "movement3-10.md",
];

/// Madrigal files below the `monteverdi` directory
pub const MONTEVERDI_MADRIGALS: &[&str] = &[
    "madrigal.3.1.mxl", "madrigal.3.2.mxl", "madrigal.3.3.mxl", "madrigal.3.4.mxl",
    "madrigal.3.5.mxl", "madrigal.3.6.mxl", "madrigal.3.7.mxl", "madrigal.3.8.mxl",
    "madrigal.3.9.mxl", "madrigal.3.10.mxl", "madrigal.3.11.mxl",
    "madrigal.3.12.mxl", "madrigal.3.13.mxl", "madrigal.3.14.mxl",
    "madrigal.3.15.mxl", "madrigal.3.16.mxl", "madrigal.3.17.mxl",
    "madrigal.3.18.mxl", "madrigal.3.19.mxl", "madrigal.3.20.mxl",
    "madrigal.4.1.mxl", "madrigal.4.2.mxl", "madrigal.4.3.mxl", "madrigal.4.4.mxl",
    "madrigal.4.5.mxl", "madrigal.4.6.mxl", "madrigal.4.7.mxl", "madrigal.4.8.mxl",
    "madrigal.4.9.mxl", "madrigal.4.10.mxl", "madrigal.4.11.mxl",
    "madrigal.4.12.mxl", "madrigal.4.13.mxl", "madrigal.4.14.mxl",
    "madrigal.4.15.mxl", "madrigal.4.16.mxl", "madrigal.4.17.mxl",
    "madrigal.4.18.mxl", "madrigal.4.19.mxl", "madrigal.4.20.mxl",
    "madrigal.5.1.mxl", "madrigal.5.2.mxl", "madrigal.5.3.mxl", "madrigal.5.5.mxl",
    "madrigal.5.6.mxl", "madrigal.5.7.mxl", "madrigal.5.8.mxl",
];

/// Quartet works below the `beethoven` directory
pub const BEETHOVEN_STRING_QUARTETS: &[&str] = &[
    "opus18no1", "opus18no3", "opus18no4", "opus18no5", "opus59no1", "opus59no2",
    "opus59no3", "opus74", "opus132", "opus133",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedCollection {
    BachChorales,
    HandelMessiah,
    MonteverdiMadrigals,
    BeethovenStringQuartets,
}

impl NamedCollection {
    pub const ALL: [NamedCollection; 4] = [
        NamedCollection::BachChorales,
        NamedCollection::HandelMessiah,
        NamedCollection::MonteverdiMadrigals,
        NamedCollection::BeethovenStringQuartets,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NamedCollection::BachChorales => "bach-chorales",
            NamedCollection::HandelMessiah => "handel-messiah",
            NamedCollection::MonteverdiMadrigals => "monteverdi-madrigals",
            NamedCollection::BeethovenStringQuartets => "beethoven-string-quartets",
        }
    }

    /// Extensions searched when the caller asks for none; `None` means all
    pub fn default_extensions(self) -> Option<ExtensionSet> {
        let token = match self {
            NamedCollection::BachChorales | NamedCollection::MonteverdiMadrigals => "xml",
            NamedCollection::HandelMessiah => "md",
            NamedCollection::BeethovenStringQuartets => return None,
        };
        Some(ExtensionSet::expand(Some(&[token][..]), true))
    }
}

impl fmt::Display for NamedCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamedCollection {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        NamedCollection::ALL
            .into_iter()
            .find(|collection| collection.as_str() == wanted)
            .ok_or_else(|| CommonError::InvalidInput(format!("Unknown collection: {}", s)))
    }
}

/// `name` with a trailing `.mxl` swapped for `.xml`
fn uncompressed_name(name: &str) -> Option<String> {
    name.strip_suffix(".mxl").map(|stem| format!("{}.xml", stem))
}

impl Corpus {
    /// Paths of a named collection, in table order
    pub fn collection(
        &self,
        collection: NamedCollection,
        extensions: Option<&ExtensionSet>,
    ) -> Result<Vec<CorpusPath>> {
        match collection {
            NamedCollection::BachChorales => {
                self.named_files(collection, "bach", None, BACH_CHORALES, extensions, true)
            }
            NamedCollection::HandelMessiah => self.named_files(
                collection,
                "handel",
                Some("hwv56"),
                HANDEL_MESSIAH,
                extensions,
                false,
            ),
            NamedCollection::MonteverdiMadrigals => self.named_files(
                collection,
                "monteverdi",
                None,
                MONTEVERDI_MADRIGALS,
                extensions,
                false,
            ),
            NamedCollection::BeethovenStringQuartets => self.beethoven_string_quartets(extensions),
        }
    }

    /// Core directory of `composer`, `None` when there is no core corpus
    fn collection_directory(&self, composer: &str) -> Result<Option<PathBuf>> {
        match self.composer_directory(composer) {
            Err(Error::DomainUnavailable { path, .. }) => {
                debug!("No core corpus at {}", path.display());
                Ok(None)
            }
            other => other,
        }
    }

    /// Look up each table name below the composer directory.
    ///
    /// With `xml_fallback`, a missing `.mxl` entry is replaced by its plain
    /// `.xml` document when that is listed.
    fn named_files(
        &self,
        collection: NamedCollection,
        composer: &str,
        subdirectory: Option<&str>,
        names: &[&str],
        extensions: Option<&ExtensionSet>,
        xml_fallback: bool,
    ) -> Result<Vec<CorpusPath>> {
        let mut dir = match self.collection_directory(composer)? {
            Some(dir) => dir,
            None => return Ok(Vec::new()),
        };
        if let Some(subdirectory) = subdirectory {
            dir.push(subdirectory);
        }

        let extensions = match extensions {
            Some(set) => set.clone(),
            None => collection
                .default_extensions()
                .unwrap_or_else(ExtensionSet::all),
        };
        let listing = self.listing(Domain::Core, &extensions)?;
        let by_file: HashMap<&Path, &CorpusPath> = listing
            .iter()
            .filter_map(|path| path.as_path().map(|file| (file, path)))
            .collect();

        let mut found = Vec::new();
        for name in names {
            let candidate = dir.join(name);
            if let Some(path) = by_file.get(candidate.as_path()) {
                found.push((*path).clone());
                continue;
            }
            if candidate.exists() {
                // Present but filtered out by the extension request
                continue;
            }

            let fallback = uncompressed_name(name)
                .filter(|_| xml_fallback)
                .map(|name| dir.join(name))
                .and_then(|file| by_file.get(file.as_path()).copied());
            match fallback {
                Some(path) => found.push(path.clone()),
                None => debug!("Corpus missing expected file path: {}", candidate.display()),
            }
        }

        debug!("{}: {} of {} files", collection, found.len(), names.len());
        Ok(found)
    }

    fn beethoven_string_quartets(
        &self,
        extensions: Option<&ExtensionSet>,
    ) -> Result<Vec<CorpusPath>> {
        let mut found = Vec::new();
        for work in BEETHOVEN_STRING_QUARTETS {
            let identifier = WorkIdentifier::from(["beethoven", *work]);
            for path in self.work_list(&identifier, None, extensions)? {
                match path.as_path() {
                    Some(file) if !file.exists() => {
                        debug!("Corpus missing expected file path: {}", file.display());
                    }
                    _ => found.push(path),
                }
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_have_no_duplicates() {
        for table in [BACH_CHORALES, HANDEL_MESSIAH, MONTEVERDI_MADRIGALS] {
            for (i, name) in table.iter().enumerate() {
                assert!(!table[i + 1..].contains(name), "duplicate {}", name);
            }
        }
    }

    #[test]
    fn test_collection_names() {
        for collection in NamedCollection::ALL {
            assert_eq!(collection.as_str().parse::<NamedCollection>().unwrap(), collection);
        }
        assert_eq!(
            "handel_messiah".parse::<NamedCollection>().unwrap(),
            NamedCollection::HandelMessiah
        );
        assert!("mahler-symphonies".parse::<NamedCollection>().is_err());
    }

    #[test]
    fn test_default_extensions() {
        let xml = NamedCollection::BachChorales.default_extensions().unwrap();
        assert!(xml.contains(".mxl"));
        assert!(NamedCollection::HandelMessiah
            .default_extensions()
            .unwrap()
            .contains(".md"));
        assert!(NamedCollection::BeethovenStringQuartets
            .default_extensions()
            .is_none());
    }

    #[test]
    fn test_uncompressed_name() {
        assert_eq!(uncompressed_name("bwv250.mxl").as_deref(), Some("bwv250.xml"));
        assert_eq!(uncompressed_name("bwv277.krn"), None);
    }
}
