//! Virtual works: corpus entries hosted remotely
//!
//! The registry is built once on first access and never mutated, so reads
//! need no synchronisation.

use crate::extensions::{find_format_url, ExtensionSet};
use once_cell::sync::Lazy;

/// A remotely hosted work and its candidate URLs, best first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualWork {
    pub composer: String,
    pub title: String,
    /// Unique partial corpus path, `/`-separated
    pub corpus_path: String,
    pub urls: Vec<String>,
}

impl VirtualWork {
    pub fn new(composer: &str, title: &str, corpus_path: &str, urls: &[&str]) -> Self {
        Self {
            composer: composer.to_string(),
            title: title.to_string(),
            corpus_path: corpus_path.to_string(),
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    /// First path segment of the corpus path
    pub fn composer_dir(&self) -> &str {
        self.corpus_path.split('/').next().unwrap_or(&self.corpus_path)
    }

    /// URLs whose detected extension is in `extensions`.
    ///
    /// Without an extension request only the preferred (first) URL is
    /// returned.
    pub fn urls_by_extension(&self, extensions: Option<&ExtensionSet>) -> Vec<String> {
        let extensions = match extensions {
            Some(set) => set,
            None => return self.urls.first().cloned().into_iter().collect(),
        };

        let mut found = Vec::new();
        for ext in extensions.iter() {
            for url in &self.urls {
                if let Some((_, url_ext)) = find_format_url(url) {
                    if url_ext == ext && !found.contains(url) {
                        found.push(url.clone());
                    }
                }
            }
        }
        found
    }
}

/// All virtual works, ordered by corpus path
pub static VIRTUAL_WORKS: Lazy<Vec<VirtualWork>> = Lazy::new(|| {
    let mut works = vec![
        VirtualWork::new(
            "Johann Sebastian Bach",
            "Prelude from Cello Suite No. 1 in G Major, BWV 1007",
            "bach/bwv1007/prelude",
            &[
                "http://kern.ccarh.org/cgi-bin/ksdata?l=cc/bach/cello&file=bwv1007-01.krn&f=xml",
                "http://kern.ccarh.org/cgi-bin/ksdata?l=cc/bach/cello&file=bwv1007-01.krn&f=kern",
            ],
        ),
        VirtualWork::new(
            "Johann Sebastian Bach",
            "Invention No. 1 in C Major, BWV 772",
            "bach/bwv772",
            &["http://kern.ccarh.org/cgi-bin/ksdata?l=osu/classical/bach/inventions&file=inven01.krn&f=xml"],
        ),
        VirtualWork::new(
            "Johann Sebastian Bach",
            "Invention No. 2 in C Minor, BWV 773",
            "bach/bwv773",
            &[
                "http://kern.ccarh.org/cgi-bin/ksdata?l=osu/classical/bach/inventions&file=inven02.krn&f=xml",
                "http://kern.ccarh.org/cgi-bin/ksdata?l=osu/classical/bach/inventions&file=inven02.krn&f=kern",
            ],
        ),
        VirtualWork::new(
            "John Coltrane",
            "Giant Steps",
            "coltrane/giantSteps",
            &["http://static.wikifonia.org/1164/musicxml.mxl"],
        ),
        VirtualWork::new(
            "Franz Schubert",
            "13 Variations on a Theme by Anselm Hüttenbrenner",
            "schubert/d576-1",
            &["http://kern.ccarh.org/cgi-bin/ksdata?l=cc/schubert/piano/d0576&file=d0576-06.krn&f=xml"],
        ),
        VirtualWork::new(
            "Franz Schubert",
            "13 Variations on a Theme by Anselm Hüttenbrenner",
            "schubert/d576-6",
            &["http://web.mit.edu/sadoian/Public/corpus/schubert576-6.xml"],
        ),
        VirtualWork::new(
            "Franz Schubert",
            "13 Variations on a Theme by Anselm Hüttenbrenner",
            "schubert/d576-6a",
            &["http://web.mit.edu/sadoian/Public/corpus/schubert576-6a.xml"],
        ),
        VirtualWork::new(
            "Franz Schubert",
            "13 Variations on a Theme by Anselm Hüttenbrenner",
            "schubert/d576-6b",
            &["http://web.mit.edu/sadoian/Public/corpus/schubert576-6b.xml"],
        ),
        VirtualWork::new(
            "Johann Pachelbel",
            "Canon in D Major",
            "pachelbel/canon",
            &["http://kern.ccarh.org/cgi-bin/ksdata?l=cc/pachelbel&file=canon.krn&f=xml"],
        ),
    ];
    works.sort_by(|a, b| a.corpus_path.cmp(&b.corpus_path));
    works
});
