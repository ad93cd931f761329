//! Extension policy
//!
//! Maps a requested format or extension token to every file extension that
//! denotes the same logical format. A MusicXML request, for example, also
//! matches compressed `.mxl` containers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Readable score formats, in the order their extensions appear in the
/// universal extension set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Abc,
    Lilypond,
    Midi,
    MusicXml,
    MuseData,
    Humdrum,
    RomanText,
    NoteworthyText,
    Noteworthy,
}

impl Format {
    pub const ALL: [Format; 9] = [
        Format::Abc,
        Format::Lilypond,
        Format::Midi,
        Format::MusicXml,
        Format::MuseData,
        Format::Humdrum,
        Format::RomanText,
        Format::NoteworthyText,
        Format::Noteworthy,
    ];

    /// Extensions for this format; the first is the canonical one
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Abc => &[".abc"],
            Format::Lilypond => &[".ly", ".lily"],
            Format::Midi => &[".mid", ".midi"],
            Format::MusicXml => &[".xml", ".mxl", ".mx"],
            Format::MuseData => &[".md", ".musedata", ".zip"],
            Format::Humdrum => &[".krn"],
            Format::RomanText => &[".rntxt", ".rntext", ".romantext", ".rtxt"],
            Format::NoteworthyText => &[".nwctxt"],
            Format::Noteworthy => &[".nwc"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Abc => "abc",
            Format::Lilypond => "lilypond",
            Format::Midi => "midi",
            Format::MusicXml => "musicxml",
            Format::MuseData => "musedata",
            Format::Humdrum => "humdrum",
            Format::RomanText => "romantext",
            Format::NoteworthyText => "noteworthytext",
            Format::Noteworthy => "noteworthy",
        }
    }

    /// Find the format owning a dot-prefixed, lowercase extension
    pub fn from_extension(ext: &str) -> Option<Format> {
        Format::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext))
    }

    /// Interpret a request token: an extension (with or without dot, any
    /// case) or a format name such as `musicxml` or `kern`
    pub fn from_token(token: &str) -> Option<Format> {
        let lower = token.trim().trim_start_matches('.').to_lowercase();
        match lower.as_str() {
            "abc" => Some(Format::Abc),
            "lily" | "lilypond" | "ly" => Some(Format::Lilypond),
            "midi" | "mid" => Some(Format::Midi),
            "musicxml" | "xml" | "mxl" | "mx" => Some(Format::MusicXml),
            "musedata" | "md" | "zip" => Some(Format::MuseData),
            "humdrum" | "kern" | "krn" => Some(Format::Humdrum),
            "romantext" | "rntxt" | "rntext" | "rtxt" => Some(Format::RomanText),
            "noteworthytext" | "nwctxt" => Some(Format::NoteworthyText),
            "noteworthy" | "nwc" => Some(Format::Noteworthy),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalise an extension token to lowercase with a leading dot
pub fn normalize_extension(token: &str) -> String {
    let trimmed = token.trim().to_lowercase();
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

/// Ordered, duplicate-free set of normalised extensions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionSet {
    extensions: Vec<String>,
}

impl ExtensionSet {
    /// Every extension of every known format
    pub fn all() -> Self {
        let mut set = Self { extensions: Vec::new() };
        for format in Format::ALL {
            for ext in format.extensions() {
                set.push(ext.to_string());
            }
        }
        set
    }

    /// Translate a request into the set of extensions to search.
    ///
    /// `None` (or an empty request) yields the universal set. With
    /// `expand_aliases`, each token is replaced by its whole format family;
    /// unknown tokens are kept as given.
    pub fn expand<S: AsRef<str>>(requested: Option<&[S]>, expand_aliases: bool) -> Self {
        let requested = match requested {
            Some(tokens) if !tokens.is_empty() => tokens,
            _ => return Self::all(),
        };

        let mut set = Self { extensions: Vec::new() };
        for token in requested {
            let token = token.as_ref();
            if expand_aliases {
                if let Some(format) = Format::from_token(token) {
                    for ext in format.extensions() {
                        set.push(ext.to_string());
                    }
                    continue;
                }
            }
            set.push(normalize_extension(token));
        }
        set
    }

    fn push(&mut self, ext: String) {
        if !self.extensions.contains(&ext) {
            self.extensions.push(ext);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.extensions
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    pub fn is_superset_of(&self, other: &ExtensionSet) -> bool {
        other.iter().all(|ext| self.contains(ext))
    }

    /// Whether a file name ends with one of the extensions
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }
}

/// Split a file name into its format and extension.
///
/// Only the final dot group is considered. Returns `None` when the name
/// has no extension at all; the format is `None` for unknown extensions.
pub fn find_format_file(file_name: &str) -> Option<(Option<Format>, String)> {
    let dot = file_name.rfind('.')?;
    if dot == 0 || dot + 1 == file_name.len() {
        return None;
    }
    let ext = file_name[dot..].to_lowercase();
    Some((Format::from_extension(&ext), ext))
}

/// Detect the format of a remote URL.
///
/// Kern-server style URLs carry the format in an `f=` query parameter;
/// otherwise the extension of the URL path decides.
pub fn find_format_url(url: &str) -> Option<(Format, String)> {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };

    if let Some(query) = query {
        for pair in query.split('&') {
            if let Some(value) = pair.strip_prefix("f=") {
                let format = Format::from_token(value)?;
                return Some((format, format.extensions()[0].to_string()));
            }
        }
    }

    let file_name = path.rsplit('/').next().unwrap_or(path);
    match find_format_file(file_name) {
        Some((Some(format), ext)) => Some((format, ext)),
        _ => None,
    }
}
