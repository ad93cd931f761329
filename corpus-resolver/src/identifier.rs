//! Work identifiers and movement specifiers
//!
//! Movements arrive in several shapes (`4`, `"1-02"`, `(2, 1)`). Every shape
//! is normalised into a `MovementToken` before comparison, so two specifiers
//! naming the same movement produce the same candidate file stems.

use crate::domain::split_segments;
use corpus_common::Error as CommonError;
use std::fmt;
use std::str::FromStr;

/// A work named either by a `/`-separated string or explicit components
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkIdentifier {
    Name(String),
    Components(Vec<String>),
}

impl WorkIdentifier {
    /// Lowercase, non-empty path components
    pub fn components(&self) -> Vec<String> {
        match self {
            WorkIdentifier::Name(name) => split_segments(name),
            WorkIdentifier::Components(parts) => parts
                .iter()
                .flat_map(|part| split_segments(part))
                .collect(),
        }
        .into_iter()
        .map(|c| c.to_lowercase())
        .collect()
    }

    /// Identifier as one `/`-joined string, original case
    pub fn joined(&self) -> String {
        match self {
            WorkIdentifier::Name(name) => name.clone(),
            WorkIdentifier::Components(parts) => parts.join("/"),
        }
    }

    /// Swap a trailing extension, e.g. `.xml` for `.mxl`.
    ///
    /// Returns `None` when the identifier does not end with `from`.
    pub fn with_extension_replaced(&self, from: &str, to: &str) -> Option<WorkIdentifier> {
        let joined = self.joined();
        let split = joined.len().checked_sub(from.len())?;
        match (joined.get(..split), joined.get(split..)) {
            (Some(stem), Some(tail)) if tail.eq_ignore_ascii_case(from) => {
                Some(WorkIdentifier::Name(format!("{}{}", stem, to)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for WorkIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl From<&str> for WorkIdentifier {
    fn from(name: &str) -> Self {
        WorkIdentifier::Name(name.to_string())
    }
}

impl From<String> for WorkIdentifier {
    fn from(name: String) -> Self {
        WorkIdentifier::Name(name)
    }
}

impl From<&[&str]> for WorkIdentifier {
    fn from(parts: &[&str]) -> Self {
        WorkIdentifier::Components(parts.iter().map(|p| p.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for WorkIdentifier {
    fn from(parts: [&str; N]) -> Self {
        WorkIdentifier::from(&parts[..])
    }
}

impl From<Vec<String>> for WorkIdentifier {
    fn from(parts: Vec<String>) -> Self {
        WorkIdentifier::Components(parts)
    }
}

/// Request-side movement specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Movement {
    Number(u32),
    Text(String),
    Pair(u32, u32),
}

/// Canonical form a movement is compared in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovementToken {
    Single(String),
    Pair(u32, u32),
}

impl Movement {
    pub fn normalize(&self) -> MovementToken {
        match self {
            Movement::Number(n) => MovementToken::Single(n.to_string()),
            Movement::Pair(a, b) => MovementToken::Pair(*a, *b),
            Movement::Text(text) => {
                let text = text.trim().to_lowercase();
                if let Ok(n) = text.parse::<u32>() {
                    return MovementToken::Single(n.to_string());
                }
                if let Some((a, b)) = text.split_once('-') {
                    if let (Ok(a), Ok(b)) = (a.parse::<u32>(), b.parse::<u32>()) {
                        return MovementToken::Pair(a, b);
                    }
                }
                MovementToken::Single(text)
            }
        }
    }

    /// Lowercase file stems (or stem prefixes) that denote this movement
    pub fn candidates(&self) -> Vec<String> {
        let mut candidates = match self.normalize() {
            MovementToken::Single(s) => vec![format!("0{}", s), s.clone(), format!("movement{}", s)],
            MovementToken::Pair(a, b) => vec![
                format!("{}{}", a, b),
                format!("{}-{}", a, b),
                format!("{}-{:02}", a, b),
                format!("movement{}-{}", a, b),
                format!("movement{}-{:02}", a, b),
            ],
        };
        candidates.dedup();
        candidates
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Movement::Number(n) => write!(f, "{}", n),
            Movement::Text(text) => f.write_str(text),
            Movement::Pair(a, b) => write!(f, "({}, {})", a, b),
        }
    }
}

impl From<u32> for Movement {
    fn from(n: u32) -> Self {
        Movement::Number(n)
    }
}

impl From<&str> for Movement {
    fn from(text: &str) -> Self {
        Movement::Text(text.to_string())
    }
}

impl From<(u32, u32)> for Movement {
    fn from((a, b): (u32, u32)) -> Self {
        Movement::Pair(a, b)
    }
}

impl FromStr for Movement {
    type Err = CommonError;

    /// Parses `4`, `1-02`, `(2,1)` or `2,1`; anything else is kept as text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CommonError::InvalidInput("Empty movement".to_string()));
        }
        if let Ok(n) = trimmed.parse::<u32>() {
            return Ok(Movement::Number(n));
        }
        let inner = trimmed.trim_start_matches('(').trim_end_matches(')');
        if let Some((a, b)) = inner.split_once(',') {
            return match (a.trim().parse::<u32>(), b.trim().parse::<u32>()) {
                (Ok(a), Ok(b)) => Ok(Movement::Pair(a, b)),
                _ => Err(CommonError::InvalidInput(format!("Invalid movement pair: {}", s))),
            };
        }
        Ok(Movement::Text(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_from_name_and_parts() {
        assert_eq!(
            WorkIdentifier::from("Beethoven/Opus18no1").components(),
            vec!["beethoven", "opus18no1"]
        );
        assert_eq!(
            WorkIdentifier::from(["haydn", "opus74no2", "movement4.xml"]).components(),
            vec!["haydn", "opus74no2", "movement4.xml"]
        );
        assert!(WorkIdentifier::from("/").components().is_empty());
    }

    #[test]
    fn test_extension_replacement() {
        let ident = WorkIdentifier::from(["haydn", "opus74no2", "movement4.xml"]);
        assert_eq!(
            ident.with_extension_replaced(".xml", ".mxl"),
            Some(WorkIdentifier::Name("haydn/opus74no2/movement4.mxl".to_string()))
        );
        assert_eq!(WorkIdentifier::from("opus74no2").with_extension_replaced(".xml", ".mxl"), None);
    }

    #[test]
    fn test_equivalent_movements_normalize_equally() {
        assert_eq!(Movement::Number(1).normalize(), Movement::from("1").normalize());
        assert_eq!(Movement::from("01").normalize(), Movement::Number(1).normalize());
        assert_eq!(Movement::from("1-02").normalize(), Movement::Pair(1, 2).normalize());
        assert_ne!(Movement::from("1-02").normalize(), Movement::Pair(2, 1).normalize());
    }

    #[test]
    fn test_candidates() {
        assert_eq!(Movement::Number(4).candidates(), vec!["04", "4", "movement4"]);
        assert!(Movement::Pair(2, 1).candidates().contains(&"movement2-01".to_string()));
        assert!(Movement::from("1-02").candidates().contains(&"movement1-02".to_string()));
    }

    #[test]
    fn test_parse_movement() {
        assert_eq!("4".parse::<Movement>().unwrap(), Movement::Number(4));
        assert_eq!("(2,1)".parse::<Movement>().unwrap(), Movement::Pair(2, 1));
        assert_eq!("2, 1".parse::<Movement>().unwrap(), Movement::Pair(2, 1));
        assert_eq!("1-02".parse::<Movement>().unwrap(), Movement::Text("1-02".to_string()));
        assert!("a,b".parse::<Movement>().is_err());
        assert!("".parse::<Movement>().is_err());
    }
}
