use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Maximum length of a residue name in PDB and mol2 substructure records.
pub const MAX_RESIDUE_TAG_LEN: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResidueTagError {
    #[error("Molecule name '{0}' contains no letters to derive a residue tag from")]
    NoLetters(String),
    #[error("Reference code is empty")]
    EmptyCode,
    #[error("Reference code '{0}' must be 1-3 ASCII letters or digits")]
    InvalidCode(String),
}

/// The short label used as residue (substructure) name in every output file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueTag(String);

impl ResidueTag {
    /// Derives a tag from a free-form molecule name.
    ///
    /// The name is uppercased, every character that is not an ASCII letter is
    /// removed, and the first three remaining letters are kept. `"NADH"` gives
    /// `"NAD"`, `"2-oxoglutarate"` gives `"OXO"`.
    pub fn from_name(name: &str) -> Result<Self, ResidueTagError> {
        let tag: String = name
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .take(MAX_RESIDUE_TAG_LEN)
            .collect();
        if tag.is_empty() {
            return Err(ResidueTagError::NoLetters(name.to_string()));
        }
        Ok(Self(tag))
    }

    /// Uses a chemical-component reference code as the tag, as given.
    ///
    /// Only the first whitespace-separated token is used when several codes
    /// are listed.
    pub fn from_reference_code(code: &str) -> Result<Self, ResidueTagError> {
        let first = first_reference_code(code).ok_or(ResidueTagError::EmptyCode)?;
        let valid = first.len() <= MAX_RESIDUE_TAG_LEN
            && first.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(ResidueTagError::InvalidCode(first.to_string()));
        }
        Ok(Self(first.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResidueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResidueTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns the first whitespace-separated token of a reference code field.
///
/// Logs a warning when the field lists more than one code.
pub fn first_reference_code(code: &str) -> Option<&str> {
    let mut tokens = code.split_whitespace();
    let first = tokens.next()?;
    if tokens.next().is_some() {
        warn!(
            "Splitting reference code '{}' into first entry only: '{}'",
            code, first
        );
    }
    Some(first)
}
