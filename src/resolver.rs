//! Citation key resolution.
//!
//! Turns an extracted `(surname, year)` pair into a `surname_token_year`
//! key using the reference table, or into a `surname_???_year` placeholder
//! when the key cannot be determined automatically.

use thiserror::Error;
use tracing::warn;

use crate::bibtex::ReferenceTable;

/// Stands in for the disambiguation token when it cannot be resolved.
pub const PLACEHOLDER: &str = "???";

/// Errors that can occur during resolution.
#[derive(Error, Debug, PartialEq)]
pub enum ResolveError {
    #[error("Reference not found: no bibliography key for ({surname}, {year}), cited as `{citation}`")]
    UnresolvedCitation {
        surname: String,
        year: String,
        citation: String,
    },
}

/// What to do when a plain four-digit year has no bibliography entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupMode {
    /// Abort with [`ResolveError::UnresolvedCitation`].
    #[default]
    Strict,
    /// Emit a `???` placeholder and carry on.
    Lenient,
}

/// The natbib command wrapping the resolved keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiteCommand {
    /// Parenthetical: `\citep{a, b}`
    Citep,
    /// Textual: `\citet{a}`
    Citet,
}

impl CiteCommand {
    pub fn name(self) -> &'static str {
        match self {
            CiteCommand::Citep => "citep",
            CiteCommand::Citet => "citet",
        }
    }

    /// Wraps keys in the command, e.g. `\citep{a_x_2001, b_???_2002a}`.
    pub fn render<S: AsRef<str>>(self, keys: &[S]) -> String {
        let keys: Vec<&str> = keys.iter().map(|k| k.as_ref()).collect();
        format!("\\{}{{{}}}", self.name(), keys.join(", "))
    }
}

/// A citation key produced for one author mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: String,
    /// True when the key carries the placeholder token
    pub unresolved: bool,
}

impl ResolvedKey {
    fn placeholder(surname: &str, year: &str) -> Self {
        if !is_key_segment(surname) {
            warn!(
                %surname,
                %year,
                "placeholder surname is not a usable key segment, `&`-joined authors are not split"
            );
        }
        ResolvedKey {
            key: format!("{surname}_{PLACEHOLDER}_{year}"),
            unresolved: true,
        }
    }
}

/// True when `surname` can stand as the first part of a BibTeX key.
fn is_key_segment(surname: &str) -> bool {
    !surname.is_empty() && !surname.chars().any(|c| c.is_whitespace() || c == '&')
}

/// Resolves a lowercased surname and year to a citation key.
///
/// A year with a letter suffix (`2012a`) always yields a placeholder, since
/// several works by the same author in that year cannot be told apart.
///
/// # Arguments
///
/// * `table` - The indexed bibliography
/// * `surname` - Lowercased surname
/// * `year` - Year as cited, possibly suffixed
/// * `mode` - Behaviour for a missing plain-year entry
/// * `citation` - The citation text, used in error messages
pub fn resolve_key(
    table: &ReferenceTable,
    surname: &str,
    year: &str,
    mode: LookupMode,
    citation: &str,
) -> Result<ResolvedKey, ResolveError> {
    if year.len() != 4 {
        return Ok(ResolvedKey::placeholder(surname, year));
    }

    match table.token(surname, year) {
        Some(token) => Ok(ResolvedKey {
            key: format!("{surname}_{token}_{year}"),
            unresolved: false,
        }),
        None => match mode {
            LookupMode::Strict => Err(ResolveError::UnresolvedCitation {
                surname: surname.to_string(),
                year: year.to_string(),
                citation: citation.to_string(),
            }),
            LookupMode::Lenient => {
                warn!(%surname, %year, %citation, "no bibliography entry, using placeholder");
                Ok(ResolvedKey::placeholder(surname, year))
            }
        },
    }
}
