//! BibTeX reference indexing.
//!
//! Scans a `.bib` file line by line and builds a lookup table from
//! `(surname, year)` to the disambiguation token in the middle of a
//! `surname_token_year` citation key.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur when indexing a bibliography.
#[derive(Error, Debug)]
pub enum BibError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed citation key at line {line}: expected `surname_token_year`, got `{key}`")]
    MalformedKey { line: usize, key: String },
}

/// BibTeX entry types whose keys are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Article,
    InProceedings,
    InCollection,
    Book,
    Misc,
    TechReport,
}

impl EntryKind {
    pub const ALL: [EntryKind; 6] = [
        EntryKind::Article,
        EntryKind::InProceedings,
        EntryKind::InCollection,
        EntryKind::Book,
        EntryKind::Misc,
        EntryKind::TechReport,
    ];

    /// The literal text that opens an entry of this kind.
    pub fn marker(self) -> &'static str {
        match self {
            EntryKind::Article => "@article{",
            EntryKind::InProceedings => "@inproceedings{",
            EntryKind::InCollection => "@incollection{",
            EntryKind::Book => "@book{",
            EntryKind::Misc => "@misc{",
            EntryKind::TechReport => "@techreport{",
        }
    }

    /// Returns the first entry kind whose marker occurs in `line`.
    pub fn detect(line: &str) -> Option<EntryKind> {
        Self::ALL.into_iter().find(|kind| line.contains(kind.marker()))
    }
}

/// One indexed bibliography key, split into its three parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub kind: EntryKind,
    /// Lowercased author surname
    pub surname: String,
    /// Middle segment of the key
    pub token: String,
    /// Year segment, trailing punctuation removed (may carry a letter suffix)
    pub year: String,
}

impl ReferenceEntry {
    /// Parses the entry key from a bibliography line.
    ///
    /// Returns `Ok(None)` if the line does not open a recognised entry.
    pub fn from_line(line: &str, line_num: usize) -> Result<Option<Self>, BibError> {
        let Some(kind) = EntryKind::detect(line) else {
            return Ok(None);
        };

        // Text between the first `{` and the next `}` (or end of line).
        let after_brace = line.split_once('{').map_or("", |(_, rest)| rest);
        let key = after_brace.split('}').next().unwrap_or("").trim();

        let parts: Vec<&str> = key.split('_').collect();
        let malformed = || BibError::MalformedKey {
            line: line_num,
            key: key.to_string(),
        };
        let [surname, token, year] = parts.as_slice() else {
            return Err(malformed());
        };
        let year = year.trim_end_matches(|c: char| c.is_ascii_punctuation());
        if surname.is_empty() || year.is_empty() {
            return Err(malformed());
        }

        Ok(Some(ReferenceEntry {
            kind,
            surname: surname.to_lowercase(),
            token: token.to_string(),
            year: year.to_string(),
        }))
    }
}

/// Immutable lookup table from `(surname, year)` to disambiguation token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    entries: HashMap<(String, String), String>,
}

impl ReferenceTable {
    /// Returns the disambiguation token for a lowercased surname and year.
    pub fn token(&self, surname: &str, year: &str) -> Option<&str> {
        self.entries
            .get(&(surname.to_string(), year.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ReferenceEntry> for ReferenceTable {
    fn from_iter<I: IntoIterator<Item = ReferenceEntry>>(iter: I) -> Self {
        let mut entries = HashMap::new();
        for entry in iter {
            let pair = (entry.surname.clone(), entry.year.clone());
            if let Some(previous) = entries.insert(pair, entry.token.clone()) {
                warn!(
                    surname = %entry.surname,
                    year = %entry.year,
                    "duplicate key: `{}` overrides `{}`",
                    entry.token,
                    previous
                );
            }
        }
        ReferenceTable { entries }
    }
}

/// Loads a bibliography file and indexes its entry keys.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if an entry key does not
/// have the `surname_token_year` shape.
pub fn load_reference_table(path: &Path) -> Result<ReferenceTable, BibError> {
    let content = fs::read_to_string(path)?;
    let table = parse_reference_table(&content)?;
    info!(path = %path.display(), entries = table.len(), "indexed bibliography");
    Ok(table)
}

/// Indexes every recognised entry key in BibTeX source text.
pub fn parse_reference_table(content: &str) -> Result<ReferenceTable, BibError> {
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if let Some(entry) = ReferenceEntry::from_line(line, idx + 1)? {
            debug!(kind = ?entry.kind, surname = %entry.surname, year = %entry.year, "indexed entry");
            entries.push(entry);
        }
    }

    Ok(entries.into_iter().collect())
}
