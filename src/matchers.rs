//! Author-year citation matchers.
//!
//! Each surface syntax is a separate named pattern so its limitations stay
//! local to it:
//!
//! - parenthetical groups: `(Smith et al., 2016; Jones and Brown, 2017)`
//! - author mentions inside a group: `Smith et al., 2016`
//! - narrative citations: `Smith et al. (2016)`, `Smith and Jones (2016)`,
//!   `Jones (2016)`
//!
//! Names containing spaces, names whose first letter is lowercase, and names
//! with characters outside `[A-Za-z'`-]` are not recognised.

use once_cell::sync::Lazy;
use regex::Regex;

/// A capitalised author surname, e.g. `Smith`, `O'Brien`, `Smith-Jones`.
const AUTHOR: &str = r"(?:[A-Z][A-Za-z'`-]+)";

/// `et al`, `et al.` (or any single character after `al`).
const ET_AL: &str = r"(?:et al.?)";

/// Four-digit year between 1800 and 2099 with an optional letter suffix.
const YEAR_NUM: &str = r"(?:18|19|20)[0-9][0-9][a-z]?";

/// Four digits with an optional letter suffix, anywhere.
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}[a-z]?").unwrap());

/// A parenthesized span whose content does not start with a digit and ends
/// in a year. Content may hold one level of balanced parentheses, as in
/// `(e.g. Smith (2016), Jones, 2017)`, but no line breaks.
static GROUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([^0-9()](?:[^()\n]|\([^()\n]*\))*?[0-9]{4}[a-z]?)\)").unwrap()
});

/// One author mention inside a parenthetical group.
static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    let additional = format!(r"(?:,? (?:(?:and |& )?{AUTHOR}|{ET_AL}))");
    let year = format!(r"(?:, *{YEAR_NUM}| *\({YEAR_NUM}\))");
    Regex::new(&format!(r"{AUTHOR}{additional}*{year}")).unwrap()
});

/// Where the surname of a lowercased mention ends.
static SURNAME_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",|\set al|\sand\s").unwrap());

/// `Smith et al. (2016)`
const ET_AL_NARRATIVE: &str = r"\w+\set\sal\.\s\([0-9]{4}[a-z]?\)";

/// `Smith and Jones (2016)`
const PAIR_NARRATIVE: &str = r"\w+\sand\s\w+\s\([0-9]{4}[a-z]?\)";

/// `Jones (2016)`
const SINGLE_NARRATIVE: &str = r"[A-Z][a-z]+\s\([0-9]{4}[a-z]?\)";

/// All narrative forms, tried in order at each position.
static NARRATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "({ET_AL_NARRATIVE})|({PAIR_NARRATIVE})|({SINGLE_NARRATIVE})"
    ))
    .unwrap()
});

/// A single author-year pair extracted from a parenthetical group.
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    /// The lowercased mention text (e.g. "smith et al., 2016")
    pub text: String,
    /// Lowercased surname used for lookup
    pub surname: String,
    /// Year as written, possibly with a letter suffix
    pub year: String,
}

/// A parenthesized citation group found in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationGroup {
    /// The group content without the enclosing parentheses
    pub content: String,
    /// Author mentions in the order they appear
    pub mentions: Vec<Mention>,
    /// Start and end byte positions of the group, parentheses included
    pub span: (usize, usize),
}

/// Which narrative surface form matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeForm {
    /// `Smith et al. (2016)`
    EtAl,
    /// `Smith and Jones (2016)`
    Pair,
    /// `Jones (2016)`
    Single,
}

/// A narrative citation found in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeCitation {
    pub form: NarrativeForm,
    /// The matched text as it appeared
    pub text: String,
    /// First word of the match, lowercased
    pub surname: String,
    pub year: String,
    pub span: (usize, usize),
}

/// Finds every parenthetical citation group, left to right.
///
/// # Examples
///
/// ```
/// use texcite::find_citation_groups;
///
/// let groups = find_citation_groups("As shown (Smith et al., 2016; Jones, 2012a).");
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].mentions.len(), 2);
/// assert_eq!(groups[0].mentions[1].year, "2012a");
/// ```
pub fn find_citation_groups(text: &str) -> Vec<CitationGroup> {
    GROUP_RE
        .captures_iter(text)
        .map(|cap| {
            let full_match = cap.get(0).unwrap();
            let content = cap.get(1).unwrap().as_str();
            CitationGroup {
                content: content.to_string(),
                mentions: split_mentions(content),
                span: (full_match.start(), full_match.end()),
            }
        })
        .collect()
}

/// Splits the content of a group into individual author mentions.
pub fn split_mentions(content: &str) -> Vec<Mention> {
    MENTION_RE
        .find_iter(content)
        .filter_map(|m| {
            let text = m.as_str().to_lowercase();
            let year = find_year(&text)?.to_string();
            let surname = mention_surname(&text).to_string();
            Some(Mention {
                text,
                surname,
                year,
            })
        })
        .collect()
}

/// The leading part of a mention up to the first comma, ` et al` or ` and `.
///
/// Falls back to the first whitespace-delimited word when none is present.
pub fn mention_surname(mention: &str) -> &str {
    SURNAME_END_RE
        .find_iter(mention)
        .find(|m| m.start() > 0)
        .map(|m| &mention[..m.start()])
        .unwrap_or_else(|| first_word(mention))
}

/// First four-digit year (with optional letter suffix) in `text`.
pub fn find_year(text: &str) -> Option<&str> {
    YEAR_RE.find(text).map(|m| m.as_str())
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// Finds every narrative citation, left to right.
///
/// Only the first word is kept as the surname, so `Smith and Jones (2016)`
/// is keyed on `smith`.
pub fn find_narrative_citations(text: &str) -> Vec<NarrativeCitation> {
    NARRATIVE_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let full_match = cap.get(0)?;
            let form = if cap.get(1).is_some() {
                NarrativeForm::EtAl
            } else if cap.get(2).is_some() {
                NarrativeForm::Pair
            } else {
                NarrativeForm::Single
            };
            let lowered = full_match.as_str().to_lowercase();
            Some(NarrativeCitation {
                form,
                text: full_match.as_str().to_string(),
                surname: first_word(&lowered).to_string(),
                year: find_year(&lowered)?.to_string(),
                span: (full_match.start(), full_match.end()),
            })
        })
        .collect()
}
