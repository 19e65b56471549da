//! Citation rewriting.
//!
//! Replaces parenthetical groups with one `\citep{...}` each, then narrative
//! citations with one `\citet{...}` each. Neither pass produces text that the
//! other pass (or a second run) would match again.

use serde::Serialize;
use tracing::debug;

use crate::bibtex::ReferenceTable;
use crate::matchers::{find_citation_groups, find_narrative_citations};
use crate::resolver::{resolve_key, CiteCommand, LookupMode, ResolveError};

/// Which surface syntax a rewrite replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    Parenthetical,
    Narrative,
}

/// One replacement performed on the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rewrite {
    pub kind: CitationKind,
    /// The citation text as it appeared
    pub original: String,
    /// The markup that replaced it
    pub replacement: String,
    /// Keys inside the markup, in order
    pub keys: Vec<String>,
    /// Number of keys carrying the `???` placeholder
    pub unresolved: usize,
    /// Start and end byte positions in the text the pass was run on
    #[serde(skip)]
    pub span: (usize, usize),
}

/// The result of one rewriting pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewritten {
    pub text: String,
    pub rewrites: Vec<Rewrite>,
}

/// Replaces every parenthetical citation group with a merged `\citep{...}`.
///
/// Groups are processed left to right; identical groups are each replaced.
/// A group in which no author mention is recognised is left untouched.
///
/// # Examples
///
/// ```
/// use texcite::{parse_reference_table, rewrite_parenthetical, LookupMode};
///
/// let table = parse_reference_table("@article{smith_widgets_2016,").unwrap();
/// let out = rewrite_parenthetical(&table, "Shown (Smith, 2016).", LookupMode::Strict).unwrap();
/// assert_eq!(out.text, r"Shown \citep{smith_widgets_2016}.");
/// ```
pub fn rewrite_parenthetical(
    table: &ReferenceTable,
    text: &str,
    mode: LookupMode,
) -> Result<Rewritten, ResolveError> {
    let mut rewrites = Vec::new();

    for group in find_citation_groups(text) {
        if group.mentions.is_empty() {
            debug!(content = %group.content, "no author mention in group, skipping");
            continue;
        }

        let original = &text[group.span.0..group.span.1];
        let mut keys = Vec::with_capacity(group.mentions.len());
        let mut unresolved = 0;
        for mention in &group.mentions {
            let resolved = resolve_key(table, &mention.surname, &mention.year, mode, original)?;
            unresolved += usize::from(resolved.unresolved);
            keys.push(resolved.key);
        }

        let replacement = CiteCommand::Citep.render(&keys);
        debug!(%original, %replacement, "rewrote parenthetical citation");
        rewrites.push(Rewrite {
            kind: CitationKind::Parenthetical,
            original: original.to_string(),
            replacement,
            keys,
            unresolved,
            span: group.span,
        });
    }

    Ok(Rewritten {
        text: replace_spans(text, &rewrites),
        rewrites,
    })
}

/// Replaces every narrative citation with its own `\citet{...}`.
///
/// # Examples
///
/// ```
/// use texcite::{parse_reference_table, rewrite_narrative, LookupMode};
///
/// let table = parse_reference_table("@article{smith_widgets_2016,").unwrap();
/// let out = rewrite_narrative(&table, "Smith et al. (2016) argue", LookupMode::Strict).unwrap();
/// assert_eq!(out.text, r"\citet{smith_widgets_2016} argue");
/// ```
pub fn rewrite_narrative(
    table: &ReferenceTable,
    text: &str,
    mode: LookupMode,
) -> Result<Rewritten, ResolveError> {
    let mut rewrites = Vec::new();

    for cite in find_narrative_citations(text) {
        let resolved = resolve_key(table, &cite.surname, &cite.year, mode, &cite.text)?;
        let replacement = CiteCommand::Citet.render(&[&resolved.key]);
        debug!(original = %cite.text, form = ?cite.form, %replacement, "rewrote narrative citation");
        rewrites.push(Rewrite {
            kind: CitationKind::Narrative,
            original: cite.text,
            replacement,
            keys: vec![resolved.key],
            unresolved: usize::from(resolved.unresolved),
            span: cite.span,
        });
    }

    Ok(Rewritten {
        text: replace_spans(text, &rewrites),
        rewrites,
    })
}

/// Substitutes each rewrite's replacement for its span.
///
/// Spans must not overlap. Replacements are applied from the end of the text
/// towards the beginning so earlier spans stay valid.
pub fn replace_spans(text: &str, rewrites: &[Rewrite]) -> String {
    if rewrites.is_empty() {
        return text.to_string();
    }

    let mut sorted: Vec<&Rewrite> = rewrites.iter().collect();
    sorted.sort_by(|a, b| b.span.0.cmp(&a.span.0));

    let mut result = text.to_string();
    for rewrite in sorted {
        let (start, end) = rewrite.span;
        result.replace_range(start..end, &rewrite.replacement);
    }

    result
}
