//! texcite: rewrite author-year citations as LaTeX citation keys.
//!
//! This library provides functionality to:
//! - Index `surname_token_year` keys from a BibTeX file
//! - Find parenthetical (`(Smith et al., 2016)`) and narrative
//!   (`Smith et al. (2016)`) citations in plain text
//! - Replace them with natbib `\citep{...}` / `\citet{...}` markup

pub mod bibtex;
pub mod matchers;
pub mod pipeline;
pub mod resolver;
pub mod rewrite;

pub use bibtex::{
    load_reference_table, parse_reference_table, BibError, EntryKind, ReferenceEntry,
    ReferenceTable,
};
pub use matchers::{
    find_citation_groups, find_narrative_citations, split_mentions, CitationGroup, Mention,
    NarrativeCitation, NarrativeForm,
};
pub use pipeline::{convert, load_input, run, write_report, PipelineError, Report};
pub use resolver::{resolve_key, CiteCommand, LookupMode, ResolveError, ResolvedKey, PLACEHOLDER};
pub use rewrite::{
    replace_spans, rewrite_narrative, rewrite_parenthetical, CitationKind, Rewrite, Rewritten,
};
