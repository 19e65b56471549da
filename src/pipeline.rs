//! The end-to-end conversion: index the bibliography, rewrite parenthetical
//! citations, then rewrite narrative citations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::bibtex::{load_reference_table, BibError, ReferenceTable};
use crate::resolver::{LookupMode, ResolveError};
use crate::rewrite::{rewrite_narrative, rewrite_parenthetical, CitationKind, Rewrite};

/// Errors that can occur while running the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("'{}': {source}", .path.display())]
    ReadInput { path: PathBuf, source: io::Error },

    #[error("'{}': {source}", .path.display())]
    Bibliography { path: PathBuf, source: BibError },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("'{}': {source}", .path.display())]
    WriteOutput { path: PathBuf, source: io::Error },

    #[error("'{}': {source}", .path.display())]
    WriteReport { path: PathBuf, source: io::Error },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Every rewrite performed on a manuscript, in pass order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Report {
    pub rewrites: Vec<Rewrite>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.rewrites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty()
    }

    pub fn count(&self, kind: CitationKind) -> usize {
        self.rewrites.iter().filter(|r| r.kind == kind).count()
    }

    /// Total number of `???` placeholders emitted.
    pub fn unresolved(&self) -> usize {
        self.rewrites.iter().map(|r| r.unresolved).sum()
    }

    /// Pretty-printed JSON array of rewrites.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Rewrites all citations in `text`: parenthetical groups first, then
/// narrative citations.
pub fn convert(
    table: &ReferenceTable,
    text: &str,
    mode: LookupMode,
) -> Result<(String, Report), ResolveError> {
    let parenthetical = rewrite_parenthetical(table, text, mode)?;
    let narrative = rewrite_narrative(table, &parenthetical.text, mode)?;

    let mut rewrites = parenthetical.rewrites;
    rewrites.extend(narrative.rewrites);
    let report = Report { rewrites };

    info!(
        parenthetical = report.count(CitationKind::Parenthetical),
        narrative = report.count(CitationKind::Narrative),
        unresolved = report.unresolved(),
        "rewrote citations"
    );

    Ok((narrative.text, report))
}

/// Reads a manuscript, trimming leading and trailing whitespace.
pub fn load_input(path: &Path) -> io::Result<String> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}

/// Converts the manuscript at `input` and writes the result to `output`.
///
/// The output file is only created once every citation has been resolved,
/// and any existing content is overwritten.
pub fn run(
    bib: &Path,
    input: &Path,
    output: &Path,
    mode: LookupMode,
) -> Result<Report, PipelineError> {
    let text = load_input(input).map_err(|source| PipelineError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    let table = load_reference_table(bib).map_err(|source| PipelineError::Bibliography {
        path: bib.to_path_buf(),
        source,
    })?;

    let (converted, report) = convert(&table, &text, mode)?;

    fs::write(output, converted).map_err(|source| PipelineError::WriteOutput {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(report)
}

/// Writes the report as JSON to `path`.
pub fn write_report(path: &Path, report: &Report) -> Result<(), PipelineError> {
    let json = report.to_json()?;
    fs::write(path, json).map_err(|source| PipelineError::WriteReport {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibtex::parse_reference_table;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BIB: &str = "@article{smith_widgets_2016,\n  title = {Widgets}\n}\n@book{jones_gadgets_2012,\n}\n";

    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn table() -> ReferenceTable {
        parse_reference_table(BIB).unwrap()
    }

    #[test]
    fn test_convert_both_passes() {
        // Given: a manuscript with one citation of each kind
        let text = "Smith et al. (2016) argue that widgets matter (Jones, 2012).";

        // When: we convert it
        let (out, report) = convert(&table(), text, LookupMode::Strict).unwrap();

        // Then: both are rewritten and reported in pass order
        assert_eq!(
            out,
            r"\citet{smith_widgets_2016} argue that widgets matter \citep{jones_gadgets_2012}."
        );
        assert_eq!(report.len(), 2);
        assert_eq!(report.rewrites[0].kind, CitationKind::Parenthetical);
        assert_eq!(report.rewrites[1].kind, CitationKind::Narrative);
        assert_eq!(report.unresolved(), 0);
    }

    #[test]
    fn test_convert_without_citations_is_identity() {
        let text = "Nothing to cite here (really), not even in 1999.\nSecond line.";

        let (out, report) = convert(&table(), text, LookupMode::Strict).unwrap();

        assert_eq!(out, text);
        assert!(report.is_empty());
    }

    #[test]
    fn test_convert_output_is_stable() {
        // Running again on converted text finds nothing new
        let text = "Jones (2012) and (Smith, 2016; Smith, 2016a).";
        let (once, _) = convert(&table(), text, LookupMode::Strict).unwrap();

        let (twice, report) = convert(&table(), &once, LookupMode::Strict).unwrap();

        assert_eq!(twice, once);
        assert!(report.is_empty());
    }

    #[test]
    fn test_convert_strict_failure() {
        let result = convert(&table(), "(Jones, 2020)", LookupMode::Strict);

        assert!(result.is_err());
    }

    #[test]
    fn test_report_json() {
        let (_, report) = convert(&table(), "(Jones, 2012a)", LookupMode::Strict).unwrap();

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["kind"], "parenthetical");
        assert_eq!(json[0]["original"], "(Jones, 2012a)");
        assert_eq!(json[0]["replacement"], r"\citep{jones_???_2012a}");
        assert_eq!(json[0]["unresolved"], 1);
        assert!(json[0].get("span").is_none());
    }

    #[test]
    fn test_run_writes_output() {
        let bib = create_temp_file(BIB);
        let input = create_temp_file("\n  (Smith, 2016) shows it.\n\n");
        let output = NamedTempFile::new().unwrap();

        let report = run(bib.path(), input.path(), output.path(), LookupMode::Strict).unwrap();

        let written = fs::read_to_string(output.path()).unwrap();
        assert_eq!(written, r"\citep{smith_widgets_2016} shows it.");
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_run_overwrites_existing_output() {
        let bib = create_temp_file(BIB);
        let input = create_temp_file("short");
        let output = create_temp_file("a much longer previous content");

        run(bib.path(), input.path(), output.path(), LookupMode::Strict).unwrap();

        assert_eq!(fs::read_to_string(output.path()).unwrap(), "short");
    }

    #[test]
    fn test_run_missing_input() {
        let bib = create_temp_file(BIB);
        let output = NamedTempFile::new().unwrap();

        let result = run(
            bib.path(),
            Path::new("/nonexistent/input.txt"),
            output.path(),
            LookupMode::Strict,
        );

        assert!(matches!(result, Err(PipelineError::ReadInput { .. })));
    }

    #[test]
    fn test_run_missing_bibliography() {
        let input = create_temp_file("text");
        let output = NamedTempFile::new().unwrap();

        let result = run(
            Path::new("/nonexistent/refs.bib"),
            input.path(),
            output.path(),
            LookupMode::Strict,
        );

        assert!(matches!(
            result,
            Err(PipelineError::Bibliography {
                source: BibError::IoError(_),
                ..
            })
        ));
    }

    #[test]
    fn test_run_unresolved_leaves_output_untouched() {
        let bib = create_temp_file(BIB);
        let input = create_temp_file("(Jones, 2020)");
        let output = create_temp_file("previous");

        let result = run(bib.path(), input.path(), output.path(), LookupMode::Strict);

        assert!(matches!(result, Err(PipelineError::Resolve(_))));
        assert_eq!(fs::read_to_string(output.path()).unwrap(), "previous");
    }

    #[test]
    fn test_run_unwritable_output() {
        let bib = create_temp_file(BIB);
        let input = create_temp_file("text");

        let result = run(
            bib.path(),
            input.path(),
            Path::new("/nonexistent/dir/out.tex"),
            LookupMode::Strict,
        );

        assert!(matches!(result, Err(PipelineError::WriteOutput { .. })));
    }
}
