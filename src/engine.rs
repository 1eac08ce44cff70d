//! The per-file truncation pipeline: parse, classify, score, allocate,
//! assemble. A pure function of (text, language, line limit) with no I/O,
//! which is what lets the packer fan it out across a worker pool freely.

use std::path::Path;

use log::debug;

use crate::allocator::allocate;
use crate::analyzer::{analyze, registry, DefaultAnalyzer, StructuralAnalyzer};
use crate::assembler::{assemble, TruncationReport};
use crate::error::{validate_line_limit, Result};
use crate::syntax::{is_minified_or_generated, parse, Language};

/// Result of truncating one file.
#[derive(Debug)]
pub struct Truncated {
    pub text: String,
    pub report: TruncationReport,
}

impl Truncated {
    fn passthrough(text: &str, line_limit: Option<usize>) -> Self {
        Self {
            text: text.to_string(),
            report: TruncationReport::passthrough(line_limit, text.lines().count()),
        }
    }
}

/// Truncate one file's text to `line_limit` lines of real source.
///
/// `None` means the engine is a no-op; the original text comes back verbatim
/// with `truncated=false`. A zero limit is rejected before any parsing. An
/// infeasible limit (declarations alone exceed it) comes back as a typed
/// error carrying the workable minimum; callers decide whether that is fatal.
/// Parse failures never are: they route the file onto the heuristic path.
pub fn truncate_source(
    path: &Path,
    text: &str,
    language: Option<Language>,
    line_limit: Option<usize>,
) -> Result<Truncated> {
    let Some(limit) = line_limit else {
        return Ok(Truncated::passthrough(text, None));
    };
    let limit = validate_line_limit(limit)?;

    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= limit {
        return Ok(Truncated::passthrough(text, Some(limit)));
    }

    let language = language.or_else(|| Language::from_path(path));

    let tree = match language {
        Some(lang) if !is_minified_or_generated(text) => match parse(text, lang) {
            Ok(tree) => Some(tree),
            Err(e) => {
                debug!("{}: {e}; using heuristic analysis", path.display());
                None
            }
        },
        _ => None,
    };

    let analyzer: &dyn StructuralAnalyzer = language
        .and_then(|lang| registry().analyzer_for(lang))
        .unwrap_or(&DefaultAnalyzer);

    let structure = analyze(&lines, text.as_bytes(), tree.as_ref(), analyzer);
    let plan = allocate(
        structure.header_lines,
        structure.footer_lines,
        structure.functions,
        limit,
    )?;

    let (out, report) = assemble(&lines, &plan, limit);
    Ok(Truncated { text: out, report })
}
