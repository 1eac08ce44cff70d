//! Line classification: every supported language implements one
//! [`StructuralAnalyzer`] that splits a file into header lines (imports and
//! declaration signatures), footer lines (trailing entry points, tests,
//! initializers), and function-body regions scored for complexity.
//!
//! Each analyzer method is backed by a regex/heuristic variant in
//! [`heuristics`]; [`analyze`] tries the structural method first and falls
//! through on any error, so a broken query or an exotic file degrades instead
//! of failing.

pub mod heuristics;
pub mod python;
pub mod rust_lang;
pub mod typescript;

#[cfg(feature = "lang-go")]
pub mod go;

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use log::trace;
use tree_sitter::{Node, Tree};

use crate::complexity::{ComplexityProfile, EMPTY_PROFILE};
use crate::error::Result;
use crate::syntax::Language;

/// How far past a declaration's first line we look for its body opener when
/// carving out signature rows.
pub const HEADER_LOOKAHEAD: usize = 10;

/// Fraction of the file (from the end) eligible for footer classification:
/// rows at or past `total - total / FOOTER_DENOMINATOR`.
pub const FOOTER_DENOMINATOR: usize = 5;

/// One function/method-like region discovered in a file.
///
/// Produced immutable by an analyzer; the allocator pairs it with a selection
/// decision rather than mutating it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionAnalysis {
    pub name: String,
    /// 0-indexed first line of the region.
    pub start_line: usize,
    /// 0-indexed last line, inclusive.
    pub end_line: usize,
    /// Normalized [0,1] structural-density score.
    pub complexity: f64,
    pub line_count: usize,
}

impl FunctionAnalysis {
    pub fn new(name: impl Into<String>, start_line: usize, end_line: usize, complexity: f64) -> Self {
        let end_line = end_line.max(start_line);
        Self {
            name: name.into(),
            start_line,
            end_line,
            complexity,
            line_count: end_line - start_line + 1,
        }
    }

    pub fn contains_line(&self, row: usize) -> bool {
        (self.start_line..=self.end_line).contains(&row)
    }

    fn overlaps(&self, other: &FunctionAnalysis) -> bool {
        self.start_line <= other.end_line && other.start_line <= self.end_line
    }
}

/// The classified structure of one file, ready for allocation.
#[derive(Debug, Default)]
pub struct FileStructure {
    pub header_lines: BTreeSet<usize>,
    pub footer_lines: BTreeSet<usize>,
    pub functions: Vec<FunctionAnalysis>,
}

/// Per-language line classifier over a concrete syntax tree.
///
/// Implementations never decide selection; they only describe structure.
/// Every method may fail (and routinely does on exotic input); callers go
/// through [`analyze`], which supplies the heuristic fallback.
pub trait StructuralAnalyzer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Languages this analyzer is registered for.
    fn languages(&self) -> &'static [Language];

    /// Node-kind tables for the complexity scorer.
    fn profile(&self) -> &'static ComplexityProfile;

    /// Full ranges of import/module statements plus the signature rows of
    /// type-level declarations (bodies excluded).
    fn header_lines(&self, lines: &[&str], src: &[u8], root: Node) -> Result<BTreeSet<usize>>;

    /// All function/method-like regions with complexity. Non-overlapping by
    /// construction: collection never descends into a collected node.
    fn functions(&self, lines: &[&str], src: &[u8], root: Node) -> Result<Vec<FunctionAnalysis>>;

    /// Entry points, tests, and module-level initializers in the trailing
    /// fifth of the file.
    fn footer_lines(&self, lines: &[&str], src: &[u8], root: Node) -> Result<BTreeSet<usize>>;
}

/// Heuristic-only analyzer for languages without a bespoke implementation.
pub struct DefaultAnalyzer;

impl StructuralAnalyzer for DefaultAnalyzer {
    fn name(&self) -> &'static str {
        "default"
    }

    fn languages(&self) -> &'static [Language] {
        &[]
    }

    fn profile(&self) -> &'static ComplexityProfile {
        &EMPTY_PROFILE
    }

    fn header_lines(&self, lines: &[&str], _src: &[u8], _root: Node) -> Result<BTreeSet<usize>> {
        Ok(heuristics::header_lines(lines))
    }

    fn functions(&self, lines: &[&str], _src: &[u8], _root: Node) -> Result<Vec<FunctionAnalysis>> {
        Ok(heuristics::functions(lines))
    }

    fn footer_lines(&self, lines: &[&str], _src: &[u8], _root: Node) -> Result<BTreeSet<usize>> {
        Ok(heuristics::footer_lines(lines))
    }
}

/// Run the full classification for one file.
///
/// With a tree, each analyzer method is tried structurally and degraded to
/// its heuristic variant on error; with no tree (parse failure, unsupported
/// language) the heuristics run directly. The result is cleaned up so the
/// region invariants hold: function regions are disjoint, and no header or
/// footer row falls inside one.
pub fn analyze(
    lines: &[&str],
    src: &[u8],
    tree: Option<&Tree>,
    analyzer: &dyn StructuralAnalyzer,
) -> FileStructure {
    let (mut header, mut footer, functions) = match tree {
        Some(tree) => {
            let root = tree.root_node();
            let header = analyzer.header_lines(lines, src, root).unwrap_or_else(|e| {
                trace!("{}: header classification degraded: {e}", analyzer.name());
                heuristics::header_lines(lines)
            });
            let footer = analyzer.footer_lines(lines, src, root).unwrap_or_else(|e| {
                trace!("{}: footer classification degraded: {e}", analyzer.name());
                heuristics::footer_lines(lines)
            });
            let functions = analyzer.functions(lines, src, root).unwrap_or_else(|e| {
                trace!("{}: function analysis degraded: {e}", analyzer.name());
                heuristics::functions(lines)
            });
            (header, footer, functions)
        }
        None => (
            heuristics::header_lines(lines),
            heuristics::footer_lines(lines),
            heuristics::functions(lines),
        ),
    };

    let total = lines.len();
    header.retain(|&i| i < total);
    footer.retain(|&i| i < total);

    let mut functions: Vec<FunctionAnalysis> = functions
        .into_iter()
        .filter(|f| f.start_line < total)
        .map(|mut f| {
            f.end_line = f.end_line.min(total.saturating_sub(1)).max(f.start_line);
            f.line_count = f.end_line - f.start_line + 1;
            f
        })
        .collect();

    // Entry-point and test functions belong to the footer reservation, and a
    // signature row claimed by the header must not double as a region start.
    functions.retain(|f| !footer.contains(&f.start_line) && !header.contains(&f.start_line));

    // Keep the outermost of any overlapping pair; nesting is complexity
    // weight, not a region.
    functions.sort_by(|a, b| {
        a.start_line
            .cmp(&b.start_line)
            .then(b.end_line.cmp(&a.end_line))
    });
    let mut disjoint: Vec<FunctionAnalysis> = Vec::with_capacity(functions.len());
    for f in functions {
        if disjoint.last().is_some_and(|kept| kept.overlaps(&f)) {
            continue;
        }
        disjoint.push(f);
    }

    header.retain(|&i| !disjoint.iter().any(|f| f.contains_line(i)));
    footer.retain(|&i| !disjoint.iter().any(|f| f.contains_line(i)));

    FileStructure {
        header_lines: header,
        footer_lines: footer,
        functions: disjoint,
    }
}

// ───────────────────────── registry ─────────────────────────

pub struct AnalyzerRegistry {
    analyzers: Vec<Box<dyn StructuralAnalyzer>>,
    by_language: HashMap<Language, usize>,
}

impl AnalyzerRegistry {
    pub fn analyzer_for(&self, language: Language) -> Option<&dyn StructuralAnalyzer> {
        self.by_language
            .get(&language)
            .and_then(|&idx| self.analyzers.get(idx))
            .map(|a| a.as_ref())
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        #[allow(unused_mut)]
        let mut analyzers: Vec<Box<dyn StructuralAnalyzer>> = vec![
            Box::new(rust_lang::RustAnalyzer),
            Box::new(typescript::TypeScriptAnalyzer),
            Box::new(python::PythonAnalyzer),
        ];

        #[cfg(feature = "lang-go")]
        analyzers.push(Box::new(go::GoAnalyzer));

        let mut by_language = HashMap::new();
        for (idx, analyzer) in analyzers.iter().enumerate() {
            for &lang in analyzer.languages() {
                by_language.insert(lang, idx);
            }
        }

        Self {
            analyzers,
            by_language,
        }
    }
}

/// Built once at first use; lookup only thereafter.
pub fn registry() -> &'static AnalyzerRegistry {
    static REGISTRY: OnceLock<AnalyzerRegistry> = OnceLock::new();
    REGISTRY.get_or_init(AnalyzerRegistry::default)
}

// ─────────────────── shared node helpers ────────────────────

pub(crate) fn node_text<'a>(src: &'a [u8], node: Node) -> &'a str {
    std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
}

/// Last row a node actually occupies. A node whose range ends at column 0 of
/// the next row (trailing newline included) does not own that row.
pub(crate) fn node_end_row(node: Node) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row - 1
    } else {
        end.row
    }
}

pub(crate) fn add_node_rows(set: &mut BTreeSet<usize>, node: Node, total: usize) {
    let start = node.start_position().row;
    let end = node_end_row(node).min(total.saturating_sub(1));
    for row in start..=end {
        set.insert(row);
    }
}

/// Signature rows of a declaration: from its first row up to and including
/// the row where the body opens, bounded by the lookahead window. With no
/// body, the whole statement (still window-bounded).
pub(crate) fn add_signature_rows(
    set: &mut BTreeSet<usize>,
    node: Node,
    body: Option<Node>,
    total: usize,
) {
    let start = node.start_position().row;
    let natural_end = match body {
        Some(body) => body.start_position().row,
        None => node_end_row(node),
    };
    let end = natural_end
        .min(start + HEADER_LOOKAHEAD - 1)
        .min(total.saturating_sub(1));
    for row in start..=end {
        set.insert(row);
    }
}

/// First row eligible for footer classification.
pub(crate) fn footer_window_start(total: usize) -> usize {
    total - total / FOOTER_DENOMINATOR
}

/// Collect function-like nodes without descending into them, which makes the
/// resulting regions disjoint by construction.
pub(crate) fn collect_function_nodes<'t>(
    node: Node<'t>,
    kinds: &[&str],
    out: &mut Vec<Node<'t>>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            out.push(child);
            continue;
        }
        collect_function_nodes(child, kinds, out);
    }
}

/// Best-effort name from the grammar's `name` field.
pub(crate) fn node_name(src: &[u8], node: Node) -> String {
    match node.child_by_field_name("name") {
        Some(name) => {
            let text = node_text(src, name).trim();
            if text.is_empty() {
                "anonymous".to_string()
            } else {
                text.to_string()
            }
        }
        None => "anonymous".to_string(),
    }
}
