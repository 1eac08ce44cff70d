use std::path::Path;

use tree_sitter::{Parser, Tree};

use crate::error::{Result, ShearError};

/// Languages with a registered structural analyzer.
///
/// Anything else is handled by the heuristic default analyzer; detection is
/// by file extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    /// Covers plain TypeScript and JavaScript (they share a grammar here).
    TypeScript,
    /// TSX/JSX need the dedicated grammar variant.
    Tsx,
    Python,
    Go,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "rs" => Some(Language::Rust),
            "ts" | "mts" | "cts" | "js" | "mjs" | "cjs" => Some(Language::TypeScript),
            "tsx" | "jsx" => Some(Language::Tsx),
            "py" | "pyw" => Some(Language::Python),
            "go" => Some(Language::Go),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::Python => "python",
            Language::Go => "go",
        }
    }

    /// The tree-sitter grammar for this language, when compiled in.
    ///
    /// `None` (Go with the `lang-go` feature off) sends the file down the
    /// heuristic path, same as a parse failure.
    pub fn grammar(self) -> Option<tree_sitter::Language> {
        match self {
            Language::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
            Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Language::Tsx => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
            Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
            #[cfg(feature = "lang-go")]
            Language::Go => Some(tree_sitter_go::LANGUAGE.into()),
            #[cfg(not(feature = "lang-go"))]
            Language::Go => None,
        }
    }
}

/// Parse `text` into a concrete syntax tree.
///
/// Deterministic for identical input; any parser-side failure comes back as a
/// typed `ParseFailure`, which callers downgrade to the heuristic path.
pub fn parse(text: &str, language: Language) -> Result<Tree> {
    let grammar = language.grammar().ok_or(ShearError::ParseFailure {
        language: language.as_str(),
    })?;

    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|_| ShearError::ParseFailure {
            language: language.as_str(),
        })?;

    parser.parse(text, None).ok_or(ShearError::ParseFailure {
        language: language.as_str(),
    })
}

/// True when a source text looks minified or machine-generated.
///
/// Checks the first 5 non-empty lines; any single line over 2000 chars is
/// almost certainly a bundled artifact, and feeding it to tree-sitter wastes
/// CPU for no structural signal.
pub fn is_minified_or_generated(text: &str) -> bool {
    const MAX_SAFE_LINE_CHARS: usize = 2_000;
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .take(5)
        .any(|l| l.len() > MAX_SAFE_LINE_CHARS)
}
