//! Regex/line-pattern classification used when no syntax tree is available
//! (parse failure, unsupported language) or when a structural method errors.
//!
//! Coarser than the tree-based analyzers on purpose: header scanning stops at
//! the first body opener, footer reservation runs from the first trailing
//! match to end of file, and functions are single-line spans at a nominal
//! complexity because body boundaries cannot be known without a tree.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use super::{footer_window_start, FunctionAnalysis};

/// Complexity assigned to pattern-matched functions; there is no body to
/// score, so everything ranks equal and file order breaks the ties.
pub const NOMINAL_COMPLEXITY: f64 = 0.5;

const IMPORT_PREFIXES: &[&str] = &[
    "use ",
    "import ",
    "from ",
    "package ",
    "using ",
    "extern crate ",
    "#include",
    "export {",
    "export *",
    "require ",
];

fn signature_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?:pub(?:\([^)]*\))?\s+|export\s+|public\s+|private\s+|protected\s+|abstract\s+|declare\s+|default\s+|static\s+|async\s+)*(?:class|struct|trait|interface|enum|impl|mod|type|namespace|union)\b",
        )
        .unwrap()
    })
}

fn function_regexes() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        vec![
            // Rust, with optional visibility/async/unsafe modifiers.
            Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+([A-Za-z0-9_]+)").unwrap(),
            // JS/TS function declarations; the name may be absent.
            Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z0-9_$]*)").unwrap(),
            // Python.
            Regex::new(r"^\s*(?:async\s+)?def\s+([A-Za-z0-9_]+)").unwrap(),
            // Go, receiver optional.
            Regex::new(r"^\s*func\s+(?:\([^)]*\)\s*)?([A-Za-z0-9_]+)").unwrap(),
            // Catch-all for languages with similar keywords (Swift, Kotlin...).
            Regex::new(r"^\s*(?:public|private|protected|internal|open|static|override|\s)*func\s+([A-Za-z0-9_]+)").unwrap(),
        ]
    })
}

fn footer_regexes() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        vec![
            Regex::new(r"^\s*(?:pub\s+)?(?:async\s+)?fn\s+main\b").unwrap(),
            Regex::new(r"#\[\s*(?:\w+::)?test").unwrap(),
            Regex::new(r"^\s*mod\s+tests\b").unwrap(),
            Regex::new(r"^\s*(?:pub\s+)?static\s+[A-Z_]").unwrap(),
            Regex::new(r"^\s*(?:async\s+)?def\s+(?:main\b|test_)").unwrap(),
            Regex::new(r#"^\s*if\s+__name__\s*=="#).unwrap(),
            Regex::new(r"^\s*func\s+(?:main|init|Test|Benchmark)").unwrap(),
            Regex::new(r"^\s*(?:describe|it|test)\s*\(").unwrap(),
            Regex::new(r"if\s*\(\s*require\.main").unwrap(),
            Regex::new(r"^\s*main\s*\(\s*\)\s*;?\s*$").unwrap(),
        ]
    })
}

fn is_import_line(trimmed: &str) -> bool {
    IMPORT_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with("--")
}

fn opens_body(trimmed: &str) -> bool {
    trimmed.contains('{') || trimmed.ends_with(':')
}

/// Leading run of import statements and bare declaration signatures,
/// terminated by the first body opener or other code.
pub fn header_lines(lines: &[&str]) -> BTreeSet<usize> {
    let mut header = BTreeSet::new();

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || is_comment_line(trimmed) {
            continue;
        }
        if is_import_line(trimmed) {
            header.insert(idx);
            continue;
        }
        if signature_regex().is_match(line) && !opens_body(trimmed) {
            header.insert(idx);
            continue;
        }
        break;
    }

    header
}

/// Trailing entry-point/test reservation: the first pattern hit within the
/// last fifth of the file claims everything from there to the end.
pub fn footer_lines(lines: &[&str]) -> BTreeSet<usize> {
    let mut footer = BTreeSet::new();
    let window = footer_window_start(lines.len());

    let first_hit = lines
        .iter()
        .enumerate()
        .skip(window)
        .find(|(_, line)| footer_regexes().iter().any(|re| re.is_match(line)))
        .map(|(idx, _)| idx);

    if let Some(start) = first_hit {
        footer.extend(start..lines.len());
    }

    footer
}

/// Signature-shaped lines become single-line regions at nominal complexity.
pub fn functions(lines: &[&str]) -> Vec<FunctionAnalysis> {
    let mut out = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || is_comment_line(trimmed) || is_import_line(trimmed) {
            continue;
        }

        for re in function_regexes() {
            let Some(caps) = re.captures(line) else {
                continue;
            };
            let name = caps
                .get(1)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("anonymous");
            out.push(FunctionAnalysis::new(name, idx, idx, NOMINAL_COMPLEXITY));
            break;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_stops_at_first_body() {
        let lines = vec![
            "use std::fmt;",
            "use std::io;",
            "",
            "pub struct Config;",
            "fn main() {",
            "    use std::mem;",
        ];
        let header = header_lines(&lines);
        assert!(header.contains(&0) && header.contains(&1));
        assert!(header.contains(&3), "bodyless struct is a signature");
        assert!(!header.contains(&4), "body opener ends the scan");
        assert!(!header.contains(&5), "nothing after the first body");
    }

    #[test]
    fn footer_reserves_trailing_entry_point() {
        let mut lines: Vec<&str> = vec!["fn helper() {}"; 16];
        lines.push("fn main() {");
        lines.push("    helper();");
        lines.push("}");
        let footer = footer_lines(&lines);
        assert_eq!(footer.iter().copied().collect::<Vec<_>>(), vec![16, 17, 18]);
    }

    #[test]
    fn footer_ignores_early_main() {
        // main sits in the first 80% of the file: not a footer candidate.
        let mut lines = vec!["fn main() {", "}", ""];
        lines.extend(std::iter::repeat("// filler").take(20));
        assert!(footer_lines(&lines).is_empty());
    }

    #[test]
    fn functions_are_single_line_nominal_spans() {
        let lines = vec![
            "def first(a, b):",
            "    pass",
            "async def second():",
            "    pass",
            "function third() {",
            "func (s *S) Fourth() error {",
        ];
        let found = functions(&lines);
        let names: Vec<&str> = found.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third", "Fourth"]);
        for f in &found {
            assert_eq!(f.line_count, 1);
            assert_eq!(f.complexity, NOMINAL_COMPLEXITY);
        }
    }

    #[test]
    fn anonymous_function_gets_placeholder_name() {
        let lines = vec!["export default function () {"];
        let found = functions(&lines);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "anonymous");
    }
}
