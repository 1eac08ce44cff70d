//! Structural analyzer for Python sources.

use std::collections::BTreeSet;

use tree_sitter::Node;

use crate::complexity::{score_function, ComplexityProfile};
use crate::error::Result;
use crate::syntax::Language;

use super::{
    add_node_rows, collect_function_nodes, footer_window_start, node_end_row, node_name,
    node_text, FunctionAnalysis, StructuralAnalyzer, HEADER_LOOKAHEAD,
};

pub const PY_PROFILE: ComplexityProfile = ComplexityProfile {
    branch_kinds: &[
        "if_statement",
        "elif_clause",
        "conditional_expression",
        "case_clause",
    ],
    loop_kinds: &[
        "for_statement",
        "while_statement",
        "list_comprehension",
        "set_comprehension",
        "dictionary_comprehension",
        "generator_expression",
    ],
    handler_kinds: &[
        "try_statement",
        "except_clause",
        "finally_clause",
        "with_statement",
    ],
    binary_kinds: &["boolean_operator"],
    logical_operators: &["and", "or"],
    function_kinds: &["function_definition", "lambda"],
    parameters_field: "parameters",
    bonus_kinds: &[("decorator", 0.2), ("await", 0.2), ("yield", 0.1)],
};

const FUNCTION_KINDS: &[&str] = &["function_definition"];

pub struct PythonAnalyzer;

impl StructuralAnalyzer for PythonAnalyzer {
    fn name(&self) -> &'static str {
        "python"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::Python]
    }

    fn profile(&self) -> &'static ComplexityProfile {
        &PY_PROFILE
    }

    fn header_lines(&self, lines: &[&str], _src: &[u8], root: Node) -> Result<BTreeSet<usize>> {
        let total = lines.len();
        let mut header = BTreeSet::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "import_statement" | "import_from_statement" | "future_import_statement" => {
                    add_node_rows(&mut header, child, total);
                }
                "class_definition" => {
                    add_class_signature_rows(&mut header, child, child, total);
                }
                "decorated_definition" => {
                    if let Some(def) = child.child_by_field_name("definition") {
                        if def.kind() == "class_definition" {
                            // Decorators belong to the declaration signature.
                            add_class_signature_rows(&mut header, child, def, total);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(header)
    }

    fn functions(&self, _lines: &[&str], src: &[u8], root: Node) -> Result<Vec<FunctionAnalysis>> {
        let mut nodes = Vec::new();
        collect_function_nodes(root, FUNCTION_KINDS, &mut nodes);

        Ok(nodes
            .into_iter()
            .map(|node| {
                // A decorated function's region starts at its first decorator.
                let region = match node.parent() {
                    Some(parent) if parent.kind() == "decorated_definition" => parent,
                    _ => node,
                };
                FunctionAnalysis::new(
                    node_name(src, node),
                    region.start_position().row,
                    node_end_row(region),
                    score_function(node, &PY_PROFILE),
                )
            })
            .collect())
    }

    fn footer_lines(&self, lines: &[&str], src: &[u8], root: Node) -> Result<BTreeSet<usize>> {
        let total = lines.len();
        let window = footer_window_start(total);
        let mut footer = BTreeSet::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.start_position().row < window {
                continue;
            }
            let target = match child.kind() {
                "decorated_definition" => child.child_by_field_name("definition").unwrap_or(child),
                _ => child,
            };
            match target.kind() {
                "if_statement" => {
                    let is_entry_guard = target
                        .child_by_field_name("condition")
                        .is_some_and(|cond| node_text(src, cond).contains("__name__"));
                    if is_entry_guard {
                        add_node_rows(&mut footer, child, total);
                    }
                }
                "function_definition" => {
                    let name = node_name(src, target);
                    if name == "main" || name.starts_with("test_") {
                        add_node_rows(&mut footer, child, total);
                    }
                }
                "class_definition" => {
                    let is_test_case = target
                        .child_by_field_name("superclasses")
                        .is_some_and(|sup| node_text(src, sup).contains("TestCase"));
                    if is_test_case {
                        add_node_rows(&mut footer, child, total);
                    }
                }
                _ => {}
            }
        }

        Ok(footer)
    }
}

/// Class signature rows: decorators plus the `class ...:` line(s), excluding
/// the indented body, which starts on a later row.
fn add_class_signature_rows(
    header: &mut BTreeSet<usize>,
    region: Node,
    class_def: Node,
    total: usize,
) {
    let start = region.start_position().row;
    let sig_end = match class_def.child_by_field_name("body") {
        Some(body) => body.start_position().row.saturating_sub(1).max(start),
        None => node_end_row(region),
    };
    let end = sig_end
        .min(start + HEADER_LOOKAHEAD - 1)
        .min(total.saturating_sub(1));
    for row in start..=end {
        header.insert(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, Language};

    fn analyze_fixture(text: &str) -> (BTreeSet<usize>, Vec<FunctionAnalysis>, BTreeSet<usize>) {
        let lines: Vec<&str> = text.lines().collect();
        let tree = parse(text, Language::Python).unwrap();
        let root = tree.root_node();
        let analyzer = PythonAnalyzer;
        (
            analyzer.header_lines(&lines, text.as_bytes(), root).unwrap(),
            analyzer.functions(&lines, text.as_bytes(), root).unwrap(),
            analyzer.footer_lines(&lines, text.as_bytes(), root).unwrap(),
        )
    }

    #[test]
    fn imports_and_class_signature_are_header() {
        let text = "\
import os
from typing import Optional

class Loader:
    def read(self, path):
        return open(path).read()
";
        let (header, functions, _) = analyze_fixture(text);
        assert!(header.contains(&0) && header.contains(&1));
        assert!(header.contains(&3), "class signature row");
        assert!(!header.contains(&4), "method line is not header");
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "read");
        assert_eq!(functions[0].start_line, 4);
        assert_eq!(functions[0].end_line, 5);
    }

    #[test]
    fn decorated_function_region_includes_decorators() {
        let text = "\
import functools

@functools.cache
def expensive(n):
    return n * n
";
        let (_, functions, _) = analyze_fixture(text);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "expensive");
        assert_eq!(functions[0].start_line, 2, "decorator row starts the region");
        assert_eq!(functions[0].end_line, 4);
    }

    #[test]
    fn dunder_main_guard_is_footer() {
        let mut text = String::new();
        for i in 0..16 {
            text.push_str(&format!("def work_{i}():\n    return {i}\n"));
        }
        text.push_str("if __name__ == \"__main__\":\n    work_0()\n");

        let (_, _, footer) = analyze_fixture(&text);
        assert!(footer.contains(&32), "guard line");
        assert!(footer.contains(&33), "guard body");
        assert!(!footer.contains(&31));
    }

    #[test]
    fn trailing_test_functions_are_footer() {
        let mut text = String::new();
        for i in 0..16 {
            text.push_str(&format!("def work_{i}():\n    return {i}\n"));
        }
        text.push_str("def test_work_0():\n    assert work_0() == 0\n");

        let (_, _, footer) = analyze_fixture(&text);
        assert!(footer.contains(&32) && footer.contains(&33));
    }
}
