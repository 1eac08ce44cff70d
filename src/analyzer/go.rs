//! Structural analyzer for Go sources (behind the `lang-go` feature).

use std::collections::BTreeSet;

use tree_sitter::Node;

use crate::complexity::{score_function, ComplexityProfile};
use crate::error::Result;
use crate::syntax::Language;

use super::{
    add_node_rows, add_signature_rows, collect_function_nodes, footer_window_start, node_end_row,
    node_name, FunctionAnalysis, StructuralAnalyzer,
};

pub const GO_PROFILE: ComplexityProfile = ComplexityProfile {
    branch_kinds: &[
        "if_statement",
        "expression_case",
        "type_case",
        "default_case",
        "communication_case",
    ],
    loop_kinds: &["for_statement"],
    handler_kinds: &["defer_statement"],
    binary_kinds: &["binary_expression"],
    logical_operators: &["&&", "||"],
    function_kinds: &["function_declaration", "method_declaration", "func_literal"],
    parameters_field: "parameters",
    bonus_kinds: &[
        ("go_statement", 0.3),
        ("select_statement", 0.3),
        ("type_parameter_list", 0.2),
        ("channel_type", 0.1),
    ],
};

const FUNCTION_KINDS: &[&str] = &["function_declaration", "method_declaration"];

/// Body-opener kinds inside a type declaration; their first row closes the
/// signature range.
const TYPE_BODY_KINDS: &[&str] = &["field_declaration_list", "method_spec_list"];

pub struct GoAnalyzer;

impl StructuralAnalyzer for GoAnalyzer {
    fn name(&self) -> &'static str {
        "go"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::Go]
    }

    fn profile(&self) -> &'static ComplexityProfile {
        &GO_PROFILE
    }

    fn header_lines(&self, lines: &[&str], _src: &[u8], root: Node) -> Result<BTreeSet<usize>> {
        let total = lines.len();
        let mut header = BTreeSet::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "package_clause" | "import_declaration" => {
                    add_node_rows(&mut header, child, total);
                }
                "type_declaration" => {
                    let body = find_descendant(child, TYPE_BODY_KINDS);
                    add_signature_rows(&mut header, child, body, total);
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
                FunctionAnalysis::new(
                    node_name(src, node),
                    node.start_position().row,
                    node_end_row(node),
                    score_function(node, &GO_PROFILE),
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
            if child.kind() != "function_declaration" {
                continue;
            }
            let name = node_name(src, child);
            let is_entry = name == "main" || name == "init";
            let is_test = name.starts_with("Test") || name.starts_with("Benchmark");
            if is_entry || is_test {
                add_node_rows(&mut footer, child, total);
            }
        }

        Ok(footer)
    }
}

fn find_descendant<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            return Some(child);
        }
        if let Some(found) = find_descendant(child, kinds) {
            return Some(found);
        }
    }
    None
}
