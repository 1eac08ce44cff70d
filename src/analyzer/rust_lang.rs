//! Structural analyzer for Rust sources.

use std::collections::BTreeSet;

use tree_sitter::Node;

use crate::complexity::{score_function, ComplexityProfile};
use crate::error::Result;
use crate::syntax::Language;

use super::{
    add_node_rows, add_signature_rows, collect_function_nodes, footer_window_start, node_end_row,
    node_name, node_text, FunctionAnalysis, StructuralAnalyzer,
};

pub const RUST_PROFILE: ComplexityProfile = ComplexityProfile {
    branch_kinds: &["if_expression", "match_arm"],
    loop_kinds: &["for_expression", "while_expression", "loop_expression"],
    handler_kinds: &["try_expression"],
    binary_kinds: &["binary_expression"],
    logical_operators: &["&&", "||"],
    function_kinds: &["function_item", "closure_expression"],
    parameters_field: "parameters",
    bonus_kinds: &[
        ("unsafe_block", 0.3),
        ("await_expression", 0.2),
        ("type_parameters", 0.2),
        ("lifetime", 0.1),
        ("attribute_item", 0.1),
        ("macro_invocation", 0.1),
    ],
};

const FUNCTION_KINDS: &[&str] = &["function_item"];

pub struct RustAnalyzer;

impl StructuralAnalyzer for RustAnalyzer {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::Rust]
    }

    fn profile(&self) -> &'static ComplexityProfile {
        &RUST_PROFILE
    }

    fn header_lines(&self, lines: &[&str], _src: &[u8], root: Node) -> Result<BTreeSet<usize>> {
        let total = lines.len();
        let mut header = BTreeSet::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "use_declaration" | "extern_crate_declaration" | "inner_attribute_item" => {
                    add_node_rows(&mut header, child, total);
                }
                "struct_item" | "enum_item" | "union_item" | "trait_item" | "impl_item"
                | "mod_item" => {
                    let body = child.child_by_field_name("body");
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
                    score_function(node, &RUST_PROFILE),
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
            match child.kind() {
                "function_item" => {
                    let is_main = node_name(src, child) == "main";
                    if is_main || has_test_attribute(child, src) {
                        reserve_with_attributes(&mut footer, child, total);
                    }
                }
                "mod_item" => {
                    let is_tests = node_name(src, child) == "tests";
                    if is_tests || has_cfg_test_attribute(child, src) {
                        reserve_with_attributes(&mut footer, child, total);
                    }
                }
                "static_item" => {
                    add_node_rows(&mut footer, child, total);
                }
                _ => {}
            }
        }

        Ok(footer)
    }
}

/// Attributes precede their item as sibling nodes; reserve them with it so a
/// kept `#[test]` does not dangle over an elided body.
fn reserve_with_attributes(footer: &mut BTreeSet<usize>, item: Node, total: usize) {
    add_node_rows(footer, item, total);
    let mut prev = item.prev_sibling();
    while let Some(attr) = prev {
        if attr.kind() != "attribute_item" {
            break;
        }
        add_node_rows(footer, attr, total);
        prev = attr.prev_sibling();
    }
}

fn has_test_attribute(item: Node, src: &[u8]) -> bool {
    preceding_attribute_text(item, src, |text| text.contains("test"))
}

fn has_cfg_test_attribute(item: Node, src: &[u8]) -> bool {
    preceding_attribute_text(item, src, |text| text.contains("cfg(test"))
}

fn preceding_attribute_text(item: Node, src: &[u8], pred: impl Fn(&str) -> bool) -> bool {
    let mut prev = item.prev_sibling();
    while let Some(attr) = prev {
        if attr.kind() != "attribute_item" {
            return false;
        }
        if pred(node_text(src, attr)) {
            return true;
        }
        prev = attr.prev_sibling();
    }
    false
}
