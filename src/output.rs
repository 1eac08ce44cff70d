//! Final document assembly in the three supported styles.

use std::io::Cursor;

use anyhow::Result;
use clap::ValueEnum;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::packer::PackedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputStyle {
    Xml,
    Markdown,
    Plain,
}

pub fn build_document(style: OutputStyle, files: &[PackedFile]) -> Result<String> {
    match style {
        OutputStyle::Xml => build_xml(files),
        OutputStyle::Markdown => Ok(build_markdown(files)),
        OutputStyle::Plain => Ok(build_plain(files)),
    }
}

fn build_xml(files: &[PackedFile]) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("code_pack")))?;

    for file in files {
        let mut el = BytesStart::new("file");
        el.push_attribute(("path", file.rel_path.as_str()));
        el.push_attribute(("kept_lines", file.report.kept_lines.to_string().as_str()));
        el.push_attribute(("truncated", if file.report.truncated { "true" } else { "false" }));
        writer.write_event(Event::Start(el))?;
        writer.write_event(Event::CData(BytesCData::new(file.text.trim_end())))?;
        writer.write_event(Event::End(BytesEnd::new("file")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("code_pack")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn fence_tag(rel_path: &str) -> &str {
    match rel_path.rsplit('.').next() {
        Some("rs") => "rust",
        Some("ts" | "tsx" | "mts" | "cts") => "typescript",
        Some("js" | "jsx" | "mjs" | "cjs") => "javascript",
        Some("py" | "pyw") => "python",
        Some("go") => "go",
        _ => "",
    }
}

fn build_markdown(files: &[PackedFile]) -> String {
    let mut out = String::from("# Code pack\n");

    for file in files {
        out.push_str(&format!("\n## {}\n", file.rel_path));
        if file.report.truncated {
            out.push_str(&format!(
                "_truncated to {} lines_\n",
                file.report.kept_lines
            ));
        }
        out.push_str(&format!("```{}\n", fence_tag(&file.rel_path)));
        out.push_str(file.text.trim_end());
        out.push_str("\n```\n");
    }

    out
}

fn build_plain(files: &[PackedFile]) -> String {
    const RULE: &str = "================================================";
    let mut out = String::new();

    for file in files {
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!("File: {}\n", file.rel_path));
        out.push_str(RULE);
        out.push('\n');
        out.push_str(file.text.trim_end());
        out.push_str("\n\n");
    }

    out
}
