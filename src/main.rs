use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use codeshear::config::{load_config, resolve_line_limit, LINE_LIMIT_ENV};
use codeshear::engine::truncate_source;
use codeshear::output::{build_document, OutputStyle};
use codeshear::packer::{pack_tree, PackOptions};

#[derive(Debug, Parser)]
#[command(name = "codeshear")]
#[command(version)]
#[command(about = "Pack a source tree into one LLM-ready document under a per-file line budget")]
struct Cli {
    /// File or directory to pack.
    #[arg(value_name = "PATH", default_value = ".")]
    target: PathBuf,

    /// Per-file line budget; oversized files are structurally truncated.
    /// Unset means files pass through untouched.
    #[arg(long, short = 'l')]
    line_limit: Option<usize>,

    /// Document style for tree mode.
    #[arg(long, value_enum, default_value = "xml")]
    style: OutputStyle,

    /// Write the document here instead of stdout.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Extra directory names to exclude from the scan.
    #[arg(long, value_name = "DIR")]
    exclude: Vec<String>,

    /// Print the JSON run summary to stderr.
    #[arg(long)]
    report: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let target = if cli.target.is_absolute() {
        cli.target.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current dir")?
            .join(&cli.target)
    };

    let meta = std::fs::metadata(&target)
        .with_context(|| format!("Target does not exist: {}", target.display()))?;

    // Single-file mode: truncate one file to stdout, no document wrapper.
    if meta.is_file() {
        let cfg_root = target.parent().unwrap_or(&target);
        let cfg = load_config(cfg_root);
        let line_limit = resolve_line_limit(
            cli.line_limit,
            std::env::var(LINE_LIMIT_ENV).ok().as_deref(),
            cfg.line_limit,
        );

        let text = std::fs::read_to_string(&target)
            .with_context(|| format!("Failed to read {}", target.display()))?;
        let result = truncate_source(&target, &text, None, line_limit)?;

        if cli.report {
            eprintln!("{}", serde_json::to_string_pretty(&result.report)?);
        }
        print!("{}", result.text);
        return Ok(());
    }

    let cfg = load_config(&target);
    let line_limit = resolve_line_limit(
        cli.line_limit,
        std::env::var(LINE_LIMIT_ENV).ok().as_deref(),
        cfg.line_limit,
    );

    let mut exclude_dir_names = cfg.scan.exclude_dir_names.clone();
    exclude_dir_names.extend(cli.exclude.iter().cloned());

    let opts = PackOptions {
        line_limit,
        exclude_dir_names,
        max_file_bytes: cfg.effective_max_file_bytes(),
        progress: cli.output.is_some(),
    };

    let (files, summary) = pack_tree(&target, &opts)?;
    let document = build_document(cli.style, &files)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Packed {} files ({} truncated) into {}",
                summary.files_packed,
                summary.files_truncated,
                path.display()
            );
        }
        None => print!("{document}"),
    }

    if cli.report {
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    }
    for inf in &summary.infeasible {
        eprintln!(
            "note: {} needs a line limit of at least {}; included unmodified",
            inf.path, inf.minimum_required
        );
    }

    Ok(())
}
