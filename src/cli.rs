//! Command-line interface for codestruct.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::{CodeAnalysisResult, CodeAnalyzer, Entity, FileStructureResult};
use crate::config::ScanConfig;
use crate::profile::{self, QueryName};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Extract a uniform structural inventory from multi-language source trees.
#[derive(Parser)]
#[command(name = "codestruct")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Structure every supported file under a directory
    Scan(ScanArgs),
    /// List language profiles
    Languages,
    /// Print the entity tree of one file
    Outline(OutlineArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// Directory to scan
    pub root: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to write the JSON result
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Upload the flattened result
    #[arg(long)]
    pub upload: bool,

    /// Upload endpoint (implies --upload)
    #[arg(long)]
    pub upload_url: Option<String>,

    /// Worker threads (0 = one per core)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Also write Markdown outlines into this directory
    #[arg(long)]
    pub learning_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct OutlineArgs {
    /// Source file to structure
    pub file: PathBuf,
}

/// Apply command-line overrides on top of the file configuration.
fn apply_overrides(mut config: ScanConfig, args: &ScanArgs) -> ScanConfig {
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(url) = &args.upload_url {
        config.upload_url = Some(url.clone());
        config.upload = true;
    }
    if args.upload {
        config.upload = true;
    }
    if let Some(workers) = args.workers {
        config.max_workers = workers;
    }
    config
}

fn spinner(quiet: bool, message: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs, quiet: bool) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir()?;
    let (config, config_path) = match ScanConfig::discover(args.config.as_deref(), &cwd) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if let Some(path) = &config_path {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let analyzer = match CodeAnalyzer::new(apply_overrides(config, args)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let pb = spinner(quiet, format!("Scanning {}", args.root.display()));
    let scanned = analyzer.analyze_directory(&args.root);
    pb.finish_and_clear();

    let result = match scanned {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let output = analyzer.export_result(&result)?;
    if let Some(receipt) = analyzer.upload_result(&result) {
        if !quiet {
            println!(
                "Uploaded analysis{}",
                receipt.id.map(|id| format!(" (id {})", id)).unwrap_or_default()
            );
        }
    }
    if let Some(dir) = &args.learning_dir {
        analyzer.generate_learning_materials(&result, dir)?;
    }

    if !quiet {
        write_summary(&result);
        println!("Wrote {}", output.display());
    }
    Ok(EXIT_SUCCESS)
}

/// Print scan counters and failed files.
pub fn write_summary(result: &CodeAnalysisResult) {
    let c = &result.counters;
    println!();
    println!("{}", "Scan summary".bold());
    println!("  Root:        {}", result.root);
    println!("  Files:       {}", c.files_scanned);
    println!("  Parsed:      {}", c.files_parsed.to_string().green());
    let failed = if c.files_failed > 0 {
        c.files_failed.to_string().red()
    } else {
        c.files_failed.to_string().normal()
    };
    println!("  Failed:      {}", failed);
    println!("  Unsupported: {}", c.files_unsupported.to_string().dimmed());
    println!("  Entities:    {}", c.entities);
    println!("  Elapsed:     {} ms", result.elapsed_ms);

    if !c.per_language.is_empty() {
        println!();
        for (language, count) in &c.per_language {
            println!("  {:<12} {}", language.cyan(), count);
        }
    }

    let failed: Vec<_> = result
        .failed_files()
        .filter(|f| f.language.is_some())
        .collect();
    if !failed.is_empty() {
        println!();
        println!("{}", "Failed files".red().bold());
        for file in failed {
            for error in &file.errors {
                println!("  {} {}", file.path.yellow(), error.message.dimmed());
            }
        }
    }
}

/// Run the languages command.
pub fn run_languages() -> anyhow::Result<i32> {
    let registry = profile::global()?;
    for profile in registry.profiles() {
        println!("{}", profile.id().bold());
        if !profile.aliases().is_empty() {
            println!("  aliases:    {}", profile.aliases().join(", "));
        }
        println!("  extensions: {}", profile.extensions().join(", "));
        let grammars: Vec<_> = profile.grammars().iter().map(|g| g.id.as_str()).collect();
        println!("  grammars:   {}", grammars.join(", "));
        let queries: Vec<_> = QueryName::ALL
            .iter()
            .map(|name| format!("{}@v{}", name, profile.query(*name).version()))
            .collect();
        println!("  queries:    {}", queries.join(" ").dimmed());
    }
    Ok(EXIT_SUCCESS)
}

/// Run the outline command.
pub fn run_outline(args: &OutlineArgs) -> anyhow::Result<i32> {
    let analyzer = CodeAnalyzer::new(ScanConfig::default())?;
    let result = analyzer.structure_file(&args.file);
    if result.is_failed() {
        for error in &result.errors {
            eprintln!("Error: {}", error.message);
        }
        return Ok(EXIT_ERROR);
    }
    write_outline(&result);
    Ok(EXIT_SUCCESS)
}

fn write_outline(file: &FileStructureResult) {
    println!(
        "{} ({})",
        file.path.bold(),
        file.language.as_deref().unwrap_or("unknown")
    );
    for entity in &file.entities {
        write_entity(entity, 1);
    }
}

fn write_entity(entity: &Entity, depth: usize) {
    let mut line = format!(
        "{}{} {}",
        "  ".repeat(depth),
        entity.kind.as_str().cyan(),
        entity.name
    );
    if let Some(ty) = &entity.declared_type {
        line.push_str(&format!(": {}", ty));
    }
    if let Some(ret) = &entity.return_type {
        line.push_str(&format!(" -> {}", ret));
    }
    if let Some(reference) = &entity.reference {
        line.push_str(&format!(" {}", format!("[{}]", reference).dimmed()));
    }
    println!("{}  {}", line, format!("{}", entity.span).dimmed());
    for child in &entity.children {
        write_entity(child, depth + 1);
    }
}
