use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use image_meta::exif::{ImageInfo, locale};
use image_meta::loader::LoaderChain;
use image_meta::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "image-meta",
    version,
    about = "Read EXIF, IPTC and XMP metadata through exiv2, exiftool, embedded parsing or sidecar JSON"
)]
struct Cli {
    /// Image files or directories to read
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Output the flattened tag maps as JSON
    #[arg(long)]
    json: bool,

    /// Label language, e.g. "de" (overrides the config)
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,

    /// Path to the exiv2 executable
    #[arg(long, value_name = "FILE")]
    exiv2: Option<PathBuf>,

    /// Path to the exiftool executable
    #[arg(long, value_name = "FILE")]
    exiftool: Option<PathBuf>,

    /// Hide camera make and model
    #[arg(long = "no-model")]
    no_model: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    // Load config and apply CLI overrides
    let mut config = config::Config::load(cli.config.as_deref())?;
    if cli.exiv2.is_some() {
        config.loaders.exiv2_path = cli.exiv2.clone();
    }
    if cli.exiftool.is_some() {
        config.loaders.exiftool_path = cli.exiftool.clone();
    }
    if cli.no_model {
        config.output.show_model = false;
    }
    if cli.lang.is_some() {
        config.output.language = cli.lang.clone();
    }
    let lang = config.output.language.clone().unwrap_or_default();
    if !lang.is_empty() && !locale::is_supported(&lang) {
        log::warn!("No labels for language '{lang}', using English");
    }

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }
    log::info!("Found {} image(s)", images.len());

    let chain = LoaderChain::from_config(&config.loaders);
    log::info!("Source chain: {}", config.enabled_sources().join(" → "));

    let results: Vec<pipeline::ProcessResult> = images
        .iter()
        .map(|path| pipeline::process_image(path, &chain))
        .collect();

    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                let tags = r
                    .info
                    .as_ref()
                    .map(|info| locale::localize(&info.to_tag_map(), &lang));
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "source": r.source_used,
                    "tags": tags,
                    "error": r.error,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
    } else {
        for result in &results {
            match (&result.info, &result.error) {
                (Some(info), _) => print_info(
                    info,
                    result.source_used.as_deref(),
                    &config.output,
                    &lang,
                ),
                (None, Some(err)) => log::error!("{}: {err}", result.path.display()),
                (None, None) => {}
            }
        }
    }

    let success = results.iter().filter(|r| r.info.is_some()).count();
    log::info!(
        "Done: {success} with metadata, {} without, out of {} images",
        results.len() - success,
        results.len()
    );

    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;
/// Indent for continuation lines (tag column width + " : " = 25 chars + 2 leading spaces).
const INDENT: &str = "                           ";

/// Print the summary and detail tables of one image.
fn print_info(info: &ImageInfo, source: Option<&str>, output: &config::OutputConfig, lang: &str) {
    println!();
    println!("{BOLD}File:{RESET} {}", info.file.display());
    if let Some(source) = source {
        println!("{DIM}source: {source}{RESET}");
    }
    println!("{DIM}{}{RESET}", "═".repeat(72));

    let mut summary = info.to_info_map(output.show_model, &output.date_format);
    if let Some(size) = info.size {
        summary.push(("Size".to_string(), format!("{} x {}", size.width, size.height)));
    }
    summary.push(("Copyright".to_string(), info.copyright_text()));
    print_section("Summary", &summary, lang);
    print_section(
        "Metadata",
        &info.to_metadata_map(output.show_model, &output.date_format),
        lang,
    );
}

fn print_section(title: &str, rows: &[(String, String)], lang: &str) {
    if rows.is_empty() {
        return;
    }
    println!("  {BOLD}{title}{RESET}");
    println!("  {DIM}{}{RESET}", "─".repeat(70));
    for (label, value) in rows {
        print_row(locale::localize_label(label, lang), value);
    }
    println!();
}

/// Print a single row in the metadata display table.
fn print_row(tag: &str, val: &str) {
    let tag_col = format!("{:<22}", tag);
    let lines = wrap_text(val, VAL_WIDTH);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("  {tag_col} : {line}");
        } else {
            println!("  {INDENT}{line}");
        }
    }
}

/// Wrap text at word boundaries to fit within max_width.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(s.to_string());
    }

    lines
}
