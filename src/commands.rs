//! Command implementations for flowmap CLI

use crate::cli::{Commands, OutputFormat};
use crate::config::{FlowmapConfig, CONFIG_FILE_NAME};
use crate::data::FlowLoader;
use crate::error::{FlowmapError, Result};
use crate::merge::{validate_flow_table, FlowMerger, ListNames};
use crate::output::{ConsoleSink, MappingWriter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::units::{LogSink, ReportSink};
use std::io;
use std::path::{Path, PathBuf};

/// Execute a command
pub fn execute_command(command: Commands, config_path: Option<&Path>, quiet: bool) -> Result<()> {
    match command {
        Commands::Init { force } => init_command(config_path, force, quiet),
        Commands::Merge {
            source,
            target,
            source_name,
            target_name,
            author,
            output,
            format,
        } => merge_command(
            config_path,
            MergeRequest {
                source,
                target,
                source_name,
                target_name,
                author,
                output,
                format,
            },
            quiet,
        ),
        Commands::Check { input } => check_command(&input, quiet),
    }
}

/// Arguments of `flowmap merge`
struct MergeRequest {
    source: PathBuf,
    target: PathBuf,
    source_name: Option<String>,
    target_name: Option<String>,
    author: Option<String>,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
}

/// Write a default configuration file
fn init_command(config_path: Option<&Path>, force: bool, quiet: bool) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?.join(CONFIG_FILE_NAME),
    };
    FlowmapConfig::write_default(&path, force)?;

    if !quiet {
        println!("✅ Created configuration: {}", path.display());
    }
    Ok(())
}

/// Reconcile two flow list files and write the mapping
fn merge_command(config_path: Option<&Path>, request: MergeRequest, quiet: bool) -> Result<()> {
    let config = FlowmapConfig::discover(config_path, &std::env::current_dir()?)?;

    let author = request
        .author
        .clone()
        .or_else(|| config.mapper.clone())
        .ok_or_else(|| {
            FlowmapError::invalid_input(
                "No mapper given: pass --author or set \"mapper\" in flowmap.json",
            )
        })?;

    let lists = ListNames::new(
        list_name(request.source_name.as_deref(), &request.source)?,
        list_name(request.target_name.as_deref(), &request.target)?,
    );

    let format = request
        .format
        .or_else(|| request.output.as_deref().and_then(OutputFormat::from_extension))
        .unwrap_or(config.output_format);

    // Summaries would corrupt a mapping written to stdout
    let interactive = !quiet && request.output.is_some();

    let mut progress = if interactive {
        ProgressReporter::new_for_merge()
    } else {
        ProgressReporter::new_minimal()
    };

    let loader = FlowLoader::new()?;
    let source = loader.load_flows(&request.source)?;
    let target = loader.load_flows(&request.target)?;
    progress.finish_load(&format!(
        "Loaded {} source and {} target flows",
        source.len(),
        target.len()
    ));

    let merger = FlowMerger::new(config.merge_settings());
    let mut console = ConsoleSink::default();
    let mut log_sink = LogSink;
    let sink: &mut dyn ReportSink = if interactive { &mut console } else { &mut log_sink };

    let outcome = progress.suspend(|| merger.run(&source, &target, &lists, &author, sink))?;
    progress.finish_match(&format!("Matched {} flows", outcome.summary.confirmed_matches()));

    match &request.output {
        Some(path) => {
            MappingWriter::write_to_path(&outcome.mapping, path, format)?;
            progress.finish_write(&format!("Wrote {}", path.display()));
        }
        None => MappingWriter::write(&outcome.mapping, io::stdout().lock(), format)?,
    }
    progress.clear();

    if interactive {
        PrettyPrinter::print_merge_summary(&outcome.summary, (&lists.source, &lists.target));
        if let Some(path) = &request.output {
            println!("\n💾 Mapping saved to: {}", path.display());
        }
    }

    Ok(())
}

/// Validate that a flow list satisfies the merge preconditions
fn check_command(input: &Path, quiet: bool) -> Result<()> {
    let loader = FlowLoader::new()?;
    let flows = loader.load_flows(input)?;
    validate_flow_table(&flows, &input.display().to_string())?;

    if !quiet {
        PrettyPrinter::print_check_result(input, flows.len(), flows.columns());
    }
    Ok(())
}

/// Explicit list name, else the file stem
fn list_name(explicit: Option<&str>, path: &Path) -> Result<String> {
    if let Some(name) = explicit {
        return Ok(name.to_string());
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            FlowmapError::invalid_input(format!(
                "Cannot derive a list name from {}; pass it explicitly",
                path.display()
            ))
        })
}
