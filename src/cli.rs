use crate::config::{LayoutConfig, load_config};
use crate::gedcom::serialize_gedcom;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::model::{Orientation, ProjectType};
use crate::project::{
    FamilyTreeProject, export_project_json, import_project, project_from_gedcom_with_config,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "famgraph",
    version,
    about = "Family tree layout and GEDCOM conversion"
)]
pub struct Args {
    /// Input file (.ged or .json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Format of stdin input
    #[arg(long = "from", value_enum, default_value = "gedcom")]
    pub from: InputFormat,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "project")]
    pub output_format: OutputFormat,

    /// Override the project's orientation
    #[arg(long = "orientation", value_enum)]
    pub orientation: Option<Orientation>,

    /// Override the project's type
    #[arg(long = "project-type", value_enum)]
    pub project_type: Option<ProjectType>,

    /// Layout config JSON file (node size, spacing, margins)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Gedcom,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Project,
    Gedcom,
    Layout,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = load_config(args.config.as_deref())?;

    let (input, format) = read_input(args.input.as_deref(), args.from)?;
    let mut project = load_project(args.input.as_deref(), &input, format, &config)?;

    let mut needs_layout = false;
    if let Some(orientation) = args.orientation {
        needs_layout |= project.layout.orientation != orientation;
        project.layout.orientation = orientation;
    }
    if let Some(project_type) = args.project_type {
        needs_layout |= project.meta.project_type != project_type;
        project.meta.project_type = project_type;
    }
    if needs_layout || args.output_format == OutputFormat::Layout {
        project.relayout(&config);
    }

    emit(&project, args.output_format, args.output.as_deref(), &config)
}

/// Writes the requested format. A layout dump bound for a file is streamed
/// straight to it; everything else is rendered to a string first.
fn emit(
    project: &FamilyTreeProject,
    format: OutputFormat,
    output: Option<&Path>,
    config: &LayoutConfig,
) -> Result<()> {
    match (format, output) {
        (OutputFormat::Layout, Some(path)) if path != Path::new("-") => {
            write_layout_dump(path, &layout_dump(project, config))
                .with_context(|| format!("failed to write {}", path.display()))
        }
        _ => {
            let rendered = render_output(project, format, config)?;
            write_output(&rendered, output)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>, stdin_format: InputFormat) -> Result<(String, InputFormat)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, stdin_format));
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok((content, detect_format(path, stdin_format)));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, stdin_format))
}

fn detect_format(path: &Path, fallback: InputFormat) -> InputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("ged") => InputFormat::Gedcom,
        Some("json") => InputFormat::Json,
        _ => fallback,
    }
}

fn load_project(
    path: Option<&Path>,
    input: &str,
    format: InputFormat,
    config: &LayoutConfig,
) -> Result<FamilyTreeProject> {
    match format {
        InputFormat::Json => {
            let project = import_project(input)?;
            debug!(name = %project.meta.name, "loaded project file");
            Ok(project)
        }
        InputFormat::Gedcom => {
            let name = project_name(path);
            Ok(project_from_gedcom_with_config(&name, input, config))
        }
    }
}

fn project_name(path: Option<&Path>) -> String {
    path.filter(|p| *p != Path::new("-"))
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| crate::project::DEFAULT_PROJECT_NAME.to_string())
}

fn render_output(
    project: &FamilyTreeProject,
    format: OutputFormat,
    config: &LayoutConfig,
) -> Result<String> {
    match format {
        OutputFormat::Project => Ok(export_project_json(project)?),
        OutputFormat::Gedcom => Ok(serialize_gedcom(&project.persons, &project.relationships)),
        OutputFormat::Layout => {
            let mut buf = Vec::new();
            layout_dump(project, config).write_to(&mut buf)?;
            Ok(String::from_utf8(buf)?)
        }
    }
}

fn layout_dump(project: &FamilyTreeProject, config: &LayoutConfig) -> LayoutDump {
    let result = crate::layout::LayoutResult {
        node_positions: project.layout.node_positions.clone(),
    };
    LayoutDump::from_layout(
        &result,
        &project.persons,
        &project.relationships,
        project.layout.orientation,
        project.meta.project_type,
        config,
    )
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) if path != Path::new("-") => std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display())),
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0 HEAD\n0 @I1@ INDI\n1 NAME Mario /Rossi/\n1 SEX M\n\
0 @I2@ INDI\n1 NAME Anna /Bianchi/\n1 SEX F\n\
0 @F1@ FAM\n1 HUSB @I1@\n1 WIFE @I2@\n1 MARR\n0 TRLR";

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "famgraph",
            "-i",
            "tree.ged",
            "-e",
            "layout",
            "--orientation",
            "horizontal",
            "--project-type",
            "friend-cluster",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.output_format, OutputFormat::Layout);
        assert_eq!(args.orientation, Some(Orientation::Horizontal));
        assert_eq!(args.project_type, Some(ProjectType::FriendCluster));
        assert_eq!(args.from, InputFormat::Gedcom);
        assert!(args.verbose);
    }

    #[test]
    fn detects_input_format_from_extension() {
        assert_eq!(
            detect_format(Path::new("a.GED"), InputFormat::Json),
            InputFormat::Gedcom
        );
        assert_eq!(
            detect_format(Path::new("a.json"), InputFormat::Gedcom),
            InputFormat::Json
        );
        assert_eq!(
            detect_format(Path::new("a.txt"), InputFormat::Json),
            InputFormat::Json
        );
    }

    #[test]
    fn gedcom_input_becomes_named_project() {
        let config = LayoutConfig::default();
        let project = load_project(
            Some(Path::new("dir/rossi.ged")),
            SAMPLE,
            InputFormat::Gedcom,
            &config,
        )
        .unwrap();
        assert_eq!(project.meta.name, "rossi");
        assert_eq!(project.persons.len(), 2);
        assert_eq!(project.layout.node_positions.len(), 2);
    }

    #[test]
    fn stdin_project_gets_default_name() {
        assert_eq!(project_name(Some(Path::new("-"))), "Nuovo Progetto");
        assert_eq!(project_name(None), "Nuovo Progetto");
    }

    #[test]
    fn renders_each_output_format() {
        let config = LayoutConfig::default();
        let project = load_project(None, SAMPLE, InputFormat::Gedcom, &config).unwrap();

        let json = render_output(&project, OutputFormat::Project, &config).unwrap();
        let reloaded = import_project(&json).unwrap();
        assert_eq!(reloaded.persons, project.persons);

        let ged = render_output(&project, OutputFormat::Gedcom, &config).unwrap();
        assert!(ged.contains("1 HUSB @I1@"));

        let dump = render_output(&project, OutputFormat::Layout, &config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&dump).unwrap();
        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn layout_dump_goes_straight_to_file() {
        let config = LayoutConfig::default();
        let mut project = load_project(None, SAMPLE, InputFormat::Gedcom, &config).unwrap();
        project.relayout(&config);
        let path = std::env::temp_dir().join(format!("famgraph-dump-{}.json", std::process::id()));

        emit(&project, OutputFormat::Layout, Some(path.as_path()), &config).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["kind"], "familyTree");
        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(written, render_output(&project, OutputFormat::Layout, &config).unwrap());
    }
}
