//! Command-line interface implementation.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;
use url::Url;

use crate::config::PreConversionSpec;

/// Built-in transform configurations.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// CoffeeScript through `coffee -spb`
    Coffee,
    /// TypeScript through `esbuild --loader=ts`
    Typescript,
    /// TSX through esbuild with CommonJS output and JSX transform
    Tsx,
}

impl Preset {
    pub fn spec(self) -> PreConversionSpec {
        match self {
            Preset::Coffee => PreConversionSpec::coffeescript(),
            Preset::Typescript => PreConversionSpec::typescript(),
            Preset::Tsx => PreConversionSpec::typescript_jsx(),
        }
    }
}

/// What to write for each compiled template.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emit {
    /// The template rendered with the given bindings
    Rendered,
    /// The compiled node sequence as JSON
    Nodes,
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Pre-convert interpolated script templates through an external compiler",
    long_about = None
)]
pub struct Args {
    /// Template file, or a directory of templates
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Output file, or output directory when TEMPLATE is a directory
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Pre-conversion config file (JSON or YAML), or a directory holding one
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Built-in configuration used when no config file is given
    #[arg(short, long, value_enum, default_value_t = Preset::Typescript)]
    pub preset: Preset,

    /// Override the transform program
    #[arg(long, value_name = "PROGRAM")]
    pub command: Option<String>,

    /// Override the transform program's arguments (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub command_args: Vec<String>,

    /// Bindings file (JSON or YAML) used for rendering
    #[arg(long, value_name = "BINDINGS")]
    pub bindings: Option<PathBuf>,

    /// Read bindings from stdin
    #[arg(short, long)]
    pub stdin: bool,

    /// What to emit for each template
    #[arg(long, value_enum, default_value_t = Emit::Rendered)]
    pub emit: Emit,

    /// Glob selecting templates inside a directory (repeatable)
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Base URL that `@{...}` values are resolved against
    #[arg(long, value_name = "URL")]
    pub base_url: Option<Url>,

    /// Force overwrite of an existing output directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
