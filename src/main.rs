//! Command-line entry point.
//! Compiles a template file, or every template in a directory, and writes the
//! rendered output or the compiled node sequence.

use std::io::Read;
use std::path::{Path, PathBuf};

use preconvert::{
    cli::{get_args, Args, Emit},
    config::{load_bindings, load_config, parse_bindings, PreConversionSpec, TransformCommand},
    constants::DEFAULT_TEMPLATE_GLOB,
    discover::{build_globset, find_templates, resolve_target_path},
    error::{default_error_handler, Error, Result},
    loader::load_template,
    logger::init_logger,
    processor::Processor,
    renderer::{JavascriptRenderer, TemplateRenderer},
    runner::SubprocessRunner,
    template::CompiledTemplate,
};

fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Builds the spec from a config file or preset, then applies command overrides.
fn resolve_spec(args: &Args) -> Result<PreConversionSpec> {
    let mut spec = match &args.config {
        Some(path) => load_config(path)?,
        None => args.preset.spec(),
    };
    if let Some(program) = &args.command {
        spec.command =
            TransformCommand::new(program.clone()).with_args(args.command_args.clone());
    } else if !args.command_args.is_empty() {
        spec.command.args = args.command_args.clone();
    }
    spec.validate()?;
    Ok(spec)
}

fn resolve_bindings(args: &Args) -> Result<serde_json::Value> {
    if args.stdin {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return parse_bindings(&buffer);
    }
    match &args.bindings {
        Some(path) => load_bindings(path),
        None => parse_bindings(""),
    }
}

/// Ensures the output directory is safe to write to.
fn get_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

fn emit(
    compiled: &CompiledTemplate,
    mode: Emit,
    renderer: &dyn TemplateRenderer,
    bindings: &serde_json::Value,
) -> Result<String> {
    match mode {
        Emit::Rendered => renderer.render(compiled, bindings),
        Emit::Nodes => serde_json::to_string_pretty(compiled)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| Error::RenderError(e.to_string())),
    }
}

fn write_file<P: AsRef<Path>>(content: &str, dest_path: P) -> Result<()> {
    let dest_path = dest_path.as_ref();
    if let Some(parent) = dest_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest_path, content).map_err(Error::IoError)
}

/// Main application logic.
///
/// # Flow
/// 1. Resolves the pre-conversion spec and the render bindings
/// 2. Compiles the template, or each template found in the directory
/// 3. Writes the rendered output or compiled nodes
fn run(args: Args) -> Result<()> {
    let spec = resolve_spec(&args)?;
    let bindings = resolve_bindings(&args)?;
    let runner = SubprocessRunner::new();
    let processor = Processor::new(&spec, &runner);
    let renderer = match &args.base_url {
        Some(base) => JavascriptRenderer::with_base_url(base.clone()),
        None => JavascriptRenderer::new(),
    };

    if !args.template.is_dir() {
        let compiled = load_template(&args.template, &processor)?;
        let content = emit(&compiled, args.emit, &renderer, &bindings)?;
        match &args.output {
            Some(path) => write_file(&content, path)?,
            None => print!("{content}"),
        }
        return Ok(());
    }

    let output_root = args
        .output
        .as_ref()
        .ok_or_else(|| {
            Error::ConfigError(
                "an output directory is required for a template directory".to_string(),
            )
        })
        .and_then(|dir| get_output_dir(dir, args.force))?;
    let patterns = if args.include.is_empty() {
        vec![DEFAULT_TEMPLATE_GLOB.to_string()]
    } else {
        args.include.clone()
    };
    let globs = build_globset(&patterns)?;
    let templates = find_templates(&args.template, &globs)?;

    let mut failed = 0;
    for template in &templates {
        let target = resolve_target_path(
            template.as_path(),
            args.template.as_path(),
            output_root.as_path(),
        );
        let result = load_template(template, &processor)
            .and_then(|compiled| emit(&compiled, args.emit, &renderer, &bindings))
            .and_then(|content| write_file(&content, &target));
        match result {
            Ok(()) => println!("compiled: '{}'", target.display()),
            Err(e) => {
                failed += 1;
                log::error!("{}: {}", template.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(Error::BatchError {
            failed,
            total: templates.len(),
        });
    }
    println!("Compiled {} templates into {}.", templates.len(), output_root.display());
    Ok(())
}
