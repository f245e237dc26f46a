//! # Validate Subcommand
//!
//! Validates one workflow file against the schema family its `version`
//! declares. When account resources are known (`--context FILE` or the
//! configuration's `context`), step references are checked as well.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use wfv_core::{OutputFormat, ValidationError};
use wfv_schema::{
    load_document_file, DispatchError, DispatcherConfig, SchemaDispatcher, ValidateOptions,
    ValidationContext, ValidationReport,
};

/// Arguments for the `wfv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Workflow file to validate (YAML or JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Diagnostic rendering: message, printify or lint.
    #[arg(long, value_name = "FORMAT")]
    pub output_format: Option<OutputFormat>,

    /// YAML file listing known registries, git integrations and clusters.
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Do not report warnings.
    #[arg(long)]
    pub ignore_warnings: bool,

    /// Fail on warnings.
    #[arg(long)]
    pub strict: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Result of validating a document that could be loaded and dispatched.
#[derive(Debug)]
pub enum ValidateOutcome {
    /// The document matches its schema family; warnings may remain.
    Valid(ValidationReport),
    /// Unsupported version or schema violations.
    Invalid(ValidationError),
}

impl ValidateOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Valid(_) => 0,
            Self::Invalid(_) => 1,
        }
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure. Operational
/// failures are returned as errors.
pub fn run_validate(args: &ValidateArgs, config: &DispatcherConfig) -> Result<u8> {
    let dispatcher = crate::build_dispatcher(config)?;
    let output_format = args.output_format.unwrap_or(config.output_format);
    let outcome = execute(&dispatcher, args, config)?;

    if args.json {
        let rendered = match &outcome {
            ValidateOutcome::Valid(report) => serde_json::to_string_pretty(report)?,
            ValidateOutcome::Invalid(err) => serde_json::to_string_pretty(err)?,
        };
        println!("{rendered}");
    } else {
        print!("{}", render_outcome(&outcome, output_format, &args.file));
    }
    Ok(outcome.exit_code())
}

/// Load `args.file` and dispatch it.
///
/// Validation failures, unsupported versions included, come back as
/// [`ValidateOutcome::Invalid`]; everything else is an error.
pub fn execute(
    dispatcher: &SchemaDispatcher,
    args: &ValidateArgs,
    config: &DispatcherConfig,
) -> Result<ValidateOutcome> {
    let (document, text) = load_document_file(&args.file)
        .with_context(|| format!("failed to load workflow {}", args.file.display()))?;

    let output_format = args.output_format.unwrap_or(config.output_format);
    let options = ValidateOptions {
        ignore_warnings: args.ignore_warnings || config.options.ignore_warnings,
        strict: args.strict || config.options.strict,
    };
    let context = match &args.context {
        Some(path) => Some(load_context(path)?),
        None => config.context.clone(),
    };

    let result = match &context {
        Some(context) => {
            dispatcher.validate_with_context(&document, output_format, &text, context, &options)
        }
        None => dispatcher.validate(&document, output_format, &text, &options),
    };

    match result {
        Ok(report) => {
            tracing::info!(
                file = %args.file.display(),
                version = %report.version,
                warnings = report.warnings.len(),
                "workflow is valid"
            );
            Ok(ValidateOutcome::Valid(report))
        }
        Err(DispatchError::Validation(err)) => {
            tracing::info!(
                file = %args.file.display(),
                errors = err.details().len(),
                "workflow is invalid"
            );
            Ok(ValidateOutcome::Invalid(err))
        }
        Err(err) => Err(err).context("validator could not be loaded"),
    }
}

/// Read a [`ValidationContext`] from a YAML file.
pub fn load_context(path: &Path) -> Result<ValidationContext> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read context file {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(ValidationContext::default());
    }
    serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse context file {}", path.display()))
}

/// Human-readable report for `outcome`.
fn render_outcome(outcome: &ValidateOutcome, output_format: OutputFormat, file: &Path) -> String {
    match outcome {
        ValidateOutcome::Valid(report) => {
            let mut out = format!(
                "{}: valid (schema version {})\n",
                file.display(),
                report.version
            );
            if !report.warnings.is_empty() {
                out.push_str(&format!("{} warning(s):\n", report.warnings.len()));
                out.push_str(&output_format.render(&report.warnings));
                out.push('\n');
            }
            out
        }
        ValidateOutcome::Invalid(err) => {
            format!(
                "{}: invalid\n{}\n",
                file.display(),
                output_format.render(err.details())
            )
        }
    }
}
