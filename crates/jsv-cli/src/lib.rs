//! # jsv CLI — Command-Line Validation
//!
//! Validates an instance file against a schema file. When the schema
//! argument is omitted, the instance is validated against the bundled
//! draft-04 meta-schema — handy for checking that a schema document is
//! itself well-formed. A supplied schema is always checked against the
//! meta-schema before the instance runs, so authoring mistakes surface
//! as schema errors rather than as baffling instance results.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use jsv_http::{HttpLoader, HttpLoaderConfig};
use jsv_schema::{ValidationError, Validator};

/// The bundled draft-04 meta-schema.
const META_SCHEMA_TEXT: &str = include_str!("../schema/json-schema-draft-04.json");

/// jsv — JSON Schema draft-04 validation.
///
/// Validates <INSTANCE> against <SCHEMA>; if <SCHEMA> is omitted, the
/// instance is validated against the JSON Schema draft-04 meta-schema.
#[derive(Parser, Debug)]
#[command(name = "jsv", version, about)]
pub struct Cli {
    /// Instance document to validate.
    pub instance: PathBuf,

    /// Schema to validate against (defaults to the draft-04 meta-schema).
    pub schema: Option<PathBuf>,

    /// Pre-register externally-referenced schema files (comma-separated
    /// or repeated).
    #[arg(short, long, value_delimiter = ',')]
    pub register: Vec<PathBuf>,

    /// Fetch unresolved remote $refs over HTTP.
    #[arg(long)]
    pub remote: bool,
}

/// The outcome of a validation run, for exit-code mapping.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The instance conforms.
    Valid,
    /// The schema or the instance does not conform; violations were printed.
    Invalid,
}

/// Parse the bundled draft-04 meta-schema.
pub fn meta_schema() -> Result<Value> {
    serde_json::from_str(META_SCHEMA_TEXT)
        .context("bundled draft-04 meta-schema is not valid JSON")
}

fn load_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not valid JSON", path.display()))
}

fn report(label: &str, errors: &[ValidationError]) -> Result<()> {
    println!("{label}:");
    println!("{}", serde_json::to_string_pretty(errors)?);
    Ok(())
}

/// Run a validation per the parsed arguments.
///
/// IO and JSON-parse failures return `Err`; schema or instance
/// non-conformance is an `Ok(Outcome::Invalid)` with violations printed.
pub fn run(cli: &Cli) -> Result<Outcome> {
    let meta = meta_schema()?;
    let instance = load_json(&cli.instance)?;
    let schema = match &cli.schema {
        Some(path) => load_json(path)?,
        None => {
            tracing::debug!("no schema argument; validating against the draft-04 meta-schema");
            meta.clone()
        }
    };

    // A supplied schema must itself be valid draft-04.
    if cli.schema.is_some() {
        let mut meta_validator = Validator::new();
        let schema_errors = meta_validator.validate(&schema, &meta);
        if !schema_errors.is_empty() {
            report("schema is not valid JSON Schema draft-04", &schema_errors)?;
            return Ok(Outcome::Invalid);
        }
    }

    let errors = if cli.remote {
        let loader = HttpLoader::new(HttpLoaderConfig::default())
            .context("failed to build the HTTP loader")?;
        let mut validator = Validator::with_loader(Arc::new(loader));
        for path in &cli.register {
            let document = load_json(path)?;
            validator.register(&document, None);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start the async runtime")?;
        runtime.block_on(validator.validate_async(&instance, &schema))
    } else {
        let mut validator = Validator::new();
        for path in &cli.register {
            let document = load_json(path)?;
            validator.register(&document, None);
        }
        validator.validate(&instance, &schema)
    };

    if errors.is_empty() {
        println!("validation OK");
        Ok(Outcome::Valid)
    } else {
        report("validation errors", &errors)?;
        Ok(Outcome::Invalid)
    }
}
