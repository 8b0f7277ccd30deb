// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use feature_repo::config::{load_repositories, RepositoryFormat};
use feature_repo::definitions::Value;
use feature_repo::errors::LoadError;
use feature_repo::registry::Registry;
use feature_repo::transforms::{FeatureVector, OnDemandInputs, RowBatch, TransformCatalog};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: feature-repo <command> [args] <repo.yaml|repo.toml>...

Commands:
  validate                                      Load, merge and validate repository files
  plan [--format json|yaml]                     Print the deployable manifest
  resolve <service>                             Print a feature service's dependency closure
  run <view> <rows-json>...                     Run a batch or stream view over JSON rows
  evaluate <view> <request-json> [<features-json>]
                                                Evaluate an on-demand view locally

Arguments ending in .yaml, .yml or .toml are repository files; everything else
is a command argument. Set RUST_LOG to change log verbosity (default: info).";

/// Command-line arguments split into repository files and everything else.
struct Invocation {
    command: String,
    args: Vec<String>,
    repos: Vec<PathBuf>,
}

impl Invocation {
    fn parse(mut argv: impl Iterator<Item = String>) -> Option<Self> {
        let command = argv.next()?;
        let (repos, args): (Vec<String>, Vec<String>) =
            argv.partition(|arg| RepositoryFormat::from_path(Path::new(arg)).is_some());
        Some(Self {
            command,
            args,
            repos: repos.into_iter().map(PathBuf::from).collect(),
        })
    }

    fn arg(&self, index: usize, name: &str) -> Result<&str> {
        self.args
            .get(index)
            .map(String::as_str)
            .with_context(|| format!("missing <{}> argument for '{}'", name, self.command))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(invocation) = Invocation::parse(env::args().skip(1)) else {
        eprintln!("{}", USAGE);
        process::exit(2);
    };

    if let Err(e) = run(&invocation) {
        eprintln!("❌ {:#}", e);
        process::exit(1);
    }
}

fn run(invocation: &Invocation) -> Result<()> {
    match invocation.command.as_str() {
        "validate" => validate(invocation),
        "plan" => plan(invocation),
        "resolve" => resolve(invocation),
        "run" => run_view(invocation),
        "evaluate" => evaluate(invocation),
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    }
}

fn build_registry(repos: &[PathBuf]) -> Result<Registry> {
    let catalog = TransformCatalog::builtin();
    let repository = load_repositories(repos).map_err(|e| match e {
        LoadError::NoFiles => anyhow::anyhow!("no repository files given\n\n{}", USAGE),
        other => anyhow::Error::new(other),
    })?;
    // Registry::build runs the single validation pass
    Registry::build(repository, catalog).context("failed to build registry")
}

fn validate(invocation: &Invocation) -> Result<()> {
    let registry = build_registry(&invocation.repos)?;

    println!("✅ Workspace '{}' is valid", registry.workspace());
    println!("   Entities:         {}", registry.entities().len());
    println!("   Data sources:     {}", registry.sources().len());
    println!("   Feature views:    {}", registry.feature_views().len());
    println!("   Feature services: {}", registry.feature_services().len());
    Ok(())
}

fn plan(invocation: &Invocation) -> Result<()> {
    let format = match invocation.args.as_slice() {
        [] => "json",
        [flag, format] if flag == "--format" => format.as_str(),
        other => bail!("unexpected plan arguments: {:?}", other),
    };

    let manifest = build_registry(&invocation.repos)?.manifest();
    let rendered = match format {
        "json" => manifest.to_json().context("failed to render manifest as JSON")?,
        "yaml" => manifest.to_yaml().context("failed to render manifest as YAML")?,
        other => bail!("unsupported manifest format '{}' (expected json or yaml)", other),
    };
    println!("{}", rendered);
    Ok(())
}

fn resolve(invocation: &Invocation) -> Result<()> {
    let service = invocation.arg(0, "service")?;
    let resolved = build_registry(&invocation.repos)?.resolve_service(service)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

/// Rows are JSON arrays of objects; columns follow the first row's keys.
fn parse_rows(json: &str) -> Result<RowBatch> {
    let rows: Vec<FeatureVector> =
        serde_json::from_str(json).context("rows must be a JSON array of objects")?;
    let columns: Vec<String> = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();

    let mut batch = RowBatch::new(columns.iter().map(String::as_str).collect());
    for row in rows {
        let values = columns
            .iter()
            .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        batch.push_row(values)?;
    }
    Ok(batch)
}

fn run_view(invocation: &Invocation) -> Result<()> {
    let view = invocation.arg(0, "view")?;
    let inputs = invocation.args[1..]
        .iter()
        .map(|json| parse_rows(json))
        .collect::<Result<Vec<_>>>()?;

    let output = build_registry(&invocation.repos)?.run_batch_view(view, inputs)?;
    let rows: Vec<FeatureVector> = (0..output.len()).filter_map(|i| output.row(i)).collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn evaluate(invocation: &Invocation) -> Result<()> {
    let view = invocation.arg(0, "view")?;
    let request: FeatureVector = serde_json::from_str(invocation.arg(1, "request-json")?)
        .context("request must be a JSON object")?;
    let features: BTreeMap<String, FeatureVector> = match invocation.args.get(2) {
        Some(json) => serde_json::from_str(json)
            .context("features must be a JSON object of feature view name to feature values")?,
        None => BTreeMap::new(),
    };

    let output = build_registry(&invocation.repos)?
        .evaluate_on_demand(view, &OnDemandInputs { request, features })?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
