//! Minimal CLI: (count | test | schemas) over JSON ASTs
use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use ast_match::{AstMatch, Registry};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// classify ESTree-style JSON ASTs by structural schema
#[derive(Parser, Debug)]
#[command(name = "ast-match")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// count the AST nodes matching a schema in each input
    Count(CountOut),
    /// test whether each input document matches a schema
    Test(TestOut),
    /// list the registered schemas
    Schemas(SchemasOut),
}

#[derive(Args, Debug, Clone)]
struct CatalogSettings {
    /// extra catalog files (JSON object of name -> schema), applied in order
    #[arg(long, num_args = 1..)]
    catalog: Vec<PathBuf>,

    /// do not load the built-in ECMAScript catalog
    #[arg(long, default_value_t = false)]
    no_builtin: bool,

    /// maximum descent depth while matching
    #[arg(long, default_value_t = ast_match::matcher::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /body/0)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CountOut {
    #[command(flatten)]
    catalog_settings: CatalogSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// schema name, or an inline JSON schema object
    #[arg(long, short)]
    schema: String,
}

#[derive(clap::Parser, Debug)]
struct TestOut {
    #[command(flatten)]
    catalog_settings: CatalogSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// schema name, or an inline JSON schema object
    #[arg(long, short)]
    schema: String,
}

#[derive(clap::Parser, Debug)]
struct SchemasOut {
    #[command(flatten)]
    catalog_settings: CatalogSettings,

    /// also report references to unregistered schemas
    #[arg(long, default_value_t = false)]
    check: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CatalogSettings {
    fn load(&self) -> Result<AstMatch> {
        let mut registry = if self.no_builtin {
            Registry::new()
        } else {
            Registry::estree().context("failed to load the built-in catalog")?
        };
        for path in &self.catalog {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog file {}", path.display()))?;
            let count = registry
                .import_str(&source)
                .with_context(|| format!("failed to import catalog {}", path.display()))?;
            tracing::info!(path = %path.display(), count, "imported catalog");
        }
        Ok(AstMatch::new(registry).with_max_depth(self.max_depth))
    }
}

impl InputSettings {
    fn load_process(&self, mut apply: impl FnMut(&str, &Value) -> Result<()>) -> Result<()> {
        let source_paths =
            resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            if self.ndjson {
                for (index, line) in source.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
                    let label = format!("{source_path_str}:{}", index + 1);
                    let json_value = parse_json(&line, &label)?;
                    apply(&label, self.select(&json_value, &label)?)?;
                }
            } else {
                let json_value = parse_json(&source, &source_path_str)?;
                apply(&source_path_str, self.select(&json_value, &source_path_str)?)?;
            }
        }
        Ok(())
    }

    fn select<'v>(&self, json_value: &'v Value, label: &str) -> Result<&'v Value> {
        match self.json_pointer.as_deref() {
            None => Ok(json_value),
            Some(pointer) => json_value
                .pointer(pointer)
                .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in {label}")),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        self.execute(&mut stdout.lock())
    }
    fn execute(&self, out: &mut impl Write) -> Result<()> {
        match &self.cmd {
            Command::Count(target) => {
                let am = target.catalog_settings.load()?;
                let schema = parse_schema_arg(&target.schema)?;
                // fail fast on a bad schema before touching inputs
                am.prepare(&schema)?;
                let mut total = 0usize;
                target.input_settings.load_process(|label, document| {
                    let count = am.count(document, &schema)?;
                    total += count;
                    writeln!(out, "{label}\t{}", count.to_string().bold())?;
                    Ok(())
                })?;
                writeln!(out, "{}\t{}", "total".dimmed(), total.to_string().green().bold())?;
            }
            Command::Test(target) => {
                let am = target.catalog_settings.load()?;
                let schema = parse_schema_arg(&target.schema)?;
                am.prepare(&schema)?;
                target.input_settings.load_process(|label, document| {
                    let verdict = if am.test(document, &schema)? {
                        "match".green()
                    } else {
                        "no match".red()
                    };
                    writeln!(out, "{label}\t{verdict}")?;
                    Ok(())
                })?;
            }
            Command::Schemas(target) => {
                let am = target.catalog_settings.load()?;
                let registry = am.registry();
                for (name, def) in registry.iter() {
                    match def.id() {
                        Some(id) if id != name => writeln!(out, "{name}\t{}", format!("(id: {id})").dimmed())?,
                        _ => writeln!(out, "{name}")?,
                    }
                }
                if target.check {
                    let dangling = registry.dangling_references();
                    for (owner, missing) in &dangling {
                        eprintln!("{} {owner} references unregistered schema {missing}", "warning:".yellow().bold());
                    }
                    if !dangling.is_empty() {
                        bail!("{} dangling reference(s)", dangling.len());
                    }
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `{...}` is an inline schema; anything else is a schema name.
fn parse_schema_arg(raw: &str) -> Result<Value> {
    if raw.trim_start().starts_with('{') {
        serde_json::from_str(raw).context("--schema looks like JSON but does not parse")
    } else {
        Ok(Value::String(raw.to_string()))
    }
}

fn parse_json(source: &str, label: &str) -> Result<Value> {
    serde_json::from_str::<Value>(source)
        .with_context(|| format!("failed to parse JSON source ({label})"))
}

/// Literal paths must exist; glob patterns must match at least one file.
fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !pattern.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{')) {
            let path = PathBuf::from(pattern);
            if !path.exists() {
                bail!("no such file: {pattern}");
            }
            out.push(path);
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern {pattern}"))? {
            out.push(entry.with_context(|| format!("unreadable match for {pattern}"))?);
        }
        if out.len() == before {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}
