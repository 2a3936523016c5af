//! Minimal CLI: declaration graph → (schema | graph)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;

use crate::emit;
use crate::generate::{self, DeclarationGraph, Metadata};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// resolve declaration graphs into schema types and output either a Swagger-style definitions document or the raw graph
#[derive(Parser, Debug)]
#[command(name = "schema-resolve")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// resolve and print the Swagger-style definitions document
    Schema(SchemaOut),
    /// resolve and print the raw resolved graph (roots, reference slots, warnings)
    Graph(GraphOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the declaration graph in each document (e.g. /metadata/types)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is a declaration graph
    #[arg(long)]
    jq_expr: Option<String>,

    /// resolve every input file in its own run (in parallel) instead of merging them
    #[arg(long, default_value_t = false)]
    per_file: bool,

    /// fail when resolution reported any warning
    #[arg(long, default_value_t = false)]
    deny_warnings: bool,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct GraphOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One generation run and the input it came from.
struct Run {
    source: String,
    metadata: Metadata,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Every input file with the declaration graphs it yields, in input order.
    fn load_documents(&self) -> Result<Vec<(PathBuf, DeclarationGraph)>> {
        let source_paths =
            resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        let mut out = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let document = self
                .load_file(&source_path)
                .with_context(|| format!("failed to load {}", source_path.display()))?;
            out.push((source_path, document));
        }
        Ok(out)
    }

    fn load_file(&self, source_path: &Path) -> Result<DeclarationGraph> {
        let source = std::fs::read_to_string(source_path).context("failed to read source file")?;
        let mut json_value = serde_json::from_str::<Value>(&source).context("failed to parse JSON source file")?;
        if let Some(pointer) = self.json_pointer.as_deref() {
            json_value = json_value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} matched nothing"))?;
        }
        let values = match self.jq_expr.as_deref() {
            None => vec![json_value],
            Some(jq_expr) => {
                crate::jq_exec::run_jaq(jq_expr, &json_value).context("failed to apply jq expression")?
            }
        };
        let mut document = DeclarationGraph::default();
        for value in values {
            document.merge(DeclarationGraph::from_value(value)?);
        }
        tracing::debug!(
            path = %source_path.display(),
            declarations = document.declarations.len(),
            roots = document.roots.len(),
            "loaded declaration graph"
        );
        Ok(document)
    }

    /// Merged into a single run, or one run per file with `--per-file`.
    fn process(&self) -> Result<Vec<Run>> {
        let documents = self.load_documents()?;
        let runs = if self.per_file {
            documents
                .into_par_iter()
                .map(|(path, document)| -> Result<Run> {
                    let source = path.to_string_lossy().to_string();
                    let metadata = generate::generate_graph(document)
                        .with_context(|| format!("failed to resolve {source}"))?;
                    Ok(Run { source, metadata })
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            let mut merged = DeclarationGraph::default();
            for (_, document) in documents {
                merged.merge(document);
            }
            let metadata = generate::generate_graph(merged).context("failed to resolve declaration graph")?;
            vec![Run { source: "<merged>".to_string(), metadata }]
        };
        self.check_warnings(&runs)?;
        Ok(runs)
    }

    fn check_warnings(&self, runs: &[Run]) -> Result<()> {
        let mut count = 0usize;
        for run in runs {
            for warning in &run.metadata.graph.warnings {
                count += 1;
                eprintln!("{} {}: {warning}", "warning".yellow().bold(), run.source.dimmed());
            }
        }
        if self.deny_warnings && count > 0 {
            bail!("{count} warning(s) reported and --deny-warnings is set");
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                let runs = target.input_settings.process()?;
                let output = collect_output(&runs, |metadata| Ok(emit::emit_document(metadata)))?;
                write_output(target.out.as_deref(), &output)
            }
            Command::Graph(target) => {
                let runs = target.input_settings.process()?;
                let output = collect_output(&runs, |metadata| Ok(serde_json::to_value(metadata)?))?;
                write_output(target.out.as_deref(), &output)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// A single run renders as-is; several runs are keyed by their input file.
fn collect_output(runs: &[Run], render: impl Fn(&Metadata) -> Result<Value>) -> Result<Value> {
    match runs {
        [single] => render(&single.metadata),
        _ => runs
            .iter()
            .map(|run| Ok((run.source.clone(), render(&run.metadata)?)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(Value::Object),
    }
}

fn write_output(out: Option<&Path>, output: &Value) -> Result<()> {
    let output_src = serde_json::to_string_pretty(output)?;
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &output_src).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{output_src}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("schema-resolve-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn settings(input: Vec<String>) -> InputSettings {
        InputSettings { json_pointer: None, jq_expr: None, per_file: false, deny_warnings: false, input }
    }

    fn write_document(dir: &Path, file: &str, value: Value) -> String {
        let path = dir.join(file);
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn parses_subcommands() {
        let cli = CommandLineInterface::try_parse_from([
            "schema-resolve", "schema", "-i", "a.json", "b/*.json", "--per-file", "-o", "out.json",
        ])
        .unwrap();
        let Command::Schema(target) = cli.cmd else { panic!("expected schema") };
        assert_eq!(target.input_settings.input, vec!["a.json", "b/*.json"]);
        assert!(target.input_settings.per_file);
        assert_eq!(target.out, Some(PathBuf::from("out.json")));

        assert!(CommandLineInterface::try_parse_from(["schema-resolve", "graph"]).is_err());
    }

    #[test]
    fn glob_without_matches_is_an_error() {
        let dir = scratch_dir("glob");
        let pattern = format!("{}/*.nothing", dir.display());
        assert!(resolve_file_path_patterns([pattern]).is_err());
        assert_eq!(resolve_file_path_patterns(["plain.json"]).unwrap(), vec![PathBuf::from("plain.json")]);
    }

    #[test]
    fn merges_files_and_applies_pointer() {
        let dir = scratch_dir("merge");
        let a = write_document(&dir, "a.json", json!({ "payload": {
            "declarations": [{ "kind": "enum", "name": "Color", "members": ["Red"] }],
            "roots": [{ "label": "color", "type": { "kind": "reference", "name": "Color" } }]
        } }));
        let b = write_document(&dir, "b.json", json!({ "payload": {
            "roots": [{ "label": "name", "type": { "kind": "keyword", "keyword": "string" } }]
        } }));
        let mut settings = settings(vec![a, b]);
        settings.json_pointer = Some("/payload".into());

        let runs = settings.process().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].metadata.roots.len(), 2);

        settings.per_file = true;
        let runs = settings.process().unwrap();
        assert_eq!(runs.len(), 2);
        // per-file runs never see each other's declarations
        assert_eq!(runs[1].metadata.roots.keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn jq_splits_documents() {
        let dir = scratch_dir("jq");
        let path = write_document(&dir, "bundle.json", json!({ "parts": [
            { "declarations": [{ "kind": "interface", "name": "User", "members": [] }] },
            { "roots": [{ "label": "user", "type": { "kind": "reference", "name": "User" } }] }
        ] }));
        let mut settings = settings(vec![path]);
        settings.jq_expr = Some(".parts[]".into());
        let runs = settings.process().unwrap();
        assert!(runs[0].metadata.roots["user"].as_reference().is_some());
    }

    #[test]
    fn deny_warnings_fails_the_run() {
        let dir = scratch_dir("deny");
        let path = write_document(&dir, "mixed.json", json!({
            "roots": [{ "label": "mixed", "type": { "kind": "union", "types": [
                { "kind": "keyword", "keyword": "string" }, { "kind": "keyword", "keyword": "boolean" }
            ] } }]
        }));
        let mut settings = settings(vec![path]);
        assert!(settings.process().is_ok());
        settings.deny_warnings = true;
        assert!(settings.process().is_err());
    }
}
