//! Ingest command - describe a file, store it, index it.

use super::{expand_path, get_database, open_vector_store, short_id, ApiKeys};
use anyhow::{Context, Result};
use colored::Colorize;
use datadesk_core::{Dataframe, UnstructuredDocument};
use datadesk_ingest::metadata::{chunks_from_json, parse_assignment};
use datadesk_ingest::{
    connector_for_path, merge_metadata, Connector, MetadataMap, SourceKind, StructuredConnector,
    UnstructuredConnector,
};
use datadesk_vectorstore::{index_dataframe_tree, index_unstructured};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

/// How a file is ingested.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// JSON metadata files, merged in order.
    pub metadata_files: Vec<String>,
    /// `key=value` pairs, merged after the files.
    pub assignments: Vec<String>,
    pub interactive: bool,
    pub dry_run: bool,
    pub index: bool,
}

enum LoadedFile {
    Structured(StructuredConnector),
    Unstructured(UnstructuredConnector),
}

impl LoadedFile {
    fn open(path: &Path) -> Result<Self> {
        let loaded = match connector_for_path(path)? {
            SourceKind::Structured => LoadedFile::Structured(
                StructuredConnector::from_path(path).context("Failed to read CSV")?,
            ),
            SourceKind::Unstructured => LoadedFile::Unstructured(
                UnstructuredConnector::from_path(path).context("Failed to read PDF")?,
            ),
        };
        Ok(loaded)
    }

    fn connector(&self) -> &dyn Connector {
        match self {
            LoadedFile::Structured(c) => c,
            LoadedFile::Unstructured(c) => c,
        }
    }

    fn connector_mut(&mut self) -> &mut dyn Connector {
        match self {
            LoadedFile::Structured(c) => c,
            LoadedFile::Unstructured(c) => c,
        }
    }
}

enum Persisted {
    Dataframe(Option<Dataframe>),
    Documents(Vec<UnstructuredDocument>),
}

pub fn run(path: &str, options: IngestOptions, keys: &ApiKeys) -> Result<()> {
    let path = expand_path(path)?;
    let mut loaded = LoadedFile::open(&path)?;

    println!(
        "{} {} [{}]",
        "Ingesting:".cyan().bold(),
        path.display(),
        loaded.connector().source_kind()
    );

    let mut metadata = merge_metadata(collect_chunks(&options)?);
    let spec = loaded.connector().specification();
    let pending: Vec<(String, String)> = spec
        .pending(|field| metadata.contains_key(field))
        .into_iter()
        .map(|(field, prompt)| (field.to_string(), prompt.to_string()))
        .collect();

    if !pending.is_empty() {
        if options.interactive {
            prompt_missing(&pending, &mut metadata)?;
        } else {
            debug!("{} fields left without a description", pending.len());
        }
    }

    loaded.connector_mut().save_metadata(&metadata);

    let db = if options.dry_run {
        None
    } else {
        Some(get_database()?)
    };

    let persisted = match &loaded {
        LoadedFile::Structured(c) => Persisted::Dataframe(c.persist(db.as_ref())?),
        LoadedFile::Unstructured(c) => Persisted::Documents(c.persist(db.as_ref())?),
    };

    if options.dry_run {
        print_dry_run(&loaded);
        return Ok(());
    }

    match &persisted {
        Persisted::Dataframe(Some(dataframe)) => println!(
            "  {} Stored dataset '{}' with {} columns [{}]",
            "✓".green(),
            dataframe.name,
            dataframe.variables.len(),
            short_id(&dataframe.id)
        ),
        Persisted::Dataframe(None) => {}
        Persisted::Documents(documents) => {
            for document in documents {
                println!(
                    "  {} Stored document '{}' ({} chars) [{}]",
                    "✓".green(),
                    document.name,
                    document.content.len(),
                    short_id(&document.id)
                );
            }
        }
    }

    if !options.index {
        println!("{}", "Skipped vector indexing.".dimmed());
        return Ok(());
    }

    index_persisted(&persisted, keys)
}

/// Metadata files first, then the `--set` pairs as one last chunk.
fn collect_chunks(options: &IngestOptions) -> Result<Vec<Vec<(String, String)>>> {
    let mut chunks = Vec::new();

    for file in &options.metadata_files {
        let path = expand_path(file)?;
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read metadata file: {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        chunks.extend(chunks_from_json(&value)?);
    }

    if !options.assignments.is_empty() {
        let pairs = options
            .assignments
            .iter()
            .map(String::as_str)
            .map(parse_assignment)
            .collect::<Result<Vec<_>, _>>()?;
        chunks.push(pairs);
    }

    Ok(chunks)
}

fn prompt_missing(pending: &[(String, String)], metadata: &mut MetadataMap) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!();
    println!(
        "{} ({} fields)",
        "Describe your file".white().bold(),
        pending.len()
    );
    println!("{}", "─".repeat(70));

    for (field, prompt) in pending {
        println!("{}", prompt);
        loop {
            match rl.readline(&format!("{} ", format!("{}>", field).green().bold())) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    metadata.insert(field.clone(), line.to_string());
                    break;
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    anyhow::bail!("Ingestion cancelled");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    println!();
    Ok(())
}

fn print_dry_run(loaded: &LoadedFile) {
    println!("{} Nothing was written.", "Dry run:".yellow().bold());

    match loaded {
        LoadedFile::Structured(c) => {
            let info = c.data_info();
            println!("  Name: {}", info.name.unwrap_or_default());
            println!("  Description: {}", info.description.unwrap_or_default());
            for column in &info.columns {
                let description = info
                    .columns_description
                    .get(column)
                    .map(String::as_str)
                    .unwrap_or("");
                println!("  {} {}", column.cyan(), description);
            }
            for (value, description) in &info.categorical_values_description {
                println!("  {} {}", value.yellow(), description);
            }
        }
        LoadedFile::Unstructured(c) => {
            let info = c.data_info();
            println!("  {}", info.to_json());
            println!("  {} pages, {} chars", c.page_count(), c.content().len());
        }
    }
}

fn index_persisted(persisted: &Persisted, keys: &ApiKeys) -> Result<()> {
    let rt = Runtime::new().context("Failed to create async runtime")?;
    let store = open_vector_store(&rt, keys)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Indexing into {}", store.describe()));

    let ids = match persisted {
        Persisted::Dataframe(Some(dataframe)) => rt
            .block_on(index_dataframe_tree(&store, dataframe))
            .with_context(|| {
                format!(
                    "Dataset stored as {} but indexing failed; retry with 'datadesk index dataframe {}'",
                    dataframe.id, dataframe.id
                )
            })?,
        Persisted::Dataframe(None) => Vec::new(),
        Persisted::Documents(documents) => {
            let mut ids = Vec::with_capacity(documents.len());
            for document in documents {
                let id = rt
                    .block_on(index_unstructured(&store, document))
                    .with_context(|| {
                        format!(
                            "Document stored as {} but indexing failed; retry with 'datadesk index unstructured {}'",
                            document.id, document.id
                        )
                    })?;
                ids.push(id);
            }
            ids
        }
    };

    pb.finish_and_clear();
    println!(
        "  {} Indexed {} documents into {}",
        "✓".green(),
        ids.len().to_string().green(),
        store.describe()
    );
    for id in &ids {
        println!("    {}", id.dimmed());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_collect_chunks_orders_files_before_assignments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"db_name": "people", "age": "years"}}, {{"db_name": "residents"}}]"#
        )
        .unwrap();

        let options = IngestOptions {
            metadata_files: vec![file.path().display().to_string()],
            assignments: vec!["db_name=census".to_string(), "city=home".to_string()],
            ..IngestOptions::default()
        };

        let chunks = collect_chunks(&options).unwrap();
        assert_eq!(chunks.len(), 3);

        let merged = merge_metadata(chunks);
        assert_eq!(merged["db_name"], "census");
        assert_eq!(merged["age"], "years");
        assert_eq!(merged["city"], "home");
    }

    #[test]
    fn test_collect_chunks_rejects_bad_assignment() {
        let options = IngestOptions {
            assignments: vec!["oops".to_string()],
            ..IngestOptions::default()
        };
        assert!(collect_chunks(&options).is_err());
    }

    #[test]
    fn test_unsupported_file() {
        assert!(LoadedFile::open(Path::new("notes.txt")).is_err());
    }
}
