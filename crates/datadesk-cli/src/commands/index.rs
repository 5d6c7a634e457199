//! Index commands - forward stored records or ad-hoc documents to the vector index.

use super::{get_database, open_vector_store, ApiKeys};
use anyhow::{Context, Result};
use colored::Colorize;
use datadesk_ingest::metadata::parse_assignment;
use datadesk_vectorstore::{fields_document, index_dataframe_tree, index_unstructured, VectorStore};
use tokio::runtime::Runtime;

pub fn dataframe(id: &str, keys: &ApiKeys) -> Result<()> {
    let db = get_database()?;
    let dataframe = db.get_dataframe(id)?;

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let store = open_vector_store(&rt, keys)?;

    println!(
        "{} dataset '{}' into {}",
        "Indexing:".cyan().bold(),
        dataframe.name,
        store.describe()
    );
    let ids = rt.block_on(index_dataframe_tree(&store, &dataframe))?;
    report(&store, &ids);

    Ok(())
}

pub fn unstructured(id: &str, keys: &ApiKeys) -> Result<()> {
    let db = get_database()?;
    let document = db.get_unstructured(id)?;

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let store = open_vector_store(&rt, keys)?;

    println!(
        "{} document '{}' into {}",
        "Indexing:".cyan().bold(),
        document.name,
        store.describe()
    );
    let id = rt.block_on(index_unstructured(&store, &document))?;
    report(&store, &[id]);

    Ok(())
}

pub fn doc(fields: &[String], keys: &ApiKeys) -> Result<()> {
    let pairs = fields
        .iter()
        .map(String::as_str)
        .map(parse_assignment)
        .collect::<Result<Vec<_>, _>>()?;
    let document = fields_document(&pairs)?;

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let store = open_vector_store(&rt, keys)?;

    let id = rt.block_on(store.add_document(&document))?;
    report(&store, &[id]);

    Ok(())
}

fn report(store: &VectorStore, ids: &[String]) {
    println!(
        "{} {} documents indexed into {}",
        "Done:".green().bold(),
        ids.len().to_string().green(),
        store.describe()
    );
    for id in ids {
        println!("  {}", id);
    }
}
