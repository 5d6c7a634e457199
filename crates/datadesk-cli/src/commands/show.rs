//! Show command - display one stored record.

use super::get_database;
use anyhow::Result;
use colored::Colorize;
use datadesk_core::{Dataframe, UnstructuredDocument};
use datadesk_db::{Database, DbError};

const PREVIEW_CHARS: usize = 1000;

pub fn run(id: &str) -> Result<()> {
    let db = get_database()?;
    run_with_db(&db, id)
}

/// Run show with an existing database connection.
pub fn run_with_db(db: &Database, id: &str) -> Result<()> {
    match db.get_dataframe(id) {
        Ok(dataframe) => {
            print_dataframe(&dataframe);
            return Ok(());
        }
        Err(DbError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    match db.get_unstructured(id) {
        Ok(document) => {
            print_document(&document);
            Ok(())
        }
        Err(DbError::NotFound(_)) => anyhow::bail!("No dataset or document with ID {}", id),
        Err(e) => Err(e.into()),
    }
}

fn print_dataframe(dataframe: &Dataframe) {
    println!("📊 {}", dataframe.name.white().bold());
    println!("{}", "─".repeat(70));
    println!("  {}: {}", "ID".cyan(), dataframe.id);
    println!(
        "  {}: {}",
        "Created".cyan(),
        dataframe.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  {}: {}", "Description".cyan(), dataframe.description);

    println!();
    println!(
        "{} ({})",
        "Columns".white().bold(),
        dataframe.variables.len()
    );
    println!("{}", "─".repeat(70));
    for variable in &dataframe.variables {
        let marker = if variable.is_categorical {
            " categorical".yellow().to_string()
        } else {
            String::new()
        };
        println!("  {}{}: {}", variable.name.cyan(), marker, variable.description);
        for value in &variable.values {
            println!("    {} {}", value.name.yellow(), value.description.dimmed());
        }
    }
}

fn print_document(document: &UnstructuredDocument) {
    println!("📄 {}", document.name.white().bold());
    println!("{}", "─".repeat(70));
    println!("  {}: {}", "ID".cyan(), document.id);
    println!(
        "  {}: {}",
        "Created".cyan(),
        document.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  {}: {}", "Description".cyan(), document.description);

    println!();
    println!(
        "{} ({} chars)",
        "Content Preview".white().bold(),
        document.content.len()
    );
    println!("{}", "─".repeat(70));
    let preview: String = document.content.chars().take(PREVIEW_CHARS).collect();
    println!("{}", preview);
    if document.content.chars().count() > PREVIEW_CHARS {
        println!("{}", "...".dimmed());
    }
}
