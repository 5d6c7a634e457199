//! List command - stored datasets and documents.

use super::{get_database, short_id, truncate};
use anyhow::Result;
use colored::Colorize;
use datadesk_db::Database;

pub fn run(limit: i64) -> Result<()> {
    let db = get_database()?;
    run_with_db(&db, limit)
}

/// Run list with an existing database connection.
pub fn run_with_db(db: &Database, limit: i64) -> Result<()> {
    let dataframes = db.list_dataframes(Some(limit))?;
    let documents = db.list_unstructured(Some(limit))?;

    if dataframes.is_empty() && documents.is_empty() {
        println!(
            "{}",
            "Nothing stored yet. Use 'datadesk ingest <file>' to add data.".dimmed()
        );
        return Ok(());
    }

    if !dataframes.is_empty() {
        println!(
            "{} ({} total)",
            "Datasets".cyan().bold(),
            db.count_dataframes()?
        );
        println!("{}", "─".repeat(70));
        for dataframe in &dataframes {
            println!(
                "📊 {} {} {}",
                dataframe.name.white().bold(),
                format!("[{}]", short_id(&dataframe.id)).dimmed(),
                dataframe.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
            );
            println!(
                "  {} columns, {}",
                dataframe.variables.len(),
                truncate(&dataframe.description, 60).dimmed()
            );
        }
    }

    if !documents.is_empty() {
        if !dataframes.is_empty() {
            println!();
        }
        println!("{}", "Documents".cyan().bold());
        println!("{}", "─".repeat(70));
        for document in &documents {
            println!(
                "📄 {} {} {}",
                document.name.white().bold(),
                format!("[{}]", short_id(&document.id)).dimmed(),
                document.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
            );
            println!("  {}", truncate(&document.description, 70).dimmed());
        }
    }

    Ok(())
}
