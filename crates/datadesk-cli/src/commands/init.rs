//! Initialize Datadesk.

use super::{database_path, get_paths};
use anyhow::{Context, Result};
use colored::Colorize;
use datadesk_config::Config;
use datadesk_db::Database;

pub fn run() -> Result<()> {
    let paths = get_paths()?;
    let config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    let database_file = database_path(&config, &paths)?;

    if paths.has_config() && database_file.exists() {
        println!("{} Datadesk is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Database: {}", database_file.display());

        let db = Database::open(&database_file).context("Failed to open database")?;
        if !db.integrity_check().context("Failed to check database")? {
            println!("  {} Database integrity check failed", "Warning:".yellow());
        }
        return Ok(());
    }

    println!("{}", "Initializing Datadesk...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    if !paths.config_file.exists() {
        Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    }
    println!("  {} Created config: {}", "✓".green(), paths.config_file.display());

    let _db = Database::open(&database_file).context("Failed to initialize database")?;
    println!("  {} Created database: {}", "✓".green(), database_file.display());

    println!();
    println!("{}", "Datadesk initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Add API keys: {}", "datadesk config edit".cyan());
    println!("  2. See what a file needs: {}", "datadesk spec people.csv".cyan());
    println!("  3. Ingest it: {}", "datadesk ingest people.csv".cyan());

    Ok(())
}
