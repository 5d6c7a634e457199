//! Spec command - show the metadata a file needs.

use super::{expand_path, truncate};
use anyhow::Result;
use colored::Colorize;
use datadesk_ingest::{
    connector_for_path, Connector, SourceKind, StructuredConnector, UnstructuredConnector,
};

pub fn run(path: &str) -> Result<()> {
    let path = expand_path(path)?;

    let connector: Box<dyn Connector> = match connector_for_path(&path)? {
        SourceKind::Structured => {
            let connector = StructuredConnector::from_path(&path)?;
            println!(
                "{} {} ({} columns, {} rows)",
                "CSV".cyan().bold(),
                path.display(),
                connector.column_names().len(),
                connector.data_content().len()
            );
            for (column, kind) in connector.column_names().iter().zip(connector.column_kinds()) {
                match connector.categorical_values().get(column) {
                    Some(values) => println!(
                        "  {} {:?}, categorical: {}",
                        column.white().bold(),
                        kind,
                        values.join(", ").yellow()
                    ),
                    None => println!("  {} {:?}", column.white().bold(), kind),
                }
            }
            Box::new(connector)
        }
        SourceKind::Unstructured => {
            let connector = UnstructuredConnector::from_path(&path)?;
            println!(
                "{} {} ({} pages)",
                "PDF".cyan().bold(),
                path.display(),
                connector.page_count()
            );
            println!("  {}", truncate(connector.content(), 70).dimmed());
            Box::new(connector)
        }
    };

    let spec = connector.specification();
    println!();
    println!("{} ({} fields)", "Required metadata".white().bold(), spec.len());
    println!("{}", "─".repeat(70));
    for (field, prompt) in spec.fields() {
        println!("  {}", field.cyan());
        println!("    {}", prompt.dimmed());
    }

    Ok(())
}
