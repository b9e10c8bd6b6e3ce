//! `askgate bootstrap-db` - build the SQLite database from a CSV file.

use anyhow::Context;
use askgate_agents::bootstrap_sqlite;
use askgate_agents::table::cell_text;
use std::path::Path;

pub async fn bootstrap_db(csv: &Path, db: &Path, table: &str) -> anyhow::Result<()> {
    let report = bootstrap_sqlite(csv, db, table)
        .await
        .with_context(|| format!("Failed to bootstrap {} from {}", db.display(), csv.display()))?;

    if report.created {
        println!("Created {} with {} rows in table '{}'", db.display(), report.rows_inserted, table);
    } else {
        println!("Database already exists: {}", db.display());
    }

    println!("Tables: {}", report.tables.join(", "));

    if report.sample.columns.is_empty() {
        println!("Table '{}' not found.", table);
        return Ok(());
    }

    println!("\nSample rows from '{}':", table);
    println!("{}", report.sample.columns.join(" | "));
    for row in &report.sample.rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        println!("{}", cells.join(" | "));
    }

    Ok(())
}
