use std::path::Path;

use tracing::warn;

use tierlist_core::Record;

use super::Context;

/// Seed the store from a JSON array of records.
pub async fn run(ctx: &Context, file: &Path) -> anyhow::Result<()> {
    let (imported, incomplete) = import_file(ctx, file).await?;
    println!("✓ Imported {imported} records from {}", file.display());
    if incomplete > 0 {
        println!("  {incomplete} with zero cost will not appear in searches");
    }
    Ok(())
}

async fn import_file(ctx: &Context, file: &Path) -> anyhow::Result<(usize, usize)> {
    let content = std::fs::read_to_string(file)?;
    let records: Vec<Record> = serde_json::from_str(&content)?;

    let mut incomplete = 0;
    for record in &records {
        if record.cost == 0 {
            warn!(id = %record.id, name = %record.name, "record has zero cost");
            incomplete += 1;
        }
        ctx.service.save_record(record).await?;
    }
    Ok((records.len(), incomplete))
}
