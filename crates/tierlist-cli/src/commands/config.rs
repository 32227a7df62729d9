use std::path::Path;

use tierlist_core::TierlistConfig;

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let body = TierlistConfig::default().to_toml_string()?;
    std::fs::write(path, body)?;
    println!("✓ Generated {}", path.display());
    Ok(())
}
