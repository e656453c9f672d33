use anyhow::{Context, Result};

use notesweep_core::{vault::daily_notes_folder, AppConfig};

pub fn show(config: &AppConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("failed to render settings")?;
    print!("{}", rendered);

    if config.cleanup.folder.is_none() {
        match daily_notes_folder(&config.vault_dir()) {
            Some(folder) => println!("\n# folder unset, using daily notes folder: {}", folder),
            None => println!("\n# folder unset and no daily notes folder found"),
        }
    }

    Ok(())
}

pub fn set(mut config: AppConfig, key: &str, value: &str) -> Result<()> {
    config.set(key, value)?;
    config.save()?;
    println!("Saved {} to {}", key, AppConfig::config_path().display());
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}
