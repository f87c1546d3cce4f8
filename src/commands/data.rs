use anyhow::{Context, Result};

use calman_core::settings::{self, DataExport};

use crate::commands::{load_settings, load_templates};

pub fn export(path: String) -> Result<()> {
    let settings = load_settings()?;
    let templates = load_templates()?;

    let data = settings::export_data(&settings, templates.templates());
    let json = serde_json::to_string_pretty(&data)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path))?;

    println!(
        "Exported {} templates and settings to {}",
        templates.templates().len(),
        path
    );
    Ok(())
}

pub fn import(path: String) -> Result<()> {
    let json = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;
    let data: DataExport =
        serde_json::from_str(&json).with_context(|| format!("Invalid export document {}", path))?;

    let mut settings = load_settings()?;
    let mut templates = load_templates()?;
    let imported = settings::import_data(data, &mut settings, &mut templates)?;

    println!("Imported settings and {} new templates.", imported);
    Ok(())
}
