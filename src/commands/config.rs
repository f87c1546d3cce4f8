use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;

use crate::commands::load_settings;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current settings
    Show,
    /// Set the background color used for phase blocks (hex, e.g. "#ebf1e4ff")
    BgColor { color: String },
    /// Set the split rounding granularity in minutes (0 disables)
    Rounding { minutes: i64 },
    /// Enable or disable rounding of split boundaries
    RoundSplits {
        #[arg(value_parser = clap::value_parser!(bool))]
        on: bool,
    },
    /// Add a phase name; events whose title starts with it become
    /// background blocks
    AddPhase { name: String },
    /// Remove a phase name
    RemovePhase { name: String },
}

pub fn run(action: ConfigAction) -> Result<()> {
    let mut settings = load_settings()?;

    match action {
        ConfigAction::Show => {
            println!("{} {}", "background color:".dimmed(), settings.background_color());
            println!("{} {}m", "split rounding:".dimmed(), settings.rounding_value());
            println!("{} {}", "round splits:".dimmed(), settings.round_splits());
            println!(
                "{} {}",
                "phases:".dimmed(),
                settings.available_phases().join(", ")
            );
        }
        ConfigAction::BgColor { color } => {
            if !color.starts_with('#') {
                anyhow::bail!("Background color must be a hex value like \"#ebf1e4ff\"");
            }
            settings.set_background_color(color.clone())?;
            println!("Background color set to {}", color);
        }
        ConfigAction::Rounding { minutes } => {
            if minutes < 0 {
                anyhow::bail!("Rounding granularity must not be negative");
            }
            settings.set_rounding_value(minutes)?;
            println!("Split rounding set to {}m", minutes);
        }
        ConfigAction::RoundSplits { on } => {
            settings.set_round_splits(on)?;
            println!(
                "Split rounding {}",
                if on { "enabled" } else { "disabled" }
            );
        }
        ConfigAction::AddPhase { name } => {
            settings.add_phase(name.clone())?;
            println!("Added phase {}", name);
        }
        ConfigAction::RemovePhase { name } => {
            if !settings.available_phases().iter().any(|p| p == &name) {
                anyhow::bail!("No phase named '{}'", name);
            }
            settings.remove_phase(&name)?;
            println!("Removed phase {}", name);
        }
    }
    Ok(())
}
