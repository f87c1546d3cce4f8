use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;

use calman_core::store::{FileStore, KvStore};
use calman_core::template::Template;

use crate::commands::{load_templates, parse_datetime, parse_duration, state_path};

/// Where the armed template index survives between invocations.
const SELECTION_KEY: &str = "selectedTemplateIndex";

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List stored templates
    List,
    /// Store a new template
    Add {
        /// Template title
        title: String,

        /// Start date/time (sets the time of day and duration baseline)
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Duration (e.g., "30m", "1h30m")
        #[arg(short, long, conflicts_with = "end")]
        duration: Option<String>,

        /// Color id (0-11)
        #[arg(short, long, default_value_t = -1)]
        color: i64,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        all_day: bool,
    },
    /// Change fields of a stored template
    Edit {
        index: usize,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        color: Option<i64>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a template
    Remove { index: usize },
    /// Arm a template for `calman add --template`; selecting it again
    /// disarms, selecting another while armed swaps their order
    Select { index: usize },
    /// Swap two templates' positions
    Swap { first: usize, second: usize },
}

pub fn run(action: TemplateAction) -> Result<()> {
    match action {
        TemplateAction::List => list(),
        TemplateAction::Add {
            title,
            start,
            end,
            duration,
            color,
            description,
            all_day,
        } => add(title, start, end, duration, color, description, all_day),
        TemplateAction::Edit {
            index,
            title,
            color,
            description,
        } => edit(index, title, color, description),
        TemplateAction::Remove { index } => remove(index),
        TemplateAction::Select { index } => select(index),
        TemplateAction::Swap { first, second } => swap(first, second),
    }
}

fn list() -> Result<()> {
    let templates = load_templates()?;
    if templates.templates().is_empty() {
        println!("No templates. Add one with `calman template add`.");
        return Ok(());
    }

    let selected = load_selection()?;
    for (index, template) in templates.templates().iter().enumerate() {
        let marker = if selected == Some(index) { "*" } else { " " };
        let time = if template.all_day {
            "all-day".to_string()
        } else {
            format!(
                "{} ({}m)",
                template.start.format("%H:%M"),
                template.duration_minutes()
            )
        };
        println!(
            "{} {} {} {}",
            marker.green(),
            format!("[{}]", index).dimmed(),
            template.title,
            time.dimmed()
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn add(
    title: String,
    start: String,
    end: Option<String>,
    duration: Option<String>,
    color: i64,
    description: Option<String>,
    all_day: bool,
) -> Result<()> {
    let start = parse_datetime(&start)?;
    let end = if let Some(end) = end {
        parse_datetime(&end)?
    } else if let Some(duration) = duration {
        start + parse_duration(&duration)?
    } else if all_day {
        start + chrono::Duration::days(1)
    } else {
        start + chrono::Duration::hours(1)
    };
    if end < start {
        anyhow::bail!("Template end must not precede its start.");
    }

    let mut templates = load_templates()?;
    templates.add_template(Template {
        title: title.clone(),
        start,
        end,
        all_day,
        color_id: color,
        description: description.unwrap_or_default(),
    })?;

    println!("Stored template [{}] {}", templates.templates().len() - 1, title);
    Ok(())
}

fn edit(
    index: usize,
    title: Option<String>,
    color: Option<i64>,
    description: Option<String>,
) -> Result<()> {
    let mut templates = load_templates()?;
    let Some(current) = templates.templates().get(index) else {
        anyhow::bail!("No template at index {}", index);
    };

    let updated = Template {
        title: title.unwrap_or_else(|| current.title.clone()),
        color_id: color.unwrap_or(current.color_id),
        description: description.unwrap_or_else(|| current.description.clone()),
        ..current.clone()
    };
    let name = updated.title.clone();
    templates.update_template(index, updated)?;

    println!("Updated template [{}] {}", index, name);
    Ok(())
}

fn remove(index: usize) -> Result<()> {
    let mut templates = load_templates()?;
    if templates.templates().get(index).is_none() {
        anyhow::bail!("No template at index {}", index);
    }
    templates.remove_template(index)?;
    if load_selection()? == Some(index) {
        save_selection(None)?;
    }
    println!("Removed template {}", index);
    Ok(())
}

fn select(index: usize) -> Result<()> {
    let mut templates = load_templates()?;
    if templates.templates().get(index).is_none() {
        anyhow::bail!("No template at index {}", index);
    }

    // Restore the armed state from the previous invocation, then run
    // the selection step.
    let previous = load_selection()?.filter(|p| templates.templates().get(*p).is_some());
    if let Some(previous) = previous {
        templates.select_template(previous)?;
    }
    let selection = templates.select_template(index)?;
    save_selection(selection)?;

    match (previous, selection) {
        (_, Some(index)) => println!("Template [{}] armed.", index),
        (Some(previous), None) if previous == index => println!("Template [{}] disarmed.", index),
        (Some(previous), None) => {
            println!("Swapped templates {} and {}; selection cleared.", previous, index)
        }
        (None, None) => println!("Selection cleared."),
    }
    Ok(())
}

fn swap(first: usize, second: usize) -> Result<()> {
    let mut templates = load_templates()?;
    templates.swap_templates(first, second)?;
    println!("Swapped templates {} and {}", first, second);
    Ok(())
}

fn load_selection() -> Result<Option<usize>> {
    let store = FileStore::new(state_path()?);
    let value = store.get(SELECTION_KEY)?;
    Ok(value.and_then(|v| v.as_u64()).map(|v| v as usize))
}

fn save_selection(selection: Option<usize>) -> Result<()> {
    let mut store = FileStore::new(state_path()?);
    match selection {
        Some(index) => store.set(SELECTION_KEY, serde_json::json!(index))?,
        None => store.set(SELECTION_KEY, serde_json::Value::Null)?,
    }
    Ok(())
}
