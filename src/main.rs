mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calman")]
#[command(about = "Manage your week: sync, classify, split and template calendar events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Google (Calendar + Tasks)
    Auth,
    /// Show the week around a date
    Week {
        /// Date inside the week to show (e.g., "2025-03-20"); defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Also show background (phase) events
        #[arg(short, long)]
        backgrounds: bool,
    },
    /// Create an event
    Add {
        /// Event title
        title: String,

        /// Start date/time (e.g., "2025-03-20" or "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Duration (e.g., "30m", "1h", "2h30m")
        #[arg(short, long, conflicts_with = "end")]
        duration: Option<String>,

        /// Event description
        #[arg(long)]
        description: Option<String>,

        /// Color id (0-11)
        #[arg(short, long)]
        color: Option<i64>,

        /// Create as an all-day event
        #[arg(long)]
        all_day: bool,

        /// Create from a stored template instead (--start still sets the day/time)
        #[arg(short, long, conflicts_with_all = ["end", "duration", "color"])]
        template: Option<usize>,
    },
    /// Edit an event's fields
    Edit {
        /// Event id (see `calman week`)
        event_id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long)]
        color: Option<i64>,
    },
    /// Delete an event
    Delete {
        /// Event id (see `calman week`)
        event_id: String,
    },
    /// Split an event in two at a percentage of its duration
    Split {
        /// Event id (see `calman week`)
        event_id: String,

        /// Where to cut, as a percentage of the duration (0-100)
        #[arg(short, long, default_value_t = 50.0)]
        percent: f64,
    },
    /// Keep the week in sync, refetching on a fixed interval
    Watch {
        /// Date inside the week to watch; defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Manage event templates
    Template {
        #[command(subcommand)]
        action: commands::template::TemplateAction,
    },
    /// Overlay the week with an hourly weather forecast
    Weather {
        /// Location to forecast (e.g., "Berlin")
        location: String,

        /// Date inside the week to overlay; defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Export settings and templates to a JSON file
    Export {
        /// Output path
        path: String,
    },
    /// Import settings and templates from a JSON file
    Import {
        /// Input path
        path: String,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth => commands::auth::run().await,
        Commands::Week { date, backgrounds } => commands::week::run(date, backgrounds).await,
        Commands::Add {
            title,
            start,
            end,
            duration,
            description,
            color,
            all_day,
            template,
        } => {
            commands::events::add(
                title,
                start,
                end,
                duration,
                description,
                color,
                all_day,
                template,
            )
            .await
        }
        Commands::Edit {
            event_id,
            title,
            start,
            end,
            description,
            color,
        } => commands::events::edit(event_id, title, start, end, description, color).await,
        Commands::Delete { event_id } => commands::events::delete(event_id).await,
        Commands::Split { event_id, percent } => commands::events::split(event_id, percent).await,
        Commands::Watch { date } => commands::watch::run(date).await,
        Commands::Template { action } => commands::template::run(action),
        Commands::Weather { location, date } => commands::weather::run(location, date).await,
        Commands::Export { path } => commands::data::export(path),
        Commands::Import { path } => commands::data::import(path),
        Commands::Config { action } => commands::config::run(action),
    }
}
