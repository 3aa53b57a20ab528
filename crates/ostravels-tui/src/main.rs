use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use tracing::{info, warn};

use ostravels_core::{
    Config, Conversation, MessageBody, Region, Resolver, ResponseDescriptor, VisaDb,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;

/// Reveal granularity for pending replies; the ellipsis advances every few ticks
const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "ostravels")]
#[command(about = "Chat with the O.S Travel visa assistant")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Load countries from this JSON file instead of the built-in dataset
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Milliseconds the bot "types" before each reply
    #[arg(long, global = true)]
    reply_delay_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat window (default)
    Chat,
    /// Ask the bot one question and print its answer
    Ask {
        /// Your question, e.g. "Thailand" or "schengen"
        text: Vec<String>,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
    /// List regions, or the countries of one region
    Regions {
        /// asia, schengen (or europe), other
        region: Option<String>,
    },
    /// List every country in the dataset
    Countries,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}: {}", "Ignoring unreadable config".yellow(), e);
        Config::new()
    });
    if cli.reply_delay_ms.is_some() {
        config.reply_delay_ms = cli.reply_delay_ms;
    }

    if let Ok(dir) = Config::config_dir() {
        let level = config.log_level.as_deref().unwrap_or("info");
        if let Err(e) = logging::init_tracing(&dir.join("ostravels.log"), level) {
            eprintln!("{}: {}", "Logging disabled".yellow(), e);
        }
    }

    let db = Arc::new(load_db(config.dataset_path(cli.dataset.as_deref())).await?);
    let resolver = Resolver::new(db);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(Conversation::new(resolver, config.pacing())).await?,
        Commands::Ask { text, json } => ask(&resolver, &text.join(" "), json)?,
        Commands::Regions { region } => list_regions(resolver.db(), region.as_deref()),
        Commands::Countries => list_countries(resolver.db()),
    }

    Ok(())
}

async fn load_db(dataset: Option<PathBuf>) -> Result<VisaDb> {
    match dataset {
        Some(path) => Ok(VisaDb::load_from_json(&path).await?),
        None => {
            let db = VisaDb::embedded()?;
            info!(countries = db.len(), "Using built-in visa dataset");
            Ok(db)
        }
    }
}

async fn run_chat(conversation: Conversation) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(conversation);
    app.conversation.open(Instant::now());

    let result = run_loop(&mut terminal, &mut app).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new(TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => {
                warn!("Event channel closed");
                break;
            }
        }
    }

    info!(messages = app.conversation.messages().len(), "Chat closed");
    Ok(())
}

fn ask(resolver: &Resolver, text: &str, json: bool) -> Result<()> {
    if text.trim().is_empty() {
        println!("{}", "Nothing to ask. Try: ostravels ask Thailand".red());
        return Ok(());
    }

    let response = resolver.resolve(text);
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

fn print_response(response: &ResponseDescriptor) {
    println!("{}", "O.S Travel Bot".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    match &response.body {
        MessageBody::Text(text) => println!("{}", text),
        MessageBody::CountryInfo(country) => {
            println!("{}", format!("{} Visa", country.name).bold().green());
            println!("{}", country.snippet);
            println!("Learn more: {}", country.url.cyan());
        }
        MessageBody::CountryList(list) => {
            println!("{}", list.title.bold());
            for country in &list.countries {
                println!("  • {}", country.name);
            }
        }
    }

    if !response.replies.is_empty() {
        println!("\n{}", "Quick replies:".dimmed());
        for reply in &response.replies {
            println!("  {} {}", format!("[{}]", reply.value).dimmed(), reply.label);
        }
    }
}

fn list_regions(db: &VisaDb, region: Option<&str>) {
    let regions = match region {
        Some(name) => match Region::from_str(name) {
            Some(region) => vec![region],
            None => {
                println!("{}: {}", "Unknown region".red(), name);
                println!("Known regions: asia, schengen, other");
                return;
            }
        },
        None => Region::all(),
    };

    for region in regions {
        let countries = db.countries_in_region(region);
        println!(
            "\n{} {}",
            region.display_name().bold().green(),
            format!("({} countries)", countries.len()).dimmed()
        );
        for country in countries {
            println!("  • {}", country.name);
        }
    }
}

fn list_countries(db: &VisaDb) {
    println!("\n{}", "Countries We Service".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    for country in db.countries() {
        println!("  • {} {}", country.name.bold(), country.url.dimmed());
    }
    println!("\n{} countries", db.len().to_string().bold());
}
