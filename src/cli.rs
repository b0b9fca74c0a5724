use std::path::PathBuf;

mod allergy;
mod analyze;
mod item;
mod log;
mod lookup;
mod markdown;
mod scan;
mod status;
mod terminal;

use allergy::Allergy;
use analyze::Analyze;
use clap::ArgAction;
use detective::{Store, services::Assistant};
use item::Item;
use log::Log;
use lookup::Lookup;
use scan::Scan;
use status::Status;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the `.detective` data directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(Store::new(self.root))
            .await
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Show counts and the leading candidates
    Status(Status),

    /// Create the data directory
    Init,

    /// Manage the items you reacted to
    #[command(subcommand)]
    Item(Item),

    /// Manage confirmed allergies
    ///
    /// Known allergies are never reported as candidates.
    #[command(subcommand)]
    Allergy(Allergy),

    /// Keep a log of reactions
    #[command(subcommand)]
    Log(Log),

    /// Rank the ingredients shared by your reaction items
    Analyze(Analyze),

    /// Describe any ingredient
    Lookup(Lookup),

    /// Look up a product by barcode
    Scan(Scan),
}

impl Command {
    async fn run(self, store: Store) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(&store)?,
            Self::Init => init(&store)?,
            Self::Item(command) => command.run(&store).await?,
            Self::Allergy(command) => command.run(&store)?,
            Self::Log(command) => command.run(&store)?,
            Self::Analyze(command) => command.run(&store).await?,
            Self::Lookup(command) => command.run(&store).await?,
            Self::Scan(command) => command.run(&store).await?,
        }
        Ok(())
    }
}

#[instrument(skip(store))]
fn init(store: &Store) -> anyhow::Result<()> {
    if store.is_initialized() {
        anyhow::bail!(
            "Already initialized (found existing {} directory)",
            store.dir().display()
        );
    }

    store.init()?;

    println!("Initialized {}", store.dir().display());
    println!("  Created: {}", store.config_path().display());
    println!();
    println!("Next steps:");
    println!(
        "  detect item add \"Spicy Ramen\" --ingredients \"wheat noodles, soy sauce, sesame\""
    );

    Ok(())
}

/// The language model, unless `offline` forces the comma-splitting fallback.
fn assistant(store: &Store, offline: bool) -> Assistant {
    let mut config = store.load_config();
    config.offline |= offline;
    let assistant = Assistant::from_config(&config);
    if !assistant.is_online() {
        tracing::info!("Language model unavailable, running offline");
    }
    assistant
}

/// Output formats shared by the listing commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// The first eight characters of an id, enough to pass back as a prefix.
fn short_id(id: uuid::Uuid) -> String {
    let mut id = id.to_string();
    id.truncate(8);
    id
}
