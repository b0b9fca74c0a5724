use clap::Parser;
use detective::Store;
use non_empty_string::NonEmptyString;
use serde_json::json;
use tracing::instrument;

use super::{
    OutputFormat, short_id,
    terminal::{Colorize, confirm},
};

#[derive(Debug, clap::Subcommand)]
pub enum Log {
    /// Record a reaction
    Add(Add),

    /// Delete a log entry
    Remove(Remove),

    /// Show the log, newest first
    List(List),
}

impl Log {
    pub fn run(self, store: &Store) -> anyhow::Result<()> {
        match self {
            Self::Add(command) => command.run(store),
            Self::Remove(command) => command.run(store),
            Self::List(command) => command.run(store),
        }
    }
}

#[derive(Debug, Parser)]
pub struct Add {
    /// What you ate or used
    name: String,

    /// What happened
    #[arg(short, long)]
    symptoms: String,
}

impl Add {
    #[instrument(skip(store))]
    fn run(self, store: &Store) -> anyhow::Result<()> {
        let Ok(name) = NonEmptyString::new(self.name.trim().to_string()) else {
            anyhow::bail!("name must not be empty");
        };
        let Ok(symptoms) = NonEmptyString::new(self.symptoms.trim().to_string()) else {
            anyhow::bail!("symptoms must not be empty");
        };

        let mut log = store.load_log()?;
        let entry = log.add(name, symptoms);
        println!(
            "{}",
            format!("✅ Logged {} ({})", entry.name(), short_id(entry.id())).success()
        );
        store.save_log(&log)?;
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Remove {
    /// The entry's id, or a unique prefix of it
    id: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Remove {
    #[instrument(skip(store))]
    fn run(self, store: &Store) -> anyhow::Result<()> {
        let mut log = store.load_log()?;
        let id = log.resolve(&self.id)?;

        if !self.yes && !confirm("Delete this log entry?")? {
            println!("Cancelled");
            return Ok(());
        }

        if let Some(removed) = log.remove(id) {
            store.save_log(&log)?;
            println!("{}", format!("✅ Deleted entry for {}", removed.name()).success());
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct List {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl List {
    #[instrument(level = "debug", skip(store))]
    fn run(self, store: &Store) -> anyhow::Result<()> {
        let log = store.load_log()?;

        match self.output {
            OutputFormat::Json => {
                let rows: Vec<_> = log
                    .newest_first()
                    .map(|entry| {
                        json!({
                            "id": entry.id(),
                            "name": entry.name(),
                            "symptoms": entry.symptoms(),
                            "date": entry.date(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            OutputFormat::Table if log.is_empty() => {
                println!("No reactions logged yet. Add one with 'detect log add'.");
            }
            OutputFormat::Table => {
                for entry in log.newest_first() {
                    println!(
                        "{}  {}  {}",
                        short_id(entry.id()).dim(),
                        entry.date().format("%Y-%m-%d %H:%M").to_string().dim(),
                        entry.name()
                    );
                    println!("          {}", entry.symptoms());
                }
            }
        }
        Ok(())
    }
}
