use clap::Parser;
use detective::Store;
use serde_json::json;
use tracing::instrument;

use super::{
    OutputFormat, assistant,
    terminal::{Colorize, is_narrow},
};

const TOP_CANDIDATES: usize = 5;

#[derive(Debug, Parser, Default)]
#[command(about = "Show counts and the leading candidates")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

impl Status {
    #[instrument(level = "debug", skip(self, store))]
    pub fn run(self, store: &Store) -> anyhow::Result<()> {
        if !store.is_initialized() {
            println!("Nothing recorded yet. Run 'detect init' to get started.");
            return Ok(());
        }

        let session = store.load_session()?;
        let log = store.load_log()?;
        let online = assistant(store, false).is_online();

        let items = session.items().len();
        let allergies = session.known_allergies().len();
        let reactions = log.len();
        let candidates = session.candidates();

        match self.output {
            OutputFormat::Json => {
                let top: Vec<_> = candidates.iter().take(TOP_CANDIDATES).collect();
                let output = json!({
                    "items": items,
                    "known_allergies": allergies,
                    "log_entries": reactions,
                    "candidates": candidates.len(),
                    "top_candidates": top,
                    "language_model": online,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table if self.quiet => {
                println!(
                    "items={items} allergies={allergies} log={reactions} candidates={}",
                    candidates.len()
                );
            }
            OutputFormat::Table => {
                println!("Records");
                println!("{}", "───────".dim());
                if is_narrow() {
                    println!("Items: {items}");
                    println!("Known allergies: {allergies}");
                    println!("Logged reactions: {reactions}");
                } else {
                    println!("{:<18} {items}", "Items");
                    println!("{:<18} {allergies}", "Known allergies");
                    println!("{:<18} {reactions}", "Logged reactions");
                }

                println!();

                if candidates.is_empty() {
                    println!("Candidates: {} ✅", "0".success());
                } else {
                    println!("Candidates: {} ⚠️", candidates.len().to_string().warning());
                    for candidate in candidates.iter().take(TOP_CANDIDATES) {
                        println!("  - {} ({})", candidate.name, candidate.count);
                    }
                    if candidates.len() > TOP_CANDIDATES {
                        println!("  - ... and {} more", candidates.len() - TOP_CANDIDATES);
                    }
                    println!("{}", "Run 'detect analyze' for details.".dim());
                }

                if !online {
                    println!();
                    println!(
                        "{}",
                        "Language model unavailable: ingredient lists are split on commas.".info()
                    );
                }
            }
        }

        Ok(())
    }
}
