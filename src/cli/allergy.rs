use clap::Parser;
use detective::Store;
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

#[derive(Debug, clap::Subcommand)]
pub enum Allergy {
    /// Record confirmed allergies
    Add(Names),

    /// Forget confirmed allergies
    Remove(Names),

    /// List confirmed allergies
    List(List),
}

#[derive(Debug, Parser)]
pub struct Names {
    /// Ingredient names (case-insensitive)
    #[arg(required = true)]
    names: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct List {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Allergy {
    #[instrument(skip(store))]
    pub fn run(self, store: &Store) -> anyhow::Result<()> {
        match self {
            Self::Add(Names { names }) => {
                let mut session = store.load_session()?;
                for name in &names {
                    if session.add_allergy(name) {
                        println!("{}", format!("✅ Added {}", name.trim()).success());
                    } else {
                        println!("{}", format!("{} is already known", name.trim()).dim());
                    }
                }
                store.save_session(&session)?;
            }
            Self::Remove(Names { names }) => {
                let mut session = store.load_session()?;
                for name in &names {
                    if session.remove_allergy(name) {
                        println!("{}", format!("✅ Removed {}", name.trim()).success());
                    } else {
                        println!(
                            "{}",
                            format!("⚠️  {} is not a known allergy", name.trim()).warning()
                        );
                    }
                }
                store.save_session(&session)?;
            }
            Self::List(List { output }) => {
                let allergies = store.load_allergies()?;
                match output {
                    OutputFormat::Json => {
                        let names: Vec<_> = allergies.iter().collect();
                        println!("{}", serde_json::to_string_pretty(&names)?);
                    }
                    OutputFormat::Table if allergies.is_empty() => {
                        println!("No known allergies.");
                    }
                    OutputFormat::Table => {
                        for name in allergies.iter() {
                            println!("• {name}");
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
