use clap::Parser;
use detective::Store;
use serde_json::json;
use tracing::instrument;

use super::{
    OutputFormat, assistant, short_id,
    terminal::{Colorize, confirm, spinner},
};

#[derive(Debug, clap::Subcommand)]
pub enum Item {
    /// Record an item you reacted to
    Add(Add),

    /// Delete an item
    Remove(Remove),

    /// List recorded items
    List(List),
}

impl Item {
    pub async fn run(self, store: &Store) -> anyhow::Result<()> {
        match self {
            Self::Add(command) => command.run(store).await,
            Self::Remove(command) => command.run(store),
            Self::List(command) => command.run(store),
        }
    }
}

#[derive(Debug, Parser)]
pub struct Add {
    /// What you ate or used, e.g. "Spicy Ramen"
    name: String,

    /// The ingredient list, as printed on the packaging
    #[arg(short, long, default_value = "")]
    ingredients: String,

    /// Split the ingredient list on commas instead of asking the language
    /// model
    #[arg(long)]
    offline: bool,
}

impl Add {
    #[instrument(skip(store))]
    async fn run(self, store: &Store) -> anyhow::Result<()> {
        let mut session = store.load_session()?;
        let assistant = assistant(store, self.offline);

        let before = session.candidates().len();

        let progress = assistant
            .is_online()
            .then(|| spinner("Parsing ingredients..."));
        let result = session
            .add_item(&self.name, &self.ingredients, &assistant)
            .await;
        if let Some(progress) = progress {
            progress.finish_and_clear();
        }
        let item = result?;

        println!(
            "{}",
            format!("✅ Added {} ({})", item.name(), short_id(item.id())).success()
        );
        if item.ingredients().is_empty() {
            println!("{}", "   No ingredients recorded".dim());
        } else {
            println!("   {}", item.ingredients().join(", ").dim());
        }

        let after = session.candidates().len();
        if after > before {
            println!(
                "{}",
                format!("{after} potential allergens. Run 'detect analyze' to see them.").info()
            );
        }

        store.save_session(&session)?;
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Remove {
    /// The item's id, or a unique prefix of it
    id: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Remove {
    #[instrument(skip(store))]
    fn run(self, store: &Store) -> anyhow::Result<()> {
        let mut session = store.load_session()?;
        let id = session.items().resolve(&self.id)?;

        if !self.yes {
            let name = session.items().get(id).map_or("", |item| item.name());
            if !confirm(&format!("Delete {name}?"))? {
                println!("Cancelled");
                return Ok(());
            }
        }

        if let Some(removed) = session.remove_item(id) {
            store.save_session(&session)?;
            println!("{}", format!("✅ Deleted {}", removed.name()).success());
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
        let items = store.load_items()?;

        match self.output {
            OutputFormat::Json => {
                let rows: Vec<_> = items
                    .list()
                    .iter()
                    .map(|item| {
                        json!({
                            "id": item.id(),
                            "name": item.name(),
                            "rawIngredients": item.raw_text(),
                            "ingredients": item.ingredients(),
                            "created": item.created(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            OutputFormat::Table => {
                if items.is_empty() {
                    println!("No items yet. Add one with 'detect item add'.");
                    return Ok(());
                }
                for item in items.list() {
                    println!(
                        "{}  {}  {}",
                        short_id(item.id()).dim(),
                        item.name(),
                        item.created().format("%Y-%m-%d").to_string().dim()
                    );
                    if !item.ingredients().is_empty() {
                        println!("          {}", item.ingredients().join(", ").dim());
                    }
                }
            }
        }
        Ok(())
    }
}
