use clap::Parser;
use detective::{
    AllergenCandidate, Store,
    domain::{Detail, selection::UNAVAILABLE},
};
use tracing::instrument;

use super::{
    OutputFormat, assistant, markdown,
    terminal::{Colorize, is_narrow, spinner},
};

/// Rank the ingredients that recur across reaction items.
#[derive(Debug, Parser)]
pub struct Analyze {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Describe one of the candidates
    #[arg(long, value_name = "NAME")]
    select: Option<String>,
}

impl Analyze {
    #[instrument(level = "debug", skip(store))]
    pub async fn run(self, store: &Store) -> anyhow::Result<()> {
        let mut session = store.load_session()?;

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(session.candidates())?);
            }
            OutputFormat::Table => output_table(session.candidates(), session.items().len()),
        }

        let Some(name) = self.select else {
            return Ok(());
        };
        let name = detective::domain::ingredient::normalize(&name);

        let assistant = assistant(store, false);
        let progress = spinner(&format!("Looking up {name}..."));
        let detail = session.select_and_describe(&name, &assistant).await;
        progress.finish_and_clear();

        println!();
        print_detail(&name, detail?);
        Ok(())
    }
}

fn output_table(candidates: &[AllergenCandidate], item_count: usize) {
    if candidates.is_empty() {
        if item_count < 2 {
            println!("Add at least two items to start finding shared ingredients.");
        } else {
            println!("No ingredient appears in more than one item yet.");
        }
        return;
    }

    println!("Potential allergens");
    println!("{}", "───────────────────".dim());

    let narrow = is_narrow();
    for (rank, candidate) in candidates.iter().enumerate() {
        let items = candidate.contributing_items.join(", ");
        if narrow {
            println!("{}. {} ({})", rank + 1, candidate.name, candidate.count);
            println!("   {}", items.dim());
        } else {
            println!(
                "{:>2}. {:<24} {:>3}  {}",
                rank + 1,
                candidate.name,
                candidate.count,
                items.dim()
            );
        }
    }
}

/// Print the selected candidate's description.
pub fn print_detail(name: &str, detail: &Detail) {
    println!("{}", name.strong());
    match detail {
        Detail::Ready(text) => println!("{}", markdown::render(text, |s: &str| s.strong())),
        Detail::Unavailable => println!("{}", UNAVAILABLE.warning()),
        Detail::Loading => println!("{}", "Loading...".dim()),
    }
}
