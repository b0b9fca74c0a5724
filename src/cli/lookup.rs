use clap::Parser;
use detective::{
    Store,
    domain::{Detail, SelectOutcome, Selection, ingredient::normalize},
    services::IngredientDescriber,
};
use tracing::instrument;

use super::{analyze::print_detail, assistant, terminal::spinner};

/// Describe any ingredient, whether or not it is a candidate.
#[derive(Debug, Parser)]
pub struct Lookup {
    /// The ingredient to describe
    term: String,
}

impl Lookup {
    #[instrument(skip(store))]
    pub async fn run(self, store: &Store) -> anyhow::Result<()> {
        let term = normalize(&self.term);
        if term.is_empty() {
            anyhow::bail!("nothing to look up");
        }

        let assistant = assistant(store, false);
        let mut selection = Selection::default();

        if let SelectOutcome::Lookup(ticket) = selection.select(&term) {
            let progress = spinner(&format!("Looking up {term}..."));
            let result = assistant.describe(ticket.name()).await;
            progress.finish_and_clear();
            selection.complete(&ticket, result);
        }

        print_detail(&term, selection.detail().unwrap_or(&Detail::Unavailable));
        Ok(())
    }
}
