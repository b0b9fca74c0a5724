use clap::Parser;
use detective::{
    Store,
    services::{BarcodeLookup, OpenFoodFactsClient, is_valid_barcode},
};
use tracing::instrument;

use super::{
    assistant, short_id,
    terminal::{Colorize, spinner},
};

/// Look up a packaged product by its barcode.
#[derive(Debug, Parser)]
pub struct Scan {
    /// The EAN or UPC barcode (8 to 14 digits)
    barcode: String,

    /// Record the product as an item you reacted to
    #[arg(long)]
    add: bool,

    /// Split the ingredient list on commas instead of asking the language
    /// model (with --add)
    #[arg(long, requires = "add")]
    offline: bool,
}

impl Scan {
    #[instrument(skip(store))]
    pub async fn run(self, store: &Store) -> anyhow::Result<()> {
        let barcode = self.barcode.trim();
        if !is_valid_barcode(barcode) {
            anyhow::bail!("'{barcode}' is not a valid barcode (expected 8 to 14 digits)");
        }

        let config = store.load_config();
        let products =
            OpenFoodFactsClient::new(config.product_database_url(), config.request_timeout())?;

        let progress = spinner(&format!("Looking up {barcode}..."));
        let product = products.lookup(barcode).await;
        progress.finish_and_clear();

        let Some(product) = product? else {
            println!("{}", format!("⚠️  Product {barcode} not found.").warning());
            println!(
                "{}",
                "Try manual entry with 'detect item add <NAME> --ingredients <TEXT>'.".dim()
            );
            return Ok(());
        };

        println!("{}", product.name.strong());
        println!("{}", product.ingredients_text);

        if !self.add {
            return Ok(());
        }

        let mut session = store.load_session()?;
        let assistant = assistant(store, self.offline);
        let progress = assistant
            .is_online()
            .then(|| spinner("Parsing ingredients..."));
        let result = session
            .add_item(&product.name, &product.ingredients_text, &assistant)
            .await;
        if let Some(progress) = progress {
            progress.finish_and_clear();
        }
        let item = result?;

        println!();
        println!(
            "{}",
            format!(
                "✅ Added {} ({}, {} ingredients)",
                item.name(),
                short_id(item.id()),
                item.ingredients().len()
            )
            .success()
        );

        store.save_session(&session)?;
        Ok(())
    }
}
