mod records;
mod store;

pub use store::{DATA_DIR, Key, SaveError, Store, StoreError};
