mod settings;

pub use settings::{CkbNodeSettings, DatabaseSettings, IndexerSettings, Settings};
