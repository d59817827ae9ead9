//! Cache command implementation.

use miette::Result;
use pinion_core::config::PinionConfig;
use pinion_resolver::ManifestStore;
use pinion_util::errors::PinionError;
use pinion_util::progress::{format_size, status};

use crate::cli::CacheAction;

pub fn exec(config: &PinionConfig, action: CacheAction) -> Result<()> {
    let store = ManifestStore::new(config.cache.dir_path());
    match action {
        CacheAction::Stats => {
            let stats = store.stats();
            println!("Manifest cache: {}", store.root().display());
            println!("  Entries: {}", stats.entries);
            println!("  Size:    {}", format_size(stats.bytes));
            if !config.cache.persistent {
                println!("  (persistence is disabled in the config)");
            }
            Ok(())
        }
        CacheAction::Clear => {
            let freed = store.stats().bytes;
            let removed = store.clear().map_err(PinionError::Io)?;
            status(
                "Cleared",
                &format!("{removed} cached manifests ({} freed)", format_size(freed)),
            );
            Ok(())
        }
    }
}
