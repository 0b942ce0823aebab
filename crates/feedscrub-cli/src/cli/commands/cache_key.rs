//! Cache-key command: print the image-proxy key for a URL.

use anyhow::Result;
use feedscrub_core::cache::{NameFilter, Sha256NameFilter};

pub fn run_cache_key(url: &str) -> Result<()> {
    println!("{}", Sha256NameFilter.filter(url));
    Ok(())
}
