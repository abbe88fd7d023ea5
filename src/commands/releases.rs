//! Release listing.

use anyhow::Result;

use crate::config::Config;
use crate::release::ReleaseStore;

/// Print the dated releases in the store, marking the active one.
pub fn cmd_list_releases(config: &Config) -> Result<()> {
    let store = ReleaseStore::new(config.release_store());
    for line in release_lines(&store)? {
        println!("{}", line);
    }
    Ok(())
}

/// Listing lines: a header, then one `<marker> <date>` line per release.
pub fn release_lines(store: &ReleaseStore) -> Result<Vec<String>> {
    let current = store.current();
    let releases = store.releases()?;

    let mut lines = vec![format!("Releases in {}:", store.root().display())];
    if releases.is_empty() {
        lines.push("  (none)".to_string());
    }
    for date in releases {
        let marker = if current.as_ref() == Some(&date) { "*" } else { " " };
        lines.push(format!("{} {}", marker, date));
    }
    Ok(lines)
}
