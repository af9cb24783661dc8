//! `dsfetch plan` – list targets and whether each would be fetched.

use anyhow::Result;
use std::path::Path;

pub fn run_plan(manifest: &Path, output_dir: &Path, force: bool) -> Result<()> {
    let planned = dsfetch_core::plan(manifest, output_dir, force)?;
    if planned.is_empty() {
        println!("Manifest has no entries.");
        return Ok(());
    }
    println!("{:<4} {:<7} {:<40} {}", "#", "ACTION", "FILE", "URL");
    let mut to_fetch = 0;
    for p in &planned {
        let action = if p.will_fetch {
            to_fetch += 1;
            "fetch"
        } else {
            "cached"
        };
        println!(
            "{:<4} {:<7} {:<40} {}",
            p.target.index() + 1,
            action,
            p.target.absolute_path().display(),
            p.target.url()
        );
    }
    println!("{} to fetch, {} cached", to_fetch, planned.len() - to_fetch);
    Ok(())
}
