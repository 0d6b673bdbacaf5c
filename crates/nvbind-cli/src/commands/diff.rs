//! Diff command
//!
//! Usage: nvbind diff <OLD> <NEW> [--json]

use clap::Args;
use std::path::PathBuf;

use nvbind_core::diff::{diff_list, render_summary};
use nvbind_core::Item;

use super::read_json;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Previous snapshot (JSON array of volumes)
    pub old: PathBuf,

    /// Next snapshot (JSON array of volumes)
    pub new: PathBuf,

    /// Print the structured diff as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(&args)?);
    Ok(())
}

fn render(args: &DiffArgs) -> Result<String, Box<dyn std::error::Error>> {
    let old: Vec<Item> = read_json(&args.old)?;
    let new: Vec<Item> = read_json(&args.new)?;
    let d = diff_list(&old, &new);

    if args.json {
        Ok(format!("{}\n", serde_json::to_string_pretty(&d)?))
    } else {
        Ok(render_summary(&d))
    }
}
