//! Replay command
//!
//! Usage: nvbind replay <SNAPSHOT>... [--options <FILE>] [--config <FILE>]
//!
//! Mounts a binding over the recording viewer, applies each snapshot as one
//! pass, and prints the viewer calls each pass made.

use clap::Args;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nvbind_core::errors::BindingError;
use nvbind_core::logging_facility::init;
use nvbind_core::viewer::{RecordingViewer, Viewer, ViewerCall};
use nvbind_core::{BindingConfig, Item, ViewerOptions};
use nvbind_engine::{Binding, Props};

use super::read_json;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Snapshot files, applied in order
    #[arg(required = true)]
    pub snapshots: Vec<PathBuf>,

    /// Viewer options used by every snapshot without its own
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Binding configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// A snapshot file: either a bare array of volumes or volumes plus options.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Volumes(Vec<Item>),
    Full(FullSnapshot),
}

/// Unknown keys are rejected so a misspelt `volumes` cannot read as an
/// empty snapshot.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FullSnapshot {
    #[serde(default)]
    volumes: Vec<Item>,
    options: Option<ViewerOptions>,
}

/// Execute replay command
pub fn execute(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => BindingConfig::from_path(path)?,
        None => BindingConfig::default(),
    };
    init(config.log_profile);

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let out = runtime.block_on(replay(&args, &config))?;
    print!("{}", out);
    Ok(())
}

async fn replay(
    args: &ReplayArgs,
    config: &BindingConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let shared_options: Option<Arc<ViewerOptions>> = match &args.options {
        Some(path) => Some(Arc::new(read_json(path)?)),
        None => None,
    };

    let mut binding = Binding::from_config(RecordingViewer::new(), config);
    binding.mount().await?;
    if !matches!(binding.viewer().gl(), Ok(true)) {
        return Err(BindingError::NotReady {
            state: binding.state().to_string(),
        }
        .into());
    }

    let mut out = String::new();
    write_calls(&mut out, "mount", &binding.viewer_mut().take_calls())?;

    for (i, path) in args.snapshots.iter().enumerate() {
        let (volumes, options) = match read_json::<SnapshotFile>(path)? {
            SnapshotFile::Volumes(volumes) => (volumes, shared_options.clone()),
            SnapshotFile::Full(FullSnapshot { volumes, options }) => (
                volumes,
                options.map(Arc::new).or_else(|| shared_options.clone()),
            ),
        };
        let props = Props {
            volumes: Some(Arc::new(volumes)),
            options,
            ..Props::default()
        };

        let outcome = binding.update(&props).await?;
        let header = format!(
            "pass {}: {} ({})",
            i + 1,
            display_name(path),
            if outcome.changed { "changed" } else { "unchanged" }
        );
        write_calls(&mut out, &header, &binding.viewer_mut().take_calls())?;
    }

    Ok(out)
}

fn write_calls(
    out: &mut String,
    header: &str,
    calls: &[ViewerCall],
) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(out, "== {}", header)?;
    for call in calls {
        writeln!(out, "  {}", serde_json::to_string(call)?)?;
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
