//! Declarative binding over a single viewer.
//!
//! ## Reconciliation pass (in order):
//! 1. Options diff, skipped when the options `Arc` is unchanged
//! 2. Apply the options diff
//! 3. Volume list diff, skipped when the volumes `Arc` is unchanged
//! 4. Added volumes: reload previous-minus-removed plus added
//! 5. Otherwise removed volumes: remove one by one
//! 6. Patch changed volumes in place
//! 7. Fire `on_changed` once if any step changed the viewer
//!
//! The volume snapshot is committed before any mutation, so a missing patch
//! target fails only the pass that hit it. A failed bulk load is the
//! exception: the previous snapshot is kept and the next input retries it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use nvbind_core::diff::{diff_list, diff_primitive};
use nvbind_core::errors::{BindingError, ExError, Result};
use nvbind_core::model::{Item, ViewerOptions};
use nvbind_core::viewer::Viewer;
use nvbind_core::{log_op_end, log_op_error, log_op_start, BindingConfig, Mutator, RoutingTable};
use nvbind_core_types::PassId;
use tracing::Instrument;

/// Lifecycle of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Uninitialized,
    /// Attachment is in flight
    Attaching,
    Ready,
}

impl std::fmt::Display for BindingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BindingState::Uninitialized => "uninitialized",
            BindingState::Attaching => "attaching",
            BindingState::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Declarative input of one pass.
///
/// Inputs are compared by `Arc` identity, never deeply. Pass a new `Arc`
/// whenever the content changes; mutating shared content in place goes
/// unnoticed.
#[derive(Debug, Clone, Default)]
pub struct Props {
    pub volumes: Option<Arc<Vec<Item>>>,
    /// Not supported yet; any value fails the pass
    pub meshes: Option<Arc<Vec<Item>>>,
    pub options: Option<Arc<ViewerOptions>>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volumes(mut self, volumes: Vec<Item>) -> Self {
        self.volumes = Some(Arc::new(volumes));
        self
    }

    pub fn with_options(mut self, options: ViewerOptions) -> Self {
        self.options = Some(Arc::new(options));
        self
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    pub pass_id: PassId,
    /// Whether the pass mutated the viewer
    pub changed: bool,
}

type Hook<V> = Box<dyn FnMut(&mut V) + Send>;

/// Owns the viewer and reconciles it against successive [`Props`].
pub struct Binding<V: Viewer> {
    mutator: Mutator<V>,
    state: BindingState,
    anti_alias: Option<bool>,
    prev_volumes: Option<Arc<Vec<Item>>>,
    prev_options: Option<Arc<ViewerOptions>>,
    on_start: Option<Hook<V>>,
    on_changed: Option<Hook<V>>,
}

impl<V: Viewer> Binding<V> {
    pub fn new(viewer: V) -> Self {
        Self::with_routes(viewer, RoutingTable::new())
    }

    pub fn with_routes(viewer: V, routes: RoutingTable) -> Self {
        Self {
            mutator: Mutator::with_routes(viewer, routes),
            state: BindingState::Uninitialized,
            anti_alias: None,
            prev_volumes: None,
            prev_options: None,
            on_start: None,
            on_changed: None,
        }
    }

    /// Routing overrides and attach flags from `config`.
    pub fn from_config(viewer: V, config: &BindingConfig) -> Self {
        let mut binding = Self::with_routes(viewer, config.routing_table());
        binding.anti_alias = config.anti_alias;
        binding
    }

    /// Called once after attachment, before anything is loaded.
    pub fn on_start(mut self, hook: impl FnMut(&mut V) + Send + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    /// Called after every pass that changed the viewer.
    pub fn on_changed(mut self, hook: impl FnMut(&mut V) + Send + 'static) -> Self {
        self.on_changed = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn viewer(&self) -> &V {
        self.mutator.viewer()
    }

    pub fn viewer_mut(&mut self) -> &mut V {
        self.mutator.viewer_mut()
    }

    pub fn into_viewer(self) -> V {
        self.mutator.into_inner()
    }

    /// Attach the viewer and fire `on_start`.
    ///
    /// Mounting an already mounted binding does nothing. A failed attach
    /// returns the binding to `Uninitialized` so the caller can retry.
    pub async fn mount(&mut self) -> Result<()> {
        if self.state != BindingState::Uninitialized {
            return Ok(());
        }
        let start = Instant::now();
        log_op_start!("mount");
        self.state = BindingState::Attaching;

        if let Err(e) = self.mutator.viewer_mut().attach_to_canvas(self.anti_alias).await {
            self.state = BindingState::Uninitialized;
            let err = BindingError::AttachFailed {
                message: e.to_string(),
            };
            log_op_error!(
                "mount",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            return Err(err);
        }

        self.state = BindingState::Ready;
        if let Some(hook) = self.on_start.as_mut() {
            hook(self.mutator.viewer_mut());
        }
        log_op_end!("mount", duration_ms = start.elapsed().as_millis() as u64);
        Ok(())
    }

    /// Run one reconciliation pass against `props`.
    ///
    /// Before the binding is ready, or while the rendering context is
    /// unavailable, the pass does nothing and reports no change.
    pub async fn update(&mut self, props: &Props) -> Result<PassOutcome> {
        let pass_id = PassId::new();
        let span = tracing::info_span!("reconcile_pass", pass_id = %pass_id);
        self.run_pass(props, pass_id).instrument(span).await
    }

    async fn run_pass(&mut self, props: &Props, pass_id: PassId) -> Result<PassOutcome> {
        if props.meshes.is_some() {
            return Err(BindingError::MeshesUnsupported);
        }
        if self.state != BindingState::Ready || !self.mutator.gl_is_ready() {
            tracing::debug!(state = %self.state, "viewer not ready, skipping pass");
            return Ok(PassOutcome {
                pass_id,
                changed: false,
            });
        }

        let start = Instant::now();
        log_op_start!("reconcile_pass", pass_id = pass_id.as_str());

        let options_changed = self.sync_options(props.options.as_ref());
        let volumes_changed = match self.sync_volumes(props.volumes.as_ref()).await {
            Ok(changed) => changed,
            Err(err) => {
                log_op_error!(
                    "reconcile_pass",
                    ExError::from(err.clone()).with_pass_id(pass_id.clone()),
                    duration_ms = start.elapsed().as_millis() as u64,
                    pass_id = pass_id.as_str()
                );
                return Err(err);
            }
        };

        let changed = options_changed || volumes_changed;
        if changed {
            if let Some(hook) = self.on_changed.as_mut() {
                hook(self.mutator.viewer_mut());
            }
        }

        log_op_end!(
            "reconcile_pass",
            duration_ms = start.elapsed().as_millis() as u64,
            pass_id = pass_id.as_str(),
            changed = changed
        );
        Ok(PassOutcome { pass_id, changed })
    }

    fn sync_options(&mut self, next: Option<&Arc<ViewerOptions>>) -> bool {
        if same_input(self.prev_options.as_ref(), next) {
            return false;
        }
        let empty = ViewerOptions::new();
        let prev = self.prev_options.as_deref().unwrap_or(&empty);
        let changes = diff_primitive(
            prev.as_fields(),
            next.map_or(&empty, |o| &**o).as_fields(),
        );
        self.prev_options = next.cloned();

        if changes.is_empty() {
            return false;
        }
        self.mutator.apply_options(&changes);
        true
    }

    async fn sync_volumes(&mut self, next: Option<&Arc<Vec<Item>>>) -> Result<bool> {
        if same_input(self.prev_volumes.as_ref(), next) {
            return Ok(false);
        }
        // Committed before mutating: a failed patch ends this pass only and
        // later passes diff against `next`. A failed bulk load restores it.
        let previous = std::mem::replace(&mut self.prev_volumes, next.cloned());
        let prev: &[Item] = previous.as_deref().map(Vec::as_slice).unwrap_or_default();
        let next_items: &[Item] = next.map(|v| v.as_slice()).unwrap_or_default();

        let d = diff_list(prev, next_items);
        tracing::debug!(
            added_len = d.added.len(),
            removed_len = d.removed.len(),
            changed_len = d.changed.len(),
            "volume diff"
        );
        if d.is_empty() {
            return Ok(false);
        }

        if !d.added.is_empty() {
            // Bulk load replaces everything, so survivors are loaded again.
            let removed: HashSet<&str> = d.removed.iter().map(|v| v.url.as_str()).collect();
            let to_load: Vec<Item> = prev
                .iter()
                .filter(|v| !removed.contains(v.url.as_str()))
                .chain(&d.added)
                .cloned()
                .collect();
            if let Err(err) = self.mutator.load_volumes(&to_load).await {
                self.prev_volumes = previous;
                return Err(err);
            }
        } else {
            for v in &d.removed {
                self.mutator.remove_by_url(&v.url);
            }
        }

        for change in &d.changed {
            self.mutator.apply_volume_changes(change)?;
        }
        Ok(true)
    }
}

fn same_input<T>(prev: Option<&Arc<T>>, next: Option<&Arc<T>>) -> bool {
    match (prev, next) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
