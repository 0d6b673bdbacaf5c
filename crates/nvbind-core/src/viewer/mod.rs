//! Viewer port: the capability surface the binding drives.
//!
//! The rendering engine itself is out of scope. The binding only relies on
//! the calls below, so any engine (or the in-memory [`RecordingViewer`]) can
//! sit behind it.

pub mod recording;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Fields, Item};

pub use recording::{RecordingViewer, ViewerCall};

/// Failures reported by the viewer itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    /// The rendering context does not exist yet (not attached)
    #[error("rendering context unavailable")]
    ContextUnavailable,
    #[error("attach failed: {0}")]
    Attach(String),
    #[error("load failed: {0}")]
    Load(String),
}

/// A loaded volume as the viewer identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VolumeHandle {
    /// Viewer-assigned id, fresh on every load
    pub id: String,
    /// Source URL the volume was loaded from
    pub url: String,
}

/// Stateful medical image viewer.
///
/// One instance is owned by one binding for the binding's whole lifetime.
/// Setter methods redraw on their own; direct writes through
/// [`Viewer::opts_mut`], [`Viewer::instance_fields_mut`] and
/// [`Viewer::volume_fields_mut`] take effect on the next
/// [`Viewer::update_gl_volume`].
#[async_trait]
pub trait Viewer: Send {
    /// Attach to the drawing surface and create the rendering context.
    async fn attach_to_canvas(&mut self, is_anti_alias: Option<bool>) -> Result<(), ViewerError>;

    /// Rendering context accessor. May fail, or report `false`, before attachment.
    fn gl(&self) -> Result<bool, ViewerError>;

    /// Load `volumes`, replacing every volume currently loaded.
    async fn load_volumes(&mut self, volumes: &[Item]) -> Result<(), ViewerError>;

    fn remove_volume_by_url(&mut self, url: &str);

    fn volume_by_url(&self, url: &str) -> Option<VolumeHandle>;

    /// Loaded volumes in draw order.
    fn volumes(&self) -> Vec<VolumeHandle>;

    fn volume_index_by_id(&self, id: &str) -> Option<usize> {
        self.volumes().iter().position(|v| v.id == id)
    }

    // ----- option setters -----

    fn set_crosshair_width(&mut self, width: f64);

    fn set_crosshair_color(&mut self, rgba: Vec<f64>);

    fn set_vol_scale_multiplier(&mut self, scale: f64);

    /// The generic options bag.
    fn opts_mut(&mut self) -> &mut Fields;

    /// Top-level instance state for options without a bag entry.
    fn instance_fields_mut(&mut self) -> &mut Fields;

    // ----- volume setters -----

    /// Opacity is addressed by position in [`Viewer::volumes`].
    fn set_opacity(&mut self, index: usize, opacity: f64);

    fn set_colormap(&mut self, id: &str, colormap: &str);

    fn set_colormap_negative(&mut self, id: &str, colormap: &str);

    /// Modulate `target_id` by `modulate_id`, or clear the modulation with `None`.
    fn set_modulation_image(&mut self, target_id: &str, modulate_id: Option<&str>, modulate_alpha: f64);

    /// Direct access to a loaded volume's display state.
    fn volume_fields_mut(&mut self, id: &str) -> Option<&mut Fields>;

    /// Consolidated redraw after direct state writes.
    fn update_gl_volume(&mut self);
}
