//! In-memory viewer that records every call.
//!
//! `RecordingViewer` keeps volume, option and instance state in plain maps
//! without any rendering. Use it to verify the call sequence a reconciliation
//! produces, and from the CLI to preview what a snapshot sequence would do.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::model::{Fields, Item};
use crate::viewer::{Viewer, ViewerError, VolumeHandle};

/// One call made against the viewer, in the order it happened.
///
/// Direct writes into the options bag, instance fields or volume fields are
/// state changes, not calls; inspect them through the accessors instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ViewerCall {
    AttachToCanvas { anti_alias: Option<bool> },
    /// Bulk load started with exactly these items
    LoadVolumes { volumes: Vec<Item> },
    /// Bulk load finished (successfully or not)
    LoadVolumesDone { urls: Vec<String> },
    RemoveVolumeByUrl { url: String },
    SetCrosshairWidth { width: f64 },
    SetCrosshairColor { rgba: Vec<f64> },
    SetVolScaleMultiplier { scale: f64 },
    SetOpacity { index: usize, opacity: f64 },
    SetColormap { id: String, colormap: String },
    SetColormapNegative { id: String, colormap: String },
    SetModulationImage {
        target_id: String,
        modulate_id: Option<String>,
        modulate_alpha: f64,
    },
    UpdateGlVolume,
}

#[derive(Debug, Clone)]
struct LoadedVolume {
    handle: VolumeHandle,
    fields: Fields,
}

/// Mock viewer for tests and dry runs.
#[derive(Debug)]
pub struct RecordingViewer {
    attached: bool,
    volumes: Vec<LoadedVolume>,
    opts: Fields,
    instance: Fields,
    calls: Vec<ViewerCall>,
    next_id: u64,
    attach_error: Option<String>,
    load_error: Option<String>,
    yield_during_load: bool,
}

impl Default for RecordingViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingViewer {
    /// Create a detached viewer with default options.
    pub fn new() -> Self {
        Self {
            attached: false,
            volumes: Vec::new(),
            opts: default_opts(),
            instance: default_instance_fields(),
            calls: Vec::new(),
            next_id: 1,
            attach_error: None,
            load_error: None,
            yield_during_load: false,
        }
    }

    /// Make `attach_to_canvas` fail with `message`.
    pub fn with_failing_attach(mut self, message: impl Into<String>) -> Self {
        self.attach_error = Some(message.into());
        self
    }

    /// Make every `load_volumes` fail with `message`.
    pub fn with_failing_load(mut self, message: impl Into<String>) -> Self {
        self.load_error = Some(message.into());
        self
    }

    /// Suspend in the middle of every bulk load, so other tasks get to run.
    pub fn with_yielding_loads(mut self) -> Self {
        self.yield_during_load = true;
        self
    }

    pub fn calls(&self) -> &[ViewerCall] {
        &self.calls
    }

    /// Drain the recorded calls.
    pub fn take_calls(&mut self) -> Vec<ViewerCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn count_calls<F>(&self, predicate: F) -> usize
    where
        F: Fn(&ViewerCall) -> bool,
    {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn opts(&self) -> &Fields {
        &self.opts
    }

    pub fn instance_fields(&self) -> &Fields {
        &self.instance
    }

    /// Display state of the loaded volume with this URL.
    pub fn volume_fields(&self, url: &str) -> Option<&Fields> {
        self.volumes
            .iter()
            .find(|v| v.handle.url == url)
            .map(|v| &v.fields)
    }

    /// URLs of the loaded volumes in draw order.
    pub fn loaded_urls(&self) -> Vec<String> {
        self.volumes.iter().map(|v| v.handle.url.clone()).collect()
    }

    fn fields_by_id(&mut self, id: &str) -> Option<&mut Fields> {
        self.volumes
            .iter_mut()
            .find(|v| v.handle.id == id)
            .map(|v| &mut v.fields)
    }
}

#[async_trait]
impl Viewer for RecordingViewer {
    async fn attach_to_canvas(&mut self, is_anti_alias: Option<bool>) -> Result<(), ViewerError> {
        self.calls.push(ViewerCall::AttachToCanvas {
            anti_alias: is_anti_alias,
        });
        if let Some(message) = &self.attach_error {
            return Err(ViewerError::Attach(message.clone()));
        }
        self.attached = true;
        Ok(())
    }

    fn gl(&self) -> Result<bool, ViewerError> {
        if self.attached {
            Ok(true)
        } else {
            Err(ViewerError::ContextUnavailable)
        }
    }

    async fn load_volumes(&mut self, volumes: &[Item]) -> Result<(), ViewerError> {
        let urls: Vec<String> = volumes.iter().map(|v| v.url.clone()).collect();
        self.calls.push(ViewerCall::LoadVolumes {
            volumes: volumes.to_vec(),
        });

        if self.yield_during_load {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }

        if let Some(message) = &self.load_error {
            self.calls.push(ViewerCall::LoadVolumesDone { urls });
            return Err(ViewerError::Load(message.clone()));
        }

        self.volumes.clear();
        for item in volumes {
            let id = format!("volume-{}", self.next_id);
            self.next_id += 1;
            self.volumes.push(LoadedVolume {
                handle: VolumeHandle {
                    id,
                    url: item.url.clone(),
                },
                fields: item.fields.clone(),
            });
        }
        self.calls.push(ViewerCall::LoadVolumesDone { urls });
        Ok(())
    }

    fn remove_volume_by_url(&mut self, url: &str) {
        self.calls.push(ViewerCall::RemoveVolumeByUrl {
            url: url.to_string(),
        });
        self.volumes.retain(|v| v.handle.url != url);
    }

    fn volume_by_url(&self, url: &str) -> Option<VolumeHandle> {
        self.volumes
            .iter()
            .find(|v| v.handle.url == url)
            .map(|v| v.handle.clone())
    }

    fn volumes(&self) -> Vec<VolumeHandle> {
        self.volumes.iter().map(|v| v.handle.clone()).collect()
    }

    fn set_crosshair_width(&mut self, width: f64) {
        self.calls.push(ViewerCall::SetCrosshairWidth { width });
        self.opts.insert("crosshairWidth".into(), json!(width));
    }

    fn set_crosshair_color(&mut self, rgba: Vec<f64>) {
        self.opts.insert("crosshairColor".into(), json!(rgba));
        self.calls.push(ViewerCall::SetCrosshairColor { rgba });
    }

    fn set_vol_scale_multiplier(&mut self, scale: f64) {
        self.calls.push(ViewerCall::SetVolScaleMultiplier { scale });
        self.instance.insert("volScaleMultiplier".into(), json!(scale));
    }

    fn opts_mut(&mut self) -> &mut Fields {
        &mut self.opts
    }

    fn instance_fields_mut(&mut self) -> &mut Fields {
        &mut self.instance
    }

    fn set_opacity(&mut self, index: usize, opacity: f64) {
        self.calls.push(ViewerCall::SetOpacity { index, opacity });
        if let Some(v) = self.volumes.get_mut(index) {
            v.fields.insert("opacity".into(), json!(opacity));
        }
    }

    fn set_colormap(&mut self, id: &str, colormap: &str) {
        self.calls.push(ViewerCall::SetColormap {
            id: id.to_string(),
            colormap: colormap.to_string(),
        });
        if let Some(fields) = self.fields_by_id(id) {
            fields.insert("colormap".into(), json!(colormap));
        }
    }

    fn set_colormap_negative(&mut self, id: &str, colormap: &str) {
        self.calls.push(ViewerCall::SetColormapNegative {
            id: id.to_string(),
            colormap: colormap.to_string(),
        });
        if let Some(fields) = self.fields_by_id(id) {
            fields.insert("colormapNegative".into(), json!(colormap));
        }
    }

    fn set_modulation_image(&mut self, target_id: &str, modulate_id: Option<&str>, modulate_alpha: f64) {
        self.calls.push(ViewerCall::SetModulationImage {
            target_id: target_id.to_string(),
            modulate_id: modulate_id.map(str::to_string),
            modulate_alpha,
        });
        if let Some(fields) = self.fields_by_id(target_id) {
            fields.insert("modulateAlpha".into(), json!(modulate_alpha));
        }
    }

    fn volume_fields_mut(&mut self, id: &str) -> Option<&mut Fields> {
        self.fields_by_id(id)
    }

    fn update_gl_volume(&mut self) {
        self.calls.push(ViewerCall::UpdateGlVolume);
    }
}

/// Defaults of the options bag, a subset of the viewer's documented options.
fn default_opts() -> Fields {
    let defaults = json!({
        "textHeight": 0.06,
        "colorbarHeight": 0.05,
        "crosshairWidth": 1,
        "crosshairColor": [1, 0, 0, 1],
        "backColor": [0, 0, 0, 1],
        "isColorbar": false,
        "isOrientCube": false,
        "isRadiologicalConvention": false,
        "isNearestInterpolation": false,
        "isSliceMM": false,
        "dragMode": 1,
        "sliceType": 4,
        "loadingText": "loading ...",
        "multiplanarForceRender": false,
        "meshThicknessOn2D": Value::from(f64::MAX),
    });
    defaults.as_object().cloned().unwrap_or_default()
}

fn default_instance_fields() -> Fields {
    let defaults = json!({
        "overlayOutlineWidth": 0,
        "volScaleMultiplier": 1.0,
    });
    defaults.as_object().cloned().unwrap_or_default()
}
