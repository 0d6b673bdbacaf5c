//! Mutation application.
//!
//! The [`Mutator`] owns the viewer and turns computed diffs into viewer
//! calls. It never diffs anything itself; callers hand it the output of the
//! diff engine.

pub mod routes;

use serde_json::Value;
use std::time::Instant;

use crate::diff::{FieldChange, FieldDiff, ItemChange};
use crate::errors::{BindingError, Result};
use crate::model::{Fields, Item};
use crate::viewer::Viewer;
use crate::{log_op_end, log_op_error, log_op_start, log_op_warn};

pub use routes::{
    CrossLinkFields, OptionRoute, OptionSetter, RoutingTable, VolumeRoute, VolumeSetter,
};

/// Single owner of the viewer instance.
pub struct Mutator<V> {
    viewer: V,
    routes: RoutingTable,
}

impl<V: Viewer> Mutator<V> {
    /// Wrap `viewer` with the default routing table.
    pub fn new(viewer: V) -> Self {
        Self::with_routes(viewer, RoutingTable::new())
    }

    pub fn with_routes(viewer: V, routes: RoutingTable) -> Self {
        Self { viewer, routes }
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    pub fn into_inner(self) -> V {
        self.viewer
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    /// Whether the rendering context exists. Never fails.
    pub fn gl_is_ready(&self) -> bool {
        matches!(self.viewer.gl(), Ok(true))
    }

    /// Apply a diff of global options.
    ///
    /// Setter keys redraw by themselves. Bag and instance assignments are
    /// followed by exactly one `update_gl_volume`, however many there were.
    /// Unknown keys are logged and skipped.
    pub fn apply_options(&mut self, changes: &FieldDiff) {
        let mut needs_redraw = false;

        for (key, change) in changes {
            match self.routes.option_route(key) {
                Some(OptionRoute::Setter(setter)) => self.call_option_setter(setter, key, change),
                Some(OptionRoute::Bag) => {
                    assign(self.viewer.opts_mut(), key, change);
                    needs_redraw = true;
                }
                Some(OptionRoute::Instance) => {
                    assign(self.viewer.instance_fields_mut(), key, change);
                    needs_redraw = true;
                }
                None => {
                    log_op_warn!(
                        "apply_options",
                        option_key = key.as_str(),
                        "Don't know how to handle {}={}",
                        key,
                        display_change(change)
                    );
                }
            }
        }

        if needs_redraw {
            self.viewer.update_gl_volume();
        }
    }

    fn call_option_setter(&mut self, setter: OptionSetter, key: &str, change: &FieldChange) {
        let Some(value) = change.value() else {
            log_op_warn!(
                "apply_options",
                option_key = key,
                "Cannot unset {} through its setter, skipping",
                key
            );
            return;
        };

        match setter {
            OptionSetter::CrosshairWidth => match value.as_f64() {
                Some(width) => self.viewer.set_crosshair_width(width),
                None => warn_unconvertible("apply_options", key, value),
            },
            OptionSetter::CrosshairColor => match as_f64_vec(value) {
                Some(rgba) => self.viewer.set_crosshair_color(rgba),
                None => warn_unconvertible("apply_options", key, value),
            },
            OptionSetter::VolScaleMultiplier => match value.as_f64() {
                Some(scale) => self.viewer.set_vol_scale_multiplier(scale),
                None => warn_unconvertible("apply_options", key, value),
            },
        }
    }

    /// Bulk-load `items`, replacing everything currently loaded.
    ///
    /// Cross-link fields are stripped before the load and applied once every
    /// item is loaded. A link to a URL that did not load is logged and
    /// skipped.
    pub async fn load_volumes(&mut self, items: &[Item]) -> Result<()> {
        let start = Instant::now();
        log_op_start!("load_volumes", count = items.len());

        let stripped = self.routes.load_stripped_fields();
        let sanitized: Vec<Item> = items.iter().map(|v| v.without_fields(&stripped)).collect();

        if let Err(e) = self.viewer.load_volumes(&sanitized).await {
            let err = BindingError::LoadFailed {
                message: e.to_string(),
            };
            log_op_error!(
                "load_volumes",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            return Err(err);
        }

        let link = self.routes.cross_link().clone();
        for item in items {
            let Some(reference) = item.get(&link.reference) else {
                continue;
            };
            if reference.is_null() {
                continue;
            }
            let strength = strength_of(item.get(&link.strength));
            self.link(&item.url, reference, strength, "load_volumes");
        }

        log_op_end!(
            "load_volumes",
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(())
    }

    /// Patch one loaded volume in place.
    ///
    /// Fails with [`BindingError::VolumeNotFound`] if no volume with the
    /// change's URL is loaded. Direct field writes are followed by one
    /// `update_gl_volume`.
    pub fn apply_volume_changes(&mut self, change: &ItemChange) -> Result<()> {
        let start = Instant::now();

        let Some(handle) = self.viewer.volume_by_url(&change.url) else {
            let err = BindingError::VolumeNotFound {
                url: change.url.clone(),
            };
            log_op_error!(
                "apply_volume_changes",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                url = change.url.as_str()
            );
            return Err(err);
        };

        let link = self.routes.cross_link().clone();
        let link_in_diff = change.changes.contains_key(&link.reference);
        let mut needs_redraw = false;

        for (field, field_change) in &change.changes {
            if link_in_diff && *field == link.strength {
                continue;
            }
            match self.routes.volume_route(field) {
                VolumeRoute::Setter(setter) => {
                    self.call_volume_setter(setter, &handle.id, field, field_change)
                }
                VolumeRoute::CrossLink => {
                    let strength =
                        strength_of(change.get(&link.strength).and_then(FieldChange::value));
                    match field_change.value() {
                        Some(reference) => {
                            self.link(&change.url, reference, strength, "apply_volume_changes")
                        }
                        None => self.viewer.set_modulation_image(&handle.id, None, strength),
                    }
                }
                VolumeRoute::Direct => {
                    if let Some(fields) = self.viewer.volume_fields_mut(&handle.id) {
                        assign(fields, field, field_change);
                        needs_redraw = true;
                    }
                }
            }
        }

        if needs_redraw {
            self.viewer.update_gl_volume();
        }
        Ok(())
    }

    fn call_volume_setter(
        &mut self,
        setter: VolumeSetter,
        id: &str,
        field: &str,
        change: &FieldChange,
    ) {
        let Some(value) = change.value() else {
            log_op_warn!(
                "apply_volume_changes",
                field_name = field,
                "Cannot unset {} through its setter, skipping",
                field
            );
            return;
        };

        match setter {
            VolumeSetter::Opacity => {
                let Some(opacity) = value.as_f64() else {
                    warn_unconvertible("apply_volume_changes", field, value);
                    return;
                };
                let Some(index) = self.viewer.volume_index_by_id(id) else {
                    log_op_warn!(
                        "apply_volume_changes",
                        field_name = field,
                        "No draw position for volume {}, skipping {}",
                        id,
                        field
                    );
                    return;
                };
                self.viewer.set_opacity(index, opacity);
            }
            VolumeSetter::Colormap => match value.as_str() {
                Some(name) => self.viewer.set_colormap(id, name),
                None => warn_unconvertible("apply_volume_changes", field, value),
            },
            VolumeSetter::ColormapNegative => match value.as_str() {
                Some(name) => self.viewer.set_colormap_negative(id, name),
                None => warn_unconvertible("apply_volume_changes", field, value),
            },
        }
    }

    /// Link the volume at `target_url` to the volume named by `reference`.
    ///
    /// A null reference clears the link.
    fn link(&mut self, target_url: &str, reference: &Value, strength: f64, op: &str) {
        let Some(target) = self.viewer.volume_by_url(target_url) else {
            log_op_warn!(
                op,
                url = target_url,
                "{} target not loaded: {}",
                self.routes.cross_link().reference,
                target_url
            );
            return;
        };
        if reference.is_null() {
            self.viewer.set_modulation_image(&target.id, None, strength);
            return;
        }
        let source = reference
            .as_str()
            .and_then(|url| self.viewer.volume_by_url(url));
        match source {
            Some(source) => {
                self.viewer
                    .set_modulation_image(&target.id, Some(&source.id), strength);
            }
            None => {
                let url = reference
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| reference.to_string());
                log_op_warn!(
                    op,
                    url = url.as_str(),
                    "{} not found in volumes: {}",
                    self.routes.cross_link().reference,
                    url
                );
            }
        }
    }

    /// Remove the loaded volume with this URL. Absent volumes are ignored.
    pub fn remove_by_url(&mut self, url: &str) {
        if self.viewer.volume_by_url(url).is_some() {
            self.viewer.remove_volume_by_url(url);
        }
    }
}

/// Write one change into a field map. Nested changes patch sub-items in place.
fn assign(target: &mut Fields, key: &str, change: &FieldChange) {
    match change {
        FieldChange::Set(value) => {
            target.insert(key.to_string(), value.clone());
        }
        FieldChange::Unset => {
            target.remove(key);
        }
        FieldChange::Nested(subs) => {
            let entry = target
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Fields::new()));
            let Some(map) = entry.as_object_mut() else {
                return;
            };
            for (sub_key, sub_diff) in subs {
                let sub = map
                    .entry(sub_key.clone())
                    .or_insert_with(|| Value::Object(Fields::new()));
                if let Some(sub) = sub.as_object_mut() {
                    for (field, field_change) in sub_diff {
                        assign(sub, field, field_change);
                    }
                }
            }
        }
    }
}

fn strength_of(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}

fn as_f64_vec(value: &Value) -> Option<Vec<f64>> {
    value.as_array()?.iter().map(Value::as_f64).collect()
}

fn display_change(change: &FieldChange) -> String {
    match change {
        FieldChange::Set(v) => v.to_string(),
        FieldChange::Unset => "undefined".to_string(),
        FieldChange::Nested(subs) => serde_json::to_string(subs).unwrap_or_default(),
    }
}

fn warn_unconvertible(op: &str, key: &str, value: &Value) {
    log_op_warn!(
        op,
        field_name = key,
        "Cannot convert {}={} for its setter, skipping",
        key,
        value
    );
}
