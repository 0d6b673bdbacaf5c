//! Field-name routing for the mutator.
//!
//! Every option key and volume field resolves to one handler variant. The
//! table is plain data so new keys can be routed from configuration without
//! touching the mutation path.

use std::collections::HashMap;

/// Dedicated viewer setters for global options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSetter {
    CrosshairWidth,
    CrosshairColor,
    VolScaleMultiplier,
}

/// How an option key reaches the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionRoute {
    /// Call a dedicated setter; the setter redraws by itself
    Setter(OptionSetter),
    /// Assign into the generic options bag
    Bag,
    /// Assign a top-level instance field
    Instance,
}

/// Dedicated viewer setters for volume fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSetter {
    /// Addressed by volume index
    Opacity,
    /// Addressed by volume id
    Colormap,
    /// Addressed by volume id
    ColormapNegative,
}

/// How a volume field reaches the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeRoute {
    Setter(VolumeSetter),
    /// Write the loaded volume's field and redraw
    Direct,
    /// Link to another loaded volume by URL
    CrossLink,
}

/// Field names of the cross-item link.
///
/// Both are stripped before a bulk load; the link is applied once every
/// volume is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossLinkFields {
    /// Holds the URL of the volume that drives this one (or null)
    pub reference: String,
    /// Auxiliary strength passed along with the link, 0 when absent
    pub strength: String,
}

/// Options the viewer keeps in its generic options bag.
pub const BAG_OPTIONS: &[&str] = &[
    "textHeight",
    "colorbarHeight",
    "colorbarMargin",
    "rulerWidth",
    "backColor",
    "fontColor",
    "selectionBoxColor",
    "clipPlaneColor",
    "rulerColor",
    "show3Dcrosshair",
    "trustCalMinMax",
    "clipPlaneHotKey",
    "viewModeHotKey",
    "keyDebounceTime",
    "doubleTouchTimeout",
    "longTouchTimeout",
    "isRadiologicalConvention",
    "logLevel",
    "loadingText",
    "dragAndDropEnabled",
    "isNearestInterpolation",
    "isAtlasOutline",
    "isRuler",
    "isColorbar",
    "isOrientCube",
    "multiplanarPadPixels",
    "multiplanarForceRender",
    "multiplanarShowRender",
    "multiplanarLayout",
    "meshThicknessOn2D",
    "dragMode",
    "isDepthPickMesh",
    "isCornerOrientationText",
    "sagittalNoseLeft",
    "isSliceMM",
    "isHighResolutionCapable",
    "forceDevicePixelRatio",
    "drawingEnabled",
    "penValue",
    "floodFillNeighbors",
    "maxDrawUndoBitmaps",
    "thumbnail",
    "sliceMosaicString",
    "centerMosaic",
    "penSize",
    "clickToSegment",
    "clickToSegmentRadius",
    "clickToSegmentBright",
    "clickToSegmentAutoIntensity",
    "clickToSegmentIntensityMax",
    "clickToSegmentIntensityMin",
    "clickToSegmentPercent",
    "clickToSegmentMaxDistanceMM",
    "clickToSegmentIs2D",
    "selectionBoxLineThickness",
    "selectionBoxIsOutline",
    "scrollRequiresFocus",
    "showMeasureUnits",
    "measureTextJustify",
    "measureTextColor",
    "measureLineColor",
    "measureTextHeight",
    "sliceType",
];

/// Options stored directly on the viewer instance.
pub const INSTANCE_OPTIONS: &[&str] = &["overlayOutlineWidth"];

/// Lookup table from field name to handler.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    options: HashMap<String, OptionRoute>,
    volume_fields: HashMap<String, VolumeRoute>,
    cross_link: CrossLinkFields,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingTable {
    /// Routes for the stock viewer.
    pub fn new() -> Self {
        let mut options: HashMap<String, OptionRoute> = BAG_OPTIONS
            .iter()
            .map(|k| (k.to_string(), OptionRoute::Bag))
            .collect();
        for key in INSTANCE_OPTIONS {
            options.insert(key.to_string(), OptionRoute::Instance);
        }
        // Writing these into the bag leaves the viewer's derived state stale.
        options.insert(
            "crosshairWidth".into(),
            OptionRoute::Setter(OptionSetter::CrosshairWidth),
        );
        options.insert(
            "crosshairColor".into(),
            OptionRoute::Setter(OptionSetter::CrosshairColor),
        );
        options.insert(
            "volScaleMultiplier".into(),
            OptionRoute::Setter(OptionSetter::VolScaleMultiplier),
        );

        let cross_link = CrossLinkFields {
            reference: "modulationImageUrl".into(),
            strength: "modulateAlpha".into(),
        };

        let mut volume_fields = HashMap::new();
        volume_fields.insert("opacity".into(), VolumeRoute::Setter(VolumeSetter::Opacity));
        volume_fields.insert("colormap".into(), VolumeRoute::Setter(VolumeSetter::Colormap));
        volume_fields.insert(
            "colormapNegative".into(),
            VolumeRoute::Setter(VolumeSetter::ColormapNegative),
        );
        volume_fields.insert(cross_link.reference.clone(), VolumeRoute::CrossLink);

        Self {
            options,
            volume_fields,
            cross_link,
        }
    }

    /// Route `key` into the options bag.
    pub fn with_bag_option(mut self, key: impl Into<String>) -> Self {
        self.options.insert(key.into(), OptionRoute::Bag);
        self
    }

    /// Route `key` to a top-level instance field.
    pub fn with_instance_option(mut self, key: impl Into<String>) -> Self {
        self.options.insert(key.into(), OptionRoute::Instance);
        self
    }

    /// Write `field` directly on the volume, replacing any dedicated handler.
    pub fn with_direct_volume_field(mut self, field: impl Into<String>) -> Self {
        self.volume_fields.insert(field.into(), VolumeRoute::Direct);
        self
    }

    /// `None` for keys the viewer does not know.
    pub fn option_route(&self, key: &str) -> Option<OptionRoute> {
        self.options.get(key).copied()
    }

    /// Fields without a dedicated handler are written directly.
    pub fn volume_route(&self, field: &str) -> VolumeRoute {
        self.volume_fields
            .get(field)
            .copied()
            .unwrap_or(VolumeRoute::Direct)
    }

    pub fn cross_link(&self) -> &CrossLinkFields {
        &self.cross_link
    }

    /// Fields removed from items before they are bulk-loaded.
    pub fn load_stripped_fields(&self) -> [&str; 2] {
        [
            self.cross_link.reference.as_str(),
            self.cross_link.strength.as_str(),
        ]
    }
}
