//! Binding configuration
//!
//! Loaded from TOML. Every section is optional:
//!
//! ```toml
//! log_profile = "production"
//! anti_alias = true
//!
//! [routes]
//! bag_options = ["experimentalShading"]
//! instance_options = ["gamma"]
//! direct_volume_fields = ["colormapNegative"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::errors::{BindingError, Result};
use crate::logging_facility::Profile;
use crate::mutator::{OptionRoute, RoutingTable, VolumeRoute};

/// Extra routes layered on top of the default table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteOverrides {
    pub bag_options: Vec<String>,
    pub instance_options: Vec<String>,
    /// Volume fields written directly instead of through their setter
    pub direct_volume_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingConfig {
    pub log_profile: Profile,
    /// Passed to the viewer when attaching; `None` keeps the viewer default
    pub anti_alias: Option<bool>,
    pub routes: RouteOverrides,
}

impl BindingConfig {
    /// Read and validate a config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BindingError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BindingConfig =
            toml::from_str(content).map_err(|e| BindingError::InvalidConfig {
                message: format!("TOML parse error: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let defaults = RoutingTable::new();

        let bag: HashSet<&str> = self.routes.bag_options.iter().map(String::as_str).collect();
        for key in &self.routes.instance_options {
            if bag.contains(key.as_str()) {
                return Err(invalid(format!(
                    "option {} is routed both to the bag and to the instance",
                    key
                )));
            }
        }

        for key in self
            .routes
            .bag_options
            .iter()
            .chain(&self.routes.instance_options)
        {
            if let Some(OptionRoute::Setter(_)) = defaults.option_route(key) {
                return Err(invalid(format!(
                    "option {} has a dedicated setter and cannot be rerouted",
                    key
                )));
            }
        }

        for field in &self.routes.direct_volume_fields {
            if defaults.volume_route(field) == VolumeRoute::CrossLink
                || *field == defaults.cross_link().strength
            {
                return Err(invalid(format!(
                    "volume field {} links volumes and cannot be written directly",
                    field
                )));
            }
        }

        Ok(())
    }

    /// The default routing table with this config's overrides applied
    pub fn routing_table(&self) -> RoutingTable {
        let mut routes = RoutingTable::new();
        for key in &self.routes.bag_options {
            routes = routes.with_bag_option(key.clone());
        }
        for key in &self.routes.instance_options {
            routes = routes.with_instance_option(key.clone());
        }
        for field in &self.routes.direct_volume_fields {
            routes = routes.with_direct_volume_field(field.clone());
        }
        routes
    }
}

fn invalid(message: String) -> BindingError {
    BindingError::InvalidConfig { message }
}
