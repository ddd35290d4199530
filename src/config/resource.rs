//! Deployment identity labels.

use super::parse::env_opt;
use super::ConfigError;
use crate::entry::{MonitoredResource, GAE_APP_RESOURCE};

/// Accepted variable names per label, in lookup order.
const MODULE_KEYS: &[&str] = &["MODULE_ID", "GAE_SERVICE"];
const PROJECT_KEYS: &[&str] = &["PROJECT_ID", "GOOGLE_CLOUD_PROJECT"];
const VERSION_KEYS: &[&str] = &["VERSION_ID", "GAE_VERSION"];
const ZONE_KEYS: &[&str] = &["ZONE"];

/// Labels identifying the deployment that produces the logs.
///
/// All four are required. They tag both log streams with a `gae_app`
/// monitored resource, and `module_id` also names the streams.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceConfig {
    pub module_id: String,
    pub project_id: String,
    pub version_id: String,
    pub zone: String,
}

impl ResourceConfig {
    pub fn new(
        module_id: impl Into<String>,
        project_id: impl Into<String>,
        version_id: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            module_id: module_id.into(),
            project_id: project_id.into(),
            version_id: version_id.into(),
            zone: zone.into(),
        }
    }

    /// Load from environment variables.
    ///
    /// `MODULE_ID`, `PROJECT_ID` and `VERSION_ID` fall back to the App Engine
    /// runtime variables `GAE_SERVICE`, `GOOGLE_CLOUD_PROJECT` and `GAE_VERSION`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_opt)
    }

    /// Load using a custom variable lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(*key).filter(|v| !v.is_empty()))
                .ok_or_else(|| ConfigError::Missing {
                    key: keys.join(" or "),
                })
        };

        Ok(Self {
            module_id: required(MODULE_KEYS)?,
            project_id: required(PROJECT_KEYS)?,
            version_id: required(VERSION_KEYS)?,
            zone: required(ZONE_KEYS)?,
        })
    }

    /// Monitored resource shared by both log streams.
    pub fn monitored_resource(&self) -> MonitoredResource {
        MonitoredResource::new(GAE_APP_RESOURCE)
            .with_label("module_id", self.module_id.as_str())
            .with_label("project_id", self.project_id.as_str())
            .with_label("version_id", self.version_id.as_str())
            .with_label("zone", self.zone.as_str())
    }

    /// Name of the access-log stream.
    pub fn request_log_name(&self) -> String {
        format!("{}_request", self.module_id)
    }

    /// Name of the application-log stream.
    pub fn application_log_name(&self) -> String {
        format!("{}_application", self.module_id)
    }
}
