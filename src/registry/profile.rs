use log::{debug, error, info};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use super::dtsu666;
use crate::utils::error::BridgeError;

/// Where a parameter lives on the device and how its raw value is turned
/// into the published one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub address: u16,
    pub multiplier: f64,
    pub decimals: u32,
}

impl ParameterSpec {
    pub const fn new(address: u16, multiplier: f64, decimals: u32) -> Self {
        Self {
            address,
            multiplier,
            decimals,
        }
    }

    /// Scale a raw register value and round it to this parameter's precision.
    pub fn transform(&self, raw: f64) -> f64 {
        round_to(raw * self.multiplier, self.decimals)
    }
}

/// Round the exact binary value to `decimals` digits, ties to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// An ordered, name-unique set of parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    name: String,
    parameters: Vec<(String, ParameterSpec)>,
}

impl Profile {
    pub fn new<N, I, S>(name: N, parameters: I) -> Result<Self, BridgeError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (S, ParameterSpec)>,
        S: Into<String>,
    {
        let name = name.into();
        let parameters: Vec<(String, ParameterSpec)> = parameters
            .into_iter()
            .map(|(param, spec)| (param.into(), spec))
            .collect();

        if parameters.is_empty() {
            return Err(BridgeError::ConfigError(format!("Profile '{}' has no parameters", name)));
        }

        let mut seen = HashSet::new();
        for (param, spec) in &parameters {
            if param.is_empty() {
                return Err(BridgeError::ConfigError(format!("Profile '{}' has an unnamed parameter", name)));
            }
            if !seen.insert(param.as_str()) {
                return Err(BridgeError::ConfigError(format!(
                    "Profile '{}' defines parameter '{}' more than once",
                    name, param
                )));
            }
            if !spec.multiplier.is_finite() {
                return Err(BridgeError::ConfigError(format!(
                    "Profile '{}' parameter '{}' has invalid multiplier {}",
                    name, param, spec.multiplier
                )));
            }
        }

        Ok(Self { name, parameters })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn get(&self, parameter: &str) -> Option<&ParameterSpec> {
        self.parameters
            .iter()
            .find_map(|(name, spec)| (name == parameter).then_some(spec))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterSpec)> {
        self.parameters.iter().map(|(name, spec)| (name.as_str(), spec))
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} parameters)", self.name, self.parameters.len())
    }
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default, rename = "profile")]
    profiles: Vec<ProfileEntry>,
}

#[derive(Debug, Deserialize)]
struct ProfileEntry {
    name: String,
    #[serde(default, rename = "parameter")]
    parameters: Vec<ParameterEntry>,
}

#[derive(Debug, Deserialize)]
struct ParameterEntry {
    name: String,
    address: u16,
    #[serde(default = "default_multiplier")]
    multiplier: f64,
    #[serde(default)]
    decimals: u32,
}

fn default_multiplier() -> f64 {
    1.0
}

/// Named profiles known to this process. Built once at startup.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileRegistry {
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        for profile in dtsu666::profiles() {
            profiles.insert(profile.name().to_string(), profile);
        }
        Self { profiles }
    }

    /// Parse profiles from TOML text and layer them over the current set.
    pub fn merge_toml(mut self, content: &str) -> Result<Self, BridgeError> {
        let file: ProfileFile = toml::from_str(content)?;

        for entry in file.profiles {
            let profile = Profile::new(
                entry.name,
                entry.parameters.into_iter().map(|p| {
                    (p.name, ParameterSpec::new(p.address, p.multiplier, p.decimals))
                }),
            )?;

            if self.profiles.contains_key(profile.name()) {
                info!("📋 Profile '{}' from file replaces the built-in one", profile.name());
            } else {
                debug!("📋 Loaded profile {}", profile);
            }
            self.profiles.insert(profile.name().to_string(), profile);
        }

        Ok(self)
    }

    pub fn merge_file<P: AsRef<Path>>(self, path: P) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::ConfigError(format!("Cannot read profile file {}: {}", path.display(), e))
        })?;
        self.merge_toml(&content)
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Resolve the profile selector given at startup.
    pub fn select(&self, selector: Option<&str>) -> Result<Profile, BridgeError> {
        let Some(name) = selector.map(str::trim).filter(|s| !s.is_empty()) else {
            error!("❌ No profile selected");
            return Err(BridgeError::UnknownProfile("<unset>".to_string()));
        };

        match self.profiles.get(name) {
            Some(profile) => {
                info!("✔️  Using profile: {}", profile);
                Ok(profile.clone())
            }
            None => {
                error!(
                    "❌ Profile '{}' not found, available: {}",
                    name,
                    self.names().collect::<Vec<_>>().join(", ")
                );
                Err(BridgeError::UnknownProfile(name.to_string()))
            }
        }
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
