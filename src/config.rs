use std::{any::type_name, fmt::Debug, fs, path::Path, sync::OnceLock};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{CfxError, Result};

/// Marker for types usable as a configuration target of [`validate_configs`].
///
/// Configuration types are plain serde-deserializable records; implementing
/// this trait opts a type into coercion from raw JSON mappings.
pub trait ConfigCls: DeserializeOwned + Debug {}

/// A configuration source: either a raw JSON mapping or an already-typed
/// instance.
#[derive(Debug)]
pub enum Configs<C> {
    /// Untyped entries, e.g. straight out of [`load_json`].
    Map(Value),
    /// An existing configuration instance, passed through unchanged.
    Instance(C),
}

impl<C> From<Value> for Configs<C> {
    fn from(v: Value) -> Self {
        Configs::Map(v)
    }
}

/// Returns a valid configuration instance of type `C`.
///
/// A `Map` source must be a JSON object whose entries deserialize into `C`;
/// anything else fails with an error naming the expected type. An `Instance`
/// source is returned as-is.
///
/// # Arguments
/// * `configs` - The configuration source to coerce.
///
/// # Returns
/// The validated configuration, or an error describing why the coercion
/// failed.
pub fn validate_configs<C, S>(configs: S) -> Result<C>
where
    C: ConfigCls,
    S: Into<Configs<C>>,
{
    match configs.into() {
        Configs::Instance(c) => Ok(c),
        Configs::Map(v) => {
            if !v.is_object() {
                return Err(CfxError::InvalidConfig {
                    expected: type_name::<C>(),
                    reason: format!("expected a JSON object, got {v}"),
                });
            }

            serde_json::from_value(v).map_err(|e| CfxError::InvalidConfig {
                expected: type_name::<C>(),
                reason: e.to_string(),
            })
        }
    }
}

/// Loads a JSON file into an untyped [`Value`].
///
/// # Errors
/// Fails if the file cannot be read or its content is not valid JSON.
pub fn load_json(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| CfxError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(serde_json::from_str(&content)?)
}

/// Process-wide defaults for explanation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// How many RNG keys to reserve per split.
    pub rng_reserve_size: usize,
    /// Seed for all stochastic components.
    pub global_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rng_reserve_size: 1,
            global_seed: 42,
        }
    }
}

impl ConfigCls for Config {}

static MAIN_CONFIG: OnceLock<Config> = OnceLock::new();

/// Returns the process-wide [`Config`].
///
/// The instance is created with [`Config::default`] on first access and the
/// same reference is returned on every call. There is no setter; code that
/// needs different values should construct and pass a `Config` explicitly.
pub fn get_config() -> &'static Config {
    MAIN_CONFIG.get_or_init(Config::default)
}
