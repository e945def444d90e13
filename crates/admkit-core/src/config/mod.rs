//! Configuration persistence
//!
//! A flat mapping of string keys to [`ConfigValue`]s stored as YAML. The file
//! on disk is the source of truth between calls: there is no in-memory cache.

mod store;
mod value;

pub use store::{
    default_configuration, ConfigMap, ConfigStore, DEFAULT_COMPONENT, DEFAULT_LOG_FILE,
};
pub use value::ConfigValue;
