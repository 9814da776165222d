use std::path::PathBuf;

use super::env_or;

/// Where object references from upload notifications are resolved
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl StorageConfig {
    /// Environment variables:
    /// - STORAGE_ROOT: directory holding `<bucket>/<key>` objects (default: "./storage")
    pub fn from_env() -> Self {
        Self {
            root: env_or("STORAGE_ROOT", PathBuf::from("./storage")),
        }
    }
}
