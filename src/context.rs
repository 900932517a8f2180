// File: ./src/context.rs
/*! Filesystem context for the converter.

`AppContext` decides where configuration, cached discovery results and
generated calendars live. `StandardContext` uses `directories::ProjectDirs`
unless a root is forced from the command line; `TestContext` owns a
temporary directory removed on drop.

Nothing here reads environment variables. Code doing file IO receives a
`&dyn AppContext` explicitly.
*/

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;
    fn get_config_dir(&self) -> Result<PathBuf>;
    fn get_cache_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    fn get_discovery_cache_path(&self) -> Option<PathBuf> {
        self.get_cache_dir().ok().map(|p| p.join("discovery.json"))
    }
}

// --- Production Implementation ---

#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    /// With `Some(root)`, everything goes to `root/{data,config,cache}`.
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
        if !path.exists() {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(path)
    }

    fn get_proj_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "plancal", "plancal")
            .ok_or_else(|| anyhow::anyhow!("No home directory"))
    }

    fn resolve(&self, sub: &str, pick: fn(&ProjectDirs) -> PathBuf) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return Self::ensure_exists(root.join(sub));
        }
        let proj = Self::get_proj_dirs()?;
        Self::ensure_exists(pick(&proj))
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        self.resolve("data", |p| p.data_dir().to_path_buf())
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        self.resolve("config", |p| p.config_dir().to_path_buf())
    }

    fn get_cache_dir(&self) -> Result<PathBuf> {
        self.resolve("cache", |p| p.cache_dir().to_path_buf())
    }
}

// --- Test Implementation ---

#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    /// Creates a unique temporary directory, removed when dropped.
    pub fn new() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let root = std::env::temp_dir().join(format!("plancal_test_{}", uuid));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }

    fn sub(&self, name: &str) -> Result<PathBuf> {
        let p = self.root.join(name);
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        self.sub("data")
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        self.sub("config")
    }

    fn get_cache_dir(&self) -> Result<PathBuf> {
        self.sub("cache")
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
