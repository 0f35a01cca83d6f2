use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::StoredAnalysis;

const ANALYSIS_FILE: &str = "analysis";

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let data: T = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(data))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("Failed to create {}", self.cache_dir.display()))?;
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(self.cache_path(name), contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.cache_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache file: {}", name))?;
        }
        Ok(())
    }

    // ===== Analysis input =====

    /// The stored analysis input, or `None` when absent or unreadable
    pub fn load_analysis(&self) -> Option<StoredAnalysis> {
        match self.load(ANALYSIS_FILE) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable analysis input");
                None
            }
        }
    }

    pub fn save_analysis(&self, analysis: &StoredAnalysis) -> Result<()> {
        self.save(ANALYSIS_FILE, analysis)?;
        debug!(brand = %analysis.brand, keywords = analysis.keywords.len(), "Analysis input saved");
        Ok(())
    }

    pub fn clear_analysis(&self) -> Result<()> {
        self.remove(ANALYSIS_FILE)
    }
}
