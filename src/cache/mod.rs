//! Caching module for entity-metadata lookups
//!
//! Address classification rarely changes, so lookups can be reused across
//! runs. Transactions are never cached; they live only for one pipeline
//! run.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

use crate::models::entity::EntityLookup;

/// Cache for entity-metadata lookups.
pub struct Cache;

impl Cache {
    /// Get the cache directory
    fn cache_dir() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".solana").join("entity_cache")
    }

    /// Get the cache file path for one lookup kind of one address.
    fn cache_path(kind: &str, address: &str) -> PathBuf {
        Self::cache_dir().join(format!("{}-{}.json", kind, address))
    }

    /// Get a cached lookup for an address, if present.
    pub fn get(kind: &str, address: &str) -> Result<Option<EntityLookup>> {
        let path = Self::cache_path(kind, address);

        if !path.exists() {
            debug!("No {} cache for address: {}", kind, address);
            return Ok(None);
        }

        debug!("Found {} cache for address: {}", kind, address);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

        let lookup: EntityLookup = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse cached lookup for address: {}", address))?;

        Ok(Some(lookup))
    }

    /// Save a lookup to the cache.
    pub fn save(kind: &str, address: &str, lookup: &EntityLookup) -> Result<()> {
        let cache_dir = Self::cache_dir();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)
                .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        }

        let path = Self::cache_path(kind, address);
        let json = serde_json::to_string_pretty(lookup)
            .with_context(|| format!("Failed to serialize lookup for address: {}", address))?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

        debug!("Cached {} lookup for address: {}", kind, address);
        Ok(())
    }

    /// Clear cached lookups for one address.
    pub fn clear(address: &str) -> Result<()> {
        for kind in ["search", "account"] {
            let path = Self::cache_path(kind, address);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove cache file: {}", path.display()))?;
                debug!("Cleared {} cache for address: {}", kind, address);
            }
        }
        Ok(())
    }

    /// Clear all cached lookups.
    pub fn clear_all() -> Result<()> {
        let cache_dir = Self::cache_dir();
        if cache_dir.exists() {
            fs::remove_dir_all(&cache_dir)
                .with_context(|| format!("Failed to remove cache directory: {}", cache_dir.display()))?;
            debug!("Cleared all cached entity lookups");
        }
        Ok(())
    }
}
