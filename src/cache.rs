//! Page cache for incremental builds.
//!
//! A build fetches everything from the content API and renders every page,
//! but most pages come out byte-identical to the previous run. This module
//! lets the write step skip those pages and remove pages that the current
//! build no longer produces.
//!
//! # Design
//!
//! The manifest maps each generated page's path, relative to the output
//! directory, to the SHA-256 of its HTML. A page is **unchanged** when:
//!
//! 1. the manifest holds the same hash for its path, and
//! 2. the previously written file still exists on disk.
//!
//! Hashes are content-based, so the cache survives copying the output
//! directory around (e.g. restoring `dist/` from a CI cache).
//!
//! The same [`hash_page`] is used by the server's revalidation timer to tell
//! whether a freshly rendered home page differs from the one being served.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<output_dir>/.build-manifest.json`.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `build` to start from an empty manifest. Every page is
//! rewritten.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the manifest file within the output directory.
pub const MANIFEST_FILENAME: &str = ".build-manifest.json";

/// Version of the manifest format. Bump to invalidate existing manifests.
const MANIFEST_VERSION: u32 = 1;

/// On-disk map from generated page path to the hash of its HTML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BuildManifest {
    pub version: u32,
    pub entries: HashMap<String, String>,
}

impl BuildManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(manifest_path(output_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(output_dir), json)
    }

    /// Whether `page_path` was written with this exact `hash` and is still there.
    pub fn is_unchanged(&self, page_path: &str, hash: &str, output_dir: &Path) -> bool {
        self.entries.get(page_path).is_some_and(|h| h == hash)
            && output_dir.join(page_path).exists()
    }

    pub fn insert(&mut self, page_path: String, hash: String) {
        self.entries.insert(page_path, hash);
    }
}

/// SHA-256 of a rendered page, as a hex string.
pub fn hash_page(html: &str) -> String {
    format!("{:x}", Sha256::digest(html.as_bytes()))
}

/// Summary of what a build wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub written: u32,
    pub unchanged: u32,
    pub removed: u32,
}

impl CacheStats {
    pub fn write(&mut self) {
        self.written += 1;
    }

    pub fn skip(&mut self) {
        self.unchanged += 1;
    }

    pub fn remove(&mut self) {
        self.removed += 1;
    }

    pub fn total(&self) -> u32 {
        self.written + self.unchanged
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchanged > 0 {
            write!(
                f,
                "{} unchanged, {} written ({} total)",
                self.unchanged,
                self.written,
                self.total()
            )?;
        } else {
            write!(f, "{} written", self.written)?;
        }
        if self.removed > 0 {
            write!(f, ", {} removed", self.removed)?;
        }
        Ok(())
    }
}

/// Resolve the manifest path for an output directory.
pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}
