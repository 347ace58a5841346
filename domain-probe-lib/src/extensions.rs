//! Registry of known domain extensions.
//!
//! Extensions are loaded from a newline-delimited text file. The loaded set
//! can be swapped by a reload at any time; readers always see either the old
//! or the new set, never a mix of both.

use crate::error::DomainProbeError;
use crate::utils::normalize_extension;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Process-wide set of supported extensions.
///
/// The set lives behind an `Arc` so that lookups only hold the read lock long
/// enough to clone a pointer. Reloads build the replacement completely before
/// taking the write lock.
#[derive(Debug)]
pub struct ExtensionRegistry {
    /// File the set was loaded from; `None` for in-memory registries
    source: Option<PathBuf>,
    extensions: RwLock<Arc<HashSet<String>>>,
}

impl ExtensionRegistry {
    /// Load the registry from a newline-delimited file.
    ///
    /// Blank lines and `#` comments are ignored. Each token is trimmed,
    /// lower-cased and given a leading dot.
    ///
    /// # Errors
    ///
    /// Returns `DomainProbeError::Load` if the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DomainProbeError> {
        let path = path.as_ref();
        let set = read_extension_file(path)?;

        tracing::info!(
            path = %path.display(),
            count = set.len(),
            "loaded domain extensions"
        );

        Ok(Self {
            source: Some(path.to_path_buf()),
            extensions: RwLock::new(Arc::new(set)),
        })
    }

    /// Build a registry from an in-memory list of tokens.
    ///
    /// Such a registry has no backing file; `reload` on it is an error.
    pub fn from_extensions<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = tokens
            .into_iter()
            .filter_map(|t| normalize_extension(t.as_ref()))
            .collect();

        Self {
            source: None,
            extensions: RwLock::new(Arc::new(set)),
        }
    }

    /// Re-read the backing file and swap the set in.
    ///
    /// On failure the current set stays in place and the error is returned.
    /// Returns the number of extensions now loaded.
    pub fn reload(&self) -> Result<usize, DomainProbeError> {
        let path = self.source.as_ref().ok_or_else(|| {
            DomainProbeError::load("<memory>", "registry has no backing file to reload")
        })?;

        let set = match read_extension_file(path) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "extension reload failed, keeping previous set"
                );
                return Err(e);
            }
        };

        let count = set.len();
        self.replace(set);

        tracing::info!(path = %path.display(), count, "reloaded domain extensions");
        Ok(count)
    }

    /// Whether an extension is in the current set.
    ///
    /// The query is normalized first, so `"COM"`, `"com"` and `".com"` are
    /// equivalent.
    pub fn contains(&self, extension: &str) -> bool {
        match normalize_extension(extension) {
            Some(ext) => self.snapshot().contains(&ext),
            None => false,
        }
    }

    /// Snapshot of every known extension. Order is unspecified.
    pub fn list(&self) -> Vec<String> {
        self.snapshot().iter().cloned().collect()
    }

    /// Number of known extensions.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the registry holds no extensions.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Path the registry was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Current set as a shared pointer; stays valid across later reloads.
    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        match self.extensions.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    fn replace(&self, set: HashSet<String>) {
        let set = Arc::new(set);
        match self.extensions.write() {
            Ok(mut guard) => *guard = set,
            Err(poisoned) => *poisoned.into_inner() = set,
        }
    }
}

/// Parse extension tokens from text, one per line.
pub fn parse_extensions(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(normalize_extension)
        .collect()
}

fn read_extension_file(path: &Path) -> Result<HashSet<String>, DomainProbeError> {
    let content = fs::read_to_string(path).map_err(|e| {
        DomainProbeError::load(
            path.to_string_lossy(),
            format!("failed to open extensions file: {}", e),
        )
    })?;

    Ok(parse_extensions(&content))
}
