use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to read identity file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write identity file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("identity file {path} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to encode identity: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// The installation's tripcode, attached to every post it submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    tripcode: String,
}

impl Identity {
    pub fn new(tripcode: impl Into<String>) -> Self {
        Self {
            tripcode: tripcode.into(),
        }
    }

    /// Fresh random tripcode that is not written anywhere.
    pub fn ephemeral() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn tripcode(&self) -> &str {
        &self.tripcode
    }
}

/// File-backed home of the [`Identity`].
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored identity, or `None` when nothing usable has been saved yet.
    pub fn load(&self) -> Result<Option<Identity>, IdentityError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(IdentityError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let identity: Identity = toml::from_str(&raw).map_err(|source| IdentityError::Parse {
            path: self.path.clone(),
            source,
        })?;
        if identity.tripcode.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(identity))
    }

    /// Reuses the saved tripcode; generates and saves one only when none exists.
    ///
    /// A stored tripcode that is empty or only whitespace counts as no value and
    /// is overwritten with a fresh one. Any other stored value is never replaced.
    pub fn load_or_create(&self) -> Result<Identity, IdentityError> {
        if let Some(identity) = self.load()? {
            return Ok(identity);
        }
        let identity = Identity::ephemeral();
        self.save(&identity)?;
        info!("generated new tripcode at {}", self.path.display());
        Ok(identity)
    }

    fn save(&self, identity: &Identity) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| IdentityError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let encoded = toml::to_string(identity)?;
        fs::write(&self.path, encoded).map_err(|source| IdentityError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
