use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Chrome user-data directory for one run
pub struct ProfileManager {
    path: PathBuf,
    is_temporary: bool,
}

impl ProfileManager {
    /// Fresh profile, deleted on drop, so every run starts without cookies
    pub fn temporary() -> Result<Self> {
        let path = tempfile::Builder::new()
            .prefix("offercheck-profile-")
            .tempdir()?
            .keep();

        Ok(Self {
            path,
            is_temporary: true,
        })
    }

    /// Named profile under `~/.offercheck/profiles`, kept between runs
    pub fn named(name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::Browser(format!("Invalid profile name: '{}'", name)));
        }

        let path = Self::profiles_dir()?.join(name);
        Self::persistent(path)
    }

    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }

        Ok(Self {
            path,
            is_temporary: false,
        })
    }

    pub fn profiles_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".offercheck").join("profiles"))
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }
}

impl Drop for ProfileManager {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                tracing::warn!("Failed to remove profile {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_profile_removed_on_drop() {
        let profile = ProfileManager::temporary().unwrap();
        let path = profile.path().to_path_buf();

        assert!(path.exists());
        assert!(profile.is_temporary());

        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn test_persistent_profile_survives_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("nested").join("profile");

        let profile = ProfileManager::persistent(path.clone()).unwrap();
        assert!(path.exists());
        assert!(!profile.is_temporary());

        drop(profile);
        assert!(path.exists());
    }

    #[test]
    fn test_named_profile_rejects_path_segments() {
        assert!(ProfileManager::named("").is_err());
        assert!(ProfileManager::named("../escape").is_err());
        assert!(ProfileManager::named("..").is_err());
    }
}
