use std::fs::{self, File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tap::TapFallible;
use tracing::warn;

use super::TokenStore;
use super::credential_error::CredentialError;

static TOKEN_FILE: &str = "session_token";

/// Persists the "remember me" token as a single line under the platform config directory.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    token_path: PathBuf,
}

impl FileTokenStore {
    pub fn try_new() -> Result<Box<dyn TokenStore>, CredentialError> {
        let proj_dirs = directories::ProjectDirs::from("", "", "mysound")
            .ok_or(CredentialError::NoConfigDir)?;
        FileTokenStore::new_from_path(proj_dirs.config_dir().join(TOKEN_FILE))
    }

    pub fn new_from_path<P: AsRef<Path>>(
        token_path: P,
    ) -> Result<Box<dyn TokenStore>, CredentialError> {
        let token_path = token_path.as_ref();
        let path_string = token_path.to_string_lossy().to_string();
        if token_path.to_str().is_none() {
            return Err(CredentialError::InvalidUnicode(path_string));
        }

        if token_path.is_dir() {
            return Err(CredentialError::NotAFile(path_string));
        }

        if let Some(parent) = token_path.parent()
            && !parent.exists()
        {
            create_dir_all(parent)
                .map_err(|e| CredentialError::FileCreationFailed(path_string, e))?;
        }

        Ok(Box::new(Self {
            token_path: token_path.to_owned(),
        }))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.token_path).ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_owned())
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut file =
            File::create(&self.token_path).wrap_err("Error opening token file for writing")?;

        write!(file, "{token}").wrap_err(format!(
            "Error writing to token file {:?}",
            self.token_path
        ))
    }

    fn remove(&self) -> Result<()> {
        if !self.token_path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.token_path)
            .tap_err(|e| warn!("Error removing token file {:?}: {e:?}", self.token_path))
            .wrap_err("Error removing token file")
    }
}
