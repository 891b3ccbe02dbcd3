mod credential_error;
mod file_store;
mod memory_store;
mod token_manager;

pub use credential_error::*;
pub use file_store::*;
pub use memory_store::*;
pub use token_manager::*;

use eyre::Result;

/// Read side of the credential store. Everything that talks to the backend only needs this.
pub trait CredentialStore: Send + Sync {
    fn get_token(&self) -> Option<String>;
}

/// Where a remembered token lives between app launches.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<()>;
    fn remove(&self) -> Result<()>;
}
