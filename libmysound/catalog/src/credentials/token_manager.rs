use std::sync::{PoisonError, RwLock};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use derivative::Derivative;
use eyre::Result;
use serde_json::Value;
use tap::TapFallible;
use tracing::{info, warn};

use super::{CredentialStore, TokenStore};

/// Holds the active bearer token in memory and mirrors it to a [`TokenStore`] when the user asked
/// to be remembered.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct TokenManager {
    #[derivative(Debug = "ignore")]
    token: RwLock<Option<String>>,
    #[derivative(Debug = "ignore")]
    store: Box<dyn TokenStore>,
}

impl TokenManager {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        let token = store.load();
        if token.is_some() {
            info!("Restored remembered session token");
        }
        Self {
            token: RwLock::new(token),
            store,
        }
    }

    pub fn save_token(&self, token: &str, remember_me: bool) -> Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        if remember_me {
            self.store.save(token)
        } else {
            // A previous "remember me" login must not outlive this one
            self.store.remove()
        }
    }

    pub fn clear_token(&self) -> Result<()> {
        self.token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.store.remove()
    }

    /// The user id claim from the current token, if there is a token and it carries one.
    pub fn user_id(&self) -> Option<i64> {
        self.get_token().as_deref().and_then(user_id_from_jwt)
    }
}

impl CredentialStore for TokenManager {
    fn get_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub(crate) fn user_id_from_jwt(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .tap_err(|e| warn!("Token payload is not valid base64: {e:?}"))
        .ok()?;
    let claims: Value = serde_json::from_slice(&decoded)
        .tap_err(|e| warn!("Token payload is not valid json: {e:?}"))
        .ok()?;

    claim_as_id(claims.get("userId")).or_else(|| claim_as_id(claims.get("sub")))
}

fn claim_as_id(claim: Option<&Value>) -> Option<i64> {
    match claim? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
