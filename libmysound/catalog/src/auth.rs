use std::sync::Arc;

use async_trait::async_trait;
use derivative::Derivative;
use http::Extensions;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Request, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use tap::TapFallible;
use tracing::warn;

use crate::catalog_error::CatalogError;
use crate::credentials::CredentialStore;
use crate::settings::CatalogSettings;

/// Attaches `Authorization: Bearer <token>` to every outgoing request while a token is present.
/// Requests go out unauthenticated otherwise.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct AuthMiddleware {
    #[derivative(Debug = "ignore")]
    credentials: Arc<dyn CredentialStore>,
}

impl AuthMiddleware {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if let Some(value) = bearer_value(self.credentials.as_ref()) {
            req.headers_mut().insert(AUTHORIZATION, value);
        }
        next.run(req, extensions).await
    }
}

/// Headers for data sources that don't go through the middleware stack, like the engine's stream
/// loader.
pub fn auth_headers(credentials: &dyn CredentialStore) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(value) = bearer_value(credentials) {
        headers.insert(AUTHORIZATION, value);
    }
    headers
}

fn bearer_value(credentials: &dyn CredentialStore) -> Option<HeaderValue> {
    let token = credentials.get_token()?;
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .tap_err(|e| warn!("Token is not a valid header value: {e:?}"))
        .ok()?;
    value.set_sensitive(true);
    Some(value)
}

pub fn build_client(
    settings: &CatalogSettings,
    credentials: Arc<dyn CredentialStore>,
) -> Result<ClientWithMiddleware, CatalogError> {
    let client = Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|e| CatalogError::ClientBuild(e.to_string()))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);
    Ok(ClientBuilder::new(client)
        .with(AuthMiddleware::new(credentials))
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
