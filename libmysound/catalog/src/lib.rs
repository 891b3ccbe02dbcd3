mod auth;
mod catalog_client;
mod catalog_error;
pub mod credentials;
mod dto;
mod http_catalog;
mod settings;
pub mod urls;

pub use auth::{AuthMiddleware, auth_headers, build_client};
pub use catalog_client::CatalogClient;
pub use catalog_error::CatalogError;
pub use dto::playlist::Playlist;
pub use dto::track_record::{ArtistRecord, GenreRecord, TrackRecord};
pub use http_catalog::HttpCatalogClient;
pub use settings::{BASE_URL_VAR, CatalogSettings};

#[cfg(test)]
#[ctor::ctor]
fn init_tests() {
    tracing_subscriber::fmt()
        .pretty()
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_test_writer()
        .init();
}
