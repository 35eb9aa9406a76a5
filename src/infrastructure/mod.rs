// Core infrastructure modules
pub mod database;              // SQLite pool and schema
pub mod identity;              // Token validation against the identity provider
pub mod media_storage;         // Uploaded image files
pub mod middleware;            // Viewer context middleware and extractor
pub mod privacy;               // Ownership-or-read-only rules
pub mod viewer;                // Viewer context

pub use database::SocialDatabase;
pub use identity::{Identity, IdentityProvider, SqliteIdentityProvider};
pub use media_storage::MediaStorage;
pub use viewer::viewer::ViewerContext;
