//! Content and media service for the bilingual FSG marketing site.
//!
//! The site reads one JSON document holding a Japanese and a Vietnamese
//! content tree. The admin panel edits that document field by field and
//! writes it back whole, and uploads slide and partner images.
//!
//! - `content`: document model, dotted-path lookup and pure mutators
//! - `store`: persistence backends and the load/save fallback chain
//! - `media`: upload validation and image storage backends
//! - `admin`: draft editing and upload-then-save workflow
//! - `session`: admin login expiry and password check
//! - `server`: axum routes

pub mod admin;
pub mod config;
pub mod content;
pub mod media;
pub mod server;
pub mod session;
pub mod store;
