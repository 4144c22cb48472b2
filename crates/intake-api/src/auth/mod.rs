//! Caller identity
//!
//! The gateway runs behind an authenticating proxy; it only reads the identity the proxy
//! forwards.

pub mod models;

pub use models::{Uploader, UPLOADER_HEADER};
