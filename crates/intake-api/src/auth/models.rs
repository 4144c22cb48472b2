use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

/// Header the fronting proxy sets to the authenticated user's email
pub const UPLOADER_HEADER: &str = "x-forwarded-email";

/// Identity recorded as the uploader of a file.
///
/// Taken from the `X-Forwarded-Email` header when present and non-blank, otherwise the
/// configured default uploader. Authentication itself happens in front of this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploader(pub String);

impl Uploader {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Uploader {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

// Reads headers only, so it can sit next to a Multipart extractor
impl FromRequestParts<Arc<AppState>> for Uploader {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get(UPLOADER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        Ok(match forwarded {
            Some(email) => Uploader(email.to_string()),
            None => Uploader(state.config.default_uploader().to_string()),
        })
    }
}
