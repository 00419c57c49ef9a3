use bytes::Bytes;
use logship_digest::Md5;

use crate::endpoint::TransportMode;

/// Declared content type of every submission body.
pub const CONTENT_TYPE: &str = "application/json;charset=utf-8";

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_REQUESTED_WITH: &str = "X-Requested-With";
pub const HEADER_PRODUCT_KEY: &str = "X-Product-Key";
pub const HEADER_PRODUCT_AUTH: &str = "X-Product-Auth";

const REQUESTED_WITH: &str = "XMLHttpRequest";

/// One outbound `POST` to the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub url: String,
    pub body: Bytes,
    pub headers: Vec<(&'static str, String)>,
}

impl Submission {
    /// Build a submission signed for `token`, with the headers of
    /// [`TransportMode::Standard`].
    ///
    /// `X-Product-Auth` is the hex digest of the body followed by the token.
    pub fn signed(url: String, token: &str, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let mut signer = Md5::new();
        signer.update(&body);
        signer.update(token.as_bytes());
        let auth = signer.finalize().to_hex();

        Self {
            url,
            body,
            headers: vec![
                (HEADER_CONTENT_TYPE, CONTENT_TYPE.to_string()),
                (HEADER_PRODUCT_KEY, token.to_string()),
                (HEADER_PRODUCT_AUTH, auth),
            ],
        }
    }

    /// Adjust headers to what `mode` sends. Legacy cross-domain requests
    /// also carry the `X-Requested-With` marker.
    pub fn for_mode(mut self, mode: TransportMode) -> Self {
        if let TransportMode::Legacy { .. } = mode {
            self.headers
                .push((HEADER_REQUESTED_WITH, REQUESTED_WITH.to_string()));
        }
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as text; submissions always carry UTF-8 JSON.
    pub fn body_text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }
}
