//! Shareable emergency links and QR image URLs.

use healthkey_core::{EmergencyPayload, EmergencyProfile, HealthKeyConfig};
use serde::Serialize;
use url::Url;

use crate::{decode, encode, DecodeError};

/// Query parameter carrying the payload token.
pub const TOKEN_PARAM: &str = "data";

/// Build the viewer link for `token`, replacing any existing token parameter.
pub fn emergency_link(base: &str, token: &str) -> Result<Url, LinkError> {
    let mut url = Url::parse(base)?;
    if url.cannot_be_a_base() {
        return Err(LinkError::NotHierarchical(base.to_string()));
    }

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != TOKEN_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(TOKEN_PARAM, token);
    Ok(url)
}

/// Pull the token out of a received link. An unparsable link counts as a missing token.
///
/// Spaces are read back as `+`: form decoding of an unescaped standard-base64
/// token turns every `+` into a space.
pub fn token_from_link(link: &str) -> Result<String, DecodeError> {
    let url = Url::parse(link.trim()).map_err(|_| DecodeError::Missing)?;
    url.query_pairs()
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.replace(' ', "+").trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(DecodeError::Missing)
}

pub fn decode_link(link: &str) -> Result<EmergencyPayload, DecodeError> {
    decode(&token_from_link(link)?)
}

/// External service turning arbitrary text into a QR image URL.
pub trait QrImageService {
    fn image_url(&self, data: &str) -> Result<Url, LinkError>;
}

/// Image URL builder for a qrserver-style `create-qr-code` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrServerImage {
    pub endpoint: String,
    pub size: u32,
}

impl Default for QrServerImage {
    fn default() -> Self {
        Self {
            endpoint: "https://api.qrserver.com/v1/create-qr-code/".to_string(),
            size: 300,
        }
    }
}

impl QrServerImage {
    pub fn from_config(config: &HealthKeyConfig) -> Self {
        Self {
            size: config.qr_size,
            ..Self::default()
        }
    }
}

impl QrImageService for QrServerImage {
    fn image_url(&self, data: &str) -> Result<Url, LinkError> {
        let mut url = Url::parse(&self.endpoint)?;
        if url.cannot_be_a_base() {
            return Err(LinkError::NotHierarchical(self.endpoint.clone()));
        }
        url.query_pairs_mut()
            .append_pair("size", &format!("{0}x{0}", self.size))
            .append_pair("data", data);
        Ok(url)
    }
}

/// Everything the share screen shows: token, link and QR image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedCard {
    pub token: String,
    pub link: Url,
    pub qr_image: Url,
}

pub fn share_card(
    profile: &EmergencyProfile,
    config: &HealthKeyConfig,
    qr: &dyn QrImageService,
) -> Result<SharedCard, LinkError> {
    let token = encode(profile);
    let link = emergency_link(&config.viewer_url, &token)?;
    let qr_image = qr.image_url(link.as_str())?;
    tracing::debug!(token_len = token.len(), "emergency card shared");

    Ok(SharedCard {
        token,
        link,
        qr_image,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("URL cannot carry query parameters: {0}")]
    NotHierarchical(String),
}
