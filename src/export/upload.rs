//! Publishing the image over HTTP.

use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::Deserialize;

use crate::error::ExportError;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Something that can publish a PNG and hand back a link to it.
pub trait ImageSharer: Send {
    fn share(&self, name: &str, png: Vec<u8>) -> Result<String, ExportError>;
}

/// Uploads with a plain `PUT <endpoint>/<name>.png`.
#[derive(Clone, Debug)]
pub struct HttpSharer {
    endpoint: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

impl HttpSharer {
    /// Returns an error when no endpoint is configured.
    pub fn new(endpoint: &str, token: Option<&str>) -> Result<Self, ExportError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(ExportError::NoEndpoint);
        }
        Ok(Self {
            endpoint: endpoint.to_string(),
            token: token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        })
    }

    /// Target URL for an upload named `name`.
    pub fn upload_url(&self, name: &str) -> Result<Url, ExportError> {
        let mut url = Url::parse(&self.endpoint).map_err(|_| ExportError::NoEndpoint)?;
        url.path_segments_mut()
            .map_err(|_| ExportError::NoEndpoint)?
            .pop_if_empty()
            .push(&format!("{}.png", name));
        Ok(url)
    }
}

/// Picks the shareable link out of a server reply.
///
/// A JSON object with a `url` field wins, then a body that is itself a URL,
/// then the URL the image was sent to.
pub fn extract_url(body: &str, request_url: &Url) -> String {
    if let Ok(response) = serde_json::from_str::<UploadResponse>(body) {
        return response.url;
    }
    let body = body.trim();
    if body.starts_with("http://") || body.starts_with("https://") {
        return body.to_string();
    }
    request_url.to_string()
}

impl ImageSharer for HttpSharer {
    fn share(&self, name: &str, png: Vec<u8>) -> Result<String, ExportError> {
        let url = self.upload_url(name)?;
        debug!("Uploading {} bytes to {}", png.len(), url);

        let client = Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        let mut request = client
            .put(url.clone())
            .header(CONTENT_TYPE, "image/png")
            .body(png);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ExportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let link = extract_url(&body, &url);
        info!("Uploaded to {}", link);
        Ok(link)
    }
}
