//! Same-origin relay for images hosted by the generation provider.
//!
//! The host allow-list is the only thing keeping this from being an open
//! proxy: it is checked before the first request and again on every redirect.

use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, codecs::jpeg::JpegEncoder, imageops::FilterType};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use url::Url;

use crate::error::RelayError;

pub const DEFAULT_ALLOWED_HOSTS: [&str; 3] = ["fal.media", "v3b.fal.media", "storage.googleapis.com"];

pub const DEFAULT_CONTENT_TYPE: &str = "image/png";
pub const TRANSCODED_CONTENT_TYPE: &str = "image/jpeg";
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_BYTES: u64 = 20 * 1024 * 1024;

const JPEG_QUALITY: u8 = 82;
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub struct ImageRelay {
    client: reqwest::Client,
    allowed_hosts: Arc<Vec<String>>,
    max_width: Option<u32>,
    timeout: Duration,
    max_bytes: u64,
}

impl ImageRelay {
    pub fn new(allowed_hosts: Vec<String>, max_width: Option<u32>) -> Result<Self, reqwest::Error> {
        let allowed_hosts: Arc<Vec<String>> = Arc::new(
            allowed_hosts
                .into_iter()
                .map(|host| host.trim().trim_end_matches('.').to_ascii_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
        );

        let redirect_hosts = allowed_hosts.clone();
        let client = reqwest::Client::builder()
            .redirect(Policy::custom(move |attempt| {
                if attempt.previous().len() >= MAX_REDIRECTS {
                    attempt.error("too many redirects")
                } else if attempt
                    .url()
                    .host_str()
                    .is_some_and(|host| is_allowed_host(host, redirect_hosts.as_slice()))
                {
                    attempt.follow()
                } else {
                    attempt.stop()
                }
            }))
            .build()?;

        Ok(Self {
            client,
            allowed_hosts,
            max_width: max_width.filter(|width| *width > 0),
            timeout: DEFAULT_FETCH_TIMEOUT,
            max_bytes: DEFAULT_MAX_BYTES,
        })
    }

    /// Deadline for the whole fetch, body included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Largest upstream body the relay will buffer.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_default_hosts(max_width: Option<u32>) -> Result<Self, reqwest::Error> {
        Self::new(
            DEFAULT_ALLOWED_HOSTS.iter().map(|host| host.to_string()).collect(),
            max_width,
        )
    }

    pub fn max_width(&self) -> Option<u32> {
        self.max_width
    }

    /// Parses `src` and checks it against the allow-list without touching the network.
    pub fn validate(&self, src: Option<&str>) -> Result<Url, RelayError> {
        let src = src
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .ok_or(RelayError::MissingSource)?;
        let url = Url::parse(src).map_err(|_| RelayError::InvalidSource)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RelayError::InvalidSource);
        }
        let host = url.host_str().ok_or(RelayError::InvalidSource)?;
        if !is_allowed_host(host, self.allowed_hosts.as_slice()) {
            return Err(RelayError::ForbiddenHost(host.to_string()));
        }
        Ok(url)
    }

    pub async fn relay(&self, src: Option<&str>) -> Result<RelayedImage, RelayError> {
        let url = self.validate(src)?;

        let mut response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "relay upstream failed");
            return Err(RelayError::UpstreamStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        if response
            .content_length()
            .is_some_and(|length| length > self.max_bytes)
        {
            return Err(RelayError::TooLarge(self.max_bytes));
        }
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(RelayError::TooLarge(self.max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        let original = RelayedImage {
            bytes,
            content_type,
        };
        let Some(max_width) = self.max_width else {
            return Ok(original);
        };

        tokio::task::spawn_blocking(move || match transcode(&original.bytes, max_width) {
            Ok(bytes) => RelayedImage {
                bytes,
                content_type: TRANSCODED_CONTENT_TYPE.to_string(),
            },
            Err(e) => {
                tracing::warn!("transcode skipped, relaying original bytes: {}", e);
                original
            }
        })
        .await
        .map_err(RelayError::from)
    }
}

/// Exact match or subdomain of an allowed host; `notfal.media` does not match `fal.media`.
pub fn is_allowed_host<S: AsRef<str>>(host: &str, allowed: &[S]) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    allowed.iter().any(|domain| {
        let domain = domain.as_ref();
        host == domain
            || host
                .strip_suffix(domain)
                .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// Downscales to `max_width` (keeping the aspect ratio) and re-encodes as JPEG.
pub fn transcode(bytes: &[u8], max_width: u32) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let resized = if decoded.width() > max_width {
        let height = (u64::from(decoded.height()) * u64::from(max_width)
            / u64::from(decoded.width()))
        .max(1) as u32;
        decoded.resize_exact(max_width, height, FilterType::Lanczos3)
    } else {
        decoded
    };

    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn allow_list_matches_exact_and_subdomains_only() {
        let allowed = DEFAULT_ALLOWED_HOSTS.as_slice();
        assert!(is_allowed_host("fal.media", allowed));
        assert!(is_allowed_host("cdn.fal.media", allowed));
        assert!(is_allowed_host("V3B.FAL.MEDIA", allowed));
        assert!(is_allowed_host("storage.googleapis.com.", allowed));

        assert!(!is_allowed_host("evil.com", allowed));
        assert!(!is_allowed_host("notfal.media", allowed));
        assert!(!is_allowed_host("notfal.media.evil.com", allowed));
        assert!(!is_allowed_host("fal.media.evil.com", allowed));
        assert!(!is_allowed_host("googleapis.com", allowed));
    }

    #[test]
    fn validate_rejects_before_fetching() {
        let relay = ImageRelay::with_default_hosts(None).unwrap();
        assert!(matches!(relay.validate(None), Err(RelayError::MissingSource)));
        assert!(matches!(relay.validate(Some("  ")), Err(RelayError::MissingSource)));
        assert!(matches!(relay.validate(Some("not a url")), Err(RelayError::InvalidSource)));
        assert!(matches!(
            relay.validate(Some("ftp://fal.media/a.png")),
            Err(RelayError::InvalidSource)
        ));
        assert!(matches!(
            relay.validate(Some("https://evil.com/a.png")),
            Err(RelayError::ForbiddenHost(host)) if host == "evil.com"
        ));
        let url = relay
            .validate(Some("https://cdn.fal.media/files/a.png"))
            .unwrap();
        assert_eq!(url.host_str(), Some("cdn.fal.media"));
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, image::Rgba([10, 120, 200, 128]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn transcode_downscales_keeping_aspect_ratio() {
        let jpeg = transcode(&png(400, 200), 100).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 50));
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn transcode_keeps_small_images_at_size() {
        let jpeg = transcode(&png(64, 32), 100).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn transcode_rejects_garbage() {
        assert!(transcode(b"definitely not an image", 100).is_err());
    }
}
