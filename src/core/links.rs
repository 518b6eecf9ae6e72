use url::form_urlencoded;

/// Path of the relay endpoint relative to the API prefix.
pub const THUMB_PATH: &str = "/agape/thumb";

/// Public scheme and host of the inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedOrigin {
    pub scheme: String,
    pub host: String,
}

impl ForwardedOrigin {
    /// Forwarding headers win over `Host`; each may carry a comma separated
    /// chain, in which case the first (client-facing) entry is used.
    pub fn from_headers(
        forwarded_proto: Option<&str>,
        forwarded_host: Option<&str>,
        host: Option<&str>,
    ) -> Self {
        let scheme = first_value(forwarded_proto)
            .map(|scheme| scheme.to_ascii_lowercase())
            .filter(|scheme| scheme == "http" || scheme == "https")
            .unwrap_or_else(|| "https".to_string());
        let host = first_value(forwarded_host)
            .or_else(|| first_value(host))
            .unwrap_or("localhost")
            .to_string();
        Self { scheme, host }
    }
}

fn first_value(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Same-origin relay URL with `image_url` percent-encoded as `src`.
pub fn proxy_url(origin: &ForwardedOrigin, prefix: &str, image_url: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("src", image_url)
        .finish();
    format!(
        "{}://{}{}{}?{}",
        origin.scheme, origin.host, prefix, THUMB_PATH, query
    )
}

pub fn render_markdown(proxy_url: &str) -> String {
    format!("![Generated image]({proxy_url})")
}

pub fn download_markdown(image_url: &str) -> String {
    format!("[Download image]({image_url})")
}
