//! Startup reachability check for the schema document the page points at.
//!
//! The browser widget reports load errors itself; this only gives operators an
//! early warning in the logs when the configured URL is obviously broken.

use url::Url;

#[derive(Debug, PartialEq, Eq)]
pub enum SchemaStatus {
    Reachable { bytes: usize },
    Empty,
    BadStatus(u16),
    Unreachable(String),
}

/// Resolve a possibly relative schema URL against the server's public URL.
pub fn resolve(schema_url: &str, public_url: &str) -> Result<Url, String> {
    match Url::parse(schema_url) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(&format!("{public_url}/"))
                .map_err(|e| format!("invalid public_url '{public_url}': {e}"))?;
            base.join(schema_url)
                .map_err(|e| format!("invalid schema_url '{schema_url}': {e}"))
        }
        Err(e) => Err(format!("invalid schema_url '{schema_url}': {e}")),
    }
}

pub async fn check(client: &reqwest::Client, url: Url) -> SchemaStatus {
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => return SchemaStatus::Unreachable(e.to_string()),
    };

    let status = response.status();
    if !status.is_success() {
        return SchemaStatus::BadStatus(status.as_u16());
    }

    match response.bytes().await {
        Ok(body) if body.iter().all(u8::is_ascii_whitespace) => SchemaStatus::Empty,
        Ok(body) => SchemaStatus::Reachable { bytes: body.len() },
        Err(e) => SchemaStatus::Unreachable(e.to_string()),
    }
}

/// Check and log the outcome. Never fails startup.
pub async fn check_and_log(client: reqwest::Client, schema_url: String, public_url: String) {
    let url = match resolve(&schema_url, &public_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Schema check skipped: {e}");
            return;
        }
    };

    match check(&client, url.clone()).await {
        SchemaStatus::Reachable { bytes } => {
            tracing::info!(url = %url, bytes, "Schema document reachable")
        }
        SchemaStatus::Empty => {
            tracing::warn!(url = %url, "Schema document is empty; the docs page will show a load error")
        }
        SchemaStatus::BadStatus(code) => tracing::warn!(
            url = %url,
            status = code,
            "Schema document returned an error status; the docs page will show a load error"
        ),
        SchemaStatus::Unreachable(e) => tracing::warn!(
            url = %url,
            error = %e,
            "Schema document unreachable; the docs page will show a load error"
        ),
    }
}
