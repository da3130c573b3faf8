use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Top-level configuration parsed from TOML.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub upstream: Option<UpstreamConfig>,
}

/// Server-level configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub public_url: String,
    /// Secret key used for HMAC-signing CSRF tokens.
    pub csrf_secret: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// What the documentation page shows and how the widget is set up.
#[derive(Debug, Deserialize)]
pub struct ViewerConfig {
    pub schema_url: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_mount_point")]
    pub mount_point: String,
    /// Base URL the widget's `swagger-ui.css` and `swagger-ui-bundle.js` are loaded from.
    #[serde(default = "default_assets_url")]
    pub assets_url: String,
    /// Fetch the schema once at startup and warn if it is unreachable.
    #[serde(default)]
    pub check_schema: bool,
    /// Extra widget options, merged over the built-in defaults.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

fn default_title() -> String {
    "API documentation".to_string()
}

fn default_mount_point() -> String {
    "#swagger-ui".to_string()
}

fn default_assets_url() -> String {
    "https://cdn.jsdelivr.net/npm/swagger-ui-dist@5".to_string()
}

/// The API that "try it out" requests are forwarded to under `/api/`.
#[derive(Debug, Deserialize)]
pub struct UpstreamConfig {
    pub url: String,
}

/// Load and validate config from a TOML file, applying environment variable overrides.
pub fn load_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

    parse_config(&content)
}

fn parse_config(content: &str) -> Result<Config, String> {
    let mut config: Config =
        toml::from_str(content).map_err(|e| format!("Failed to parse TOML config: {e}"))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    warn_on_degenerate_settings(&config.viewer.settings);

    Ok(config)
}

/// Apply environment variable overrides.
fn apply_env_overrides(
    config: &mut Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), String> {
    if let Some(val) = env("DOCS_VIEWER_CSRF_SECRET") {
        config.server.csrf_secret = val;
    }

    // DOCS_VIEWER_SETTINGS is a JSON object merged key by key over [viewer.settings]
    if let Some(val) = env("DOCS_VIEWER_SETTINGS") {
        let extra: Map<String, Value> = serde_json::from_str(&val)
            .map_err(|e| format!("DOCS_VIEWER_SETTINGS must be a JSON object: {e}"))?;
        config.viewer.settings.extend(extra);
    }

    Ok(())
}

/// Validate the entire configuration. Returns an error string on failure.
fn validate(config: &Config) -> Result<(), String> {
    validate_server(&config.server)?;
    validate_viewer(&config.viewer)?;
    if let Some(upstream) = &config.upstream {
        validate_upstream(upstream)?;
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), String> {
    if server.public_url.is_empty() {
        return Err("server.public_url is required".to_string());
    }

    if server.public_url.ends_with('/') {
        return Err("server.public_url must not have a trailing slash".to_string());
    }

    // Allow http:// for local dev
    if server.public_url.starts_with("http://") {
        tracing::warn!(
            "server.public_url uses http://; the CSRF cookie should be served over HTTPS in production"
        );
    } else if !server.public_url.starts_with("https://") {
        return Err(
            "server.public_url must start with https:// (or http:// for local dev)".to_string(),
        );
    }

    if server.csrf_secret.is_empty() {
        return Err("server.csrf_secret is required".to_string());
    }
    match base64::Engine::decode(
        &base64::engine::general_purpose::STANDARD,
        &server.csrf_secret,
    ) {
        Ok(bytes) => {
            if bytes.len() < 32 {
                return Err(format!(
                    "server.csrf_secret must be at least 32 bytes when base64-decoded (got {} bytes). Generate with: openssl rand -base64 32",
                    bytes.len()
                ));
            }
        }
        Err(e) => {
            return Err(format!("server.csrf_secret is not valid base64: {e}"));
        }
    }

    Ok(())
}

fn validate_viewer(viewer: &ViewerConfig) -> Result<(), String> {
    if viewer.schema_url.trim().is_empty() {
        return Err("viewer.schema_url is required".to_string());
    }

    let mount_regex = regex_lite::Regex::new(r"^#?[A-Za-z][A-Za-z0-9_-]*$")
        .map_err(|e| format!("internal regex error: {e}"))?;
    if !mount_regex.is_match(&viewer.mount_point) {
        return Err(format!(
            "viewer.mount_point '{}' must be an element id such as #swagger-ui",
            viewer.mount_point
        ));
    }

    if !viewer.assets_url.starts_with("http://") && !viewer.assets_url.starts_with("https://") {
        return Err("viewer.assets_url must be a valid HTTP(S) URL".to_string());
    }

    Ok(())
}

fn validate_upstream(upstream: &UpstreamConfig) -> Result<(), String> {
    if !upstream.url.starts_with("http://") && !upstream.url.starts_with("https://") {
        return Err("upstream.url must be a valid HTTP(S) URL".to_string());
    }
    if upstream.url.ends_with('/') {
        return Err("upstream.url must not have a trailing slash".to_string());
    }
    Ok(())
}

/// The bootstrapper accepts any settings as-is, so a missing client id only
/// produces a degenerate OAuth scope. Point it out here instead.
fn warn_on_degenerate_settings(settings: &Map<String, Value>) {
    match settings.get("clientId") {
        Some(Value::String(id)) if !id.is_empty() => {}
        Some(Value::String(_)) => {
            tracing::warn!("viewer.settings.clientId is empty; OAuth scope will be \"/.default\"")
        }
        Some(other) => tracing::warn!(
            value = %other,
            "viewer.settings.clientId is not a string; OAuth scope will be \"/.default\""
        ),
        None => tracing::warn!(
            "viewer.settings.clientId is not set; OAuth login in the docs page will not work"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

    fn minimal_toml() -> String {
        format!(
            r#"
[server]
public_url = "https://docs.example.com"
csrf_secret = "{SECRET}"

[viewer]
schema_url = "/v1/openapi.json"
"#
        )
    }

    #[test]
    fn test_parse_minimal() {
        let config: Config = toml::from_str(&minimal_toml()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.viewer.mount_point, "#swagger-ui");
        assert!(config.viewer.settings.is_empty());
        assert!(config.upstream.is_none());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_settings_table_becomes_json() {
        let toml_str = format!(
            "{}\n[viewer.settings]\nclientId = \"abc\"\ndeepLinking = true\nlayout = \"StandaloneLayout\"\n",
            minimal_toml()
        );
        let config = parse_config(&toml_str).unwrap();
        assert_eq!(config.viewer.settings["clientId"], Value::from("abc"));
        assert_eq!(config.viewer.settings["deepLinking"], Value::Bool(true));
        assert_eq!(config.viewer.settings["layout"], Value::from("StandaloneLayout"));
    }

    #[test]
    fn test_env_settings_merge_over_file() {
        let toml_str = format!("{}\n[viewer.settings]\nclientId = \"abc\"\n", minimal_toml());
        let mut config: Config = toml::from_str(&toml_str).unwrap();
        apply_env_overrides(&mut config, |key| match key {
            "DOCS_VIEWER_SETTINGS" => Some(r#"{"clientId": "xyz", "docExpansion": "none"}"#.into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.viewer.settings["clientId"], Value::from("xyz"));
        assert_eq!(config.viewer.settings["docExpansion"], Value::from("none"));
    }

    #[test]
    fn test_env_settings_must_be_object() {
        let mut config: Config = toml::from_str(&minimal_toml()).unwrap();
        let result = apply_env_overrides(&mut config, |key| {
            (key == "DOCS_VIEWER_SETTINGS").then(|| "[1, 2]".to_string())
        });
        assert!(result.unwrap_err().contains("JSON object"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config: Config = toml::from_str(&minimal_toml()).unwrap();
        config.server.csrf_secret = "c2hvcnQ=".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.contains("at least 32 bytes"));
    }

    #[test]
    fn test_invalid_mount_point() {
        let mut config: Config = toml::from_str(&minimal_toml()).unwrap();
        config.viewer.mount_point = "div > .docs".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.contains("mount_point"));

        config.viewer.mount_point = "docs-root".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_schema_url_rejected() {
        let mut config: Config = toml::from_str(&minimal_toml()).unwrap();
        config.viewer.schema_url = "  ".to_string();
        assert!(validate(&config).unwrap_err().contains("schema_url"));
    }

    #[test]
    fn test_upstream_trailing_slash_rejected() {
        let toml_str = format!("{}\n[upstream]\nurl = \"https://api.example.com/\"\n", minimal_toml());
        let config: Config = toml::from_str(&toml_str).unwrap();
        assert!(validate(&config).unwrap_err().contains("trailing slash"));
    }
}
