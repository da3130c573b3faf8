use serde::Serialize;

use super::settings::ViewerSettings;

/// Appended to the client id to request the client's default scope set.
pub const DEFAULT_SCOPE_SUFFIX: &str = "/.default";

/// Arguments of the widget's `initOAuth` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthInit {
    pub client_id: String,
    pub scopes: String,
}

impl OAuthInit {
    /// An empty or missing `clientId` yields the bare suffix as scope; callers
    /// supplying the settings are expected to have caught that.
    pub fn from_settings(settings: &ViewerSettings) -> Self {
        let client_id = settings.client_id().to_string();
        let scopes = format!("{client_id}{DEFAULT_SCOPE_SUFFIX}");
        Self { client_id, scopes }
    }
}
