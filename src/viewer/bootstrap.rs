use super::interceptor::CsrfInterceptor;
use super::oauth::OAuthInit;
use super::options::WidgetOptions;
use super::settings::ViewerSettings;

pub const DEFAULT_MOUNT_POINT: &str = "#swagger-ui";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("schema URL is empty")]
    EmptySchemaUrl,
    #[error("mount point '{0}' does not exist in the page")]
    MountPointMissing(String),
    #[error("failed to render documentation page: {0}")]
    Render(String),
}

/// The documentation widget as seen by the bootstrapper.
pub trait Widget {
    /// Build the UI into the page. Must fail when `options.dom_id()` names an
    /// element the page does not have.
    fn construct(
        &mut self,
        options: WidgetOptions,
        interceptor: CsrfInterceptor,
    ) -> Result<(), BootstrapError>;

    fn init_oauth(&mut self, oauth: OAuthInit) -> Result<(), BootstrapError>;
}

/// Runs the page-load sequence: merge options, construct the widget with the
/// CSRF interceptor attached, then initialize OAuth.
#[derive(Debug, Clone)]
pub struct DocViewerBootstrapper {
    schema_url: String,
    csrf_token: String,
    settings: ViewerSettings,
    mount_point: String,
}

impl DocViewerBootstrapper {
    pub fn new(
        schema_url: impl Into<String>,
        csrf_token: impl Into<String>,
        settings: ViewerSettings,
    ) -> Self {
        Self {
            schema_url: schema_url.into(),
            csrf_token: csrf_token.into(),
            settings,
            mount_point: DEFAULT_MOUNT_POINT.to_string(),
        }
    }

    pub fn mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = mount_point.into();
        self
    }

    pub fn bootstrap<W: Widget>(&self, mut widget: W) -> Result<W, BootstrapError> {
        if self.schema_url.is_empty() {
            return Err(BootstrapError::EmptySchemaUrl);
        }

        let options = WidgetOptions::build(&self.schema_url, &self.mount_point, &self.settings);
        let interceptor = CsrfInterceptor::new(self.csrf_token.clone());
        widget.construct(options, interceptor)?;

        let oauth = OAuthInit::from_settings(&self.settings);
        tracing::debug!(client_id = %oauth.client_id, scopes = %oauth.scopes, "Initializing widget OAuth");
        widget.init_oauth(oauth)?;

        Ok(widget)
    }
}
