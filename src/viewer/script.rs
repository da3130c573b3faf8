//! Server-side rendition of the widget: instead of building UI in a browser,
//! `ScriptWidget` records the construction and OAuth calls and renders them
//! into the HTML page and inline initializer script the browser will run.

use askama::Template;
use serde_json::Value;

use super::bootstrap::{BootstrapError, Widget};
use super::interceptor::CsrfInterceptor;
use super::oauth::OAuthInit;
use super::options::{script_safe_json, WidgetOptions};
use crate::config::ViewerConfig;

#[derive(Template)]
#[template(path = "initializer.js", escape = "none")]
struct InitializerScript<'a> {
    options: &'a str,
    header: &'a str,
    token: &'a str,
    oauth: &'a str,
}

#[derive(Template)]
#[template(path = "docs.html")]
struct DocsPage<'a> {
    title: &'a str,
    assets_url: &'a str,
    mount_id: &'a str,
    script: &'a str,
}

/// The static HTML around the widget. Its only element the widget can mount
/// into is `mount_id`.
#[derive(Debug, Clone)]
pub struct PageShell {
    pub title: String,
    pub assets_url: String,
    pub mount_id: String,
}

impl PageShell {
    pub fn from_config(viewer: &ViewerConfig) -> Self {
        Self {
            title: viewer.title.clone(),
            assets_url: viewer.assets_url.trim_end_matches('/').to_string(),
            mount_id: viewer.mount_point.trim_start_matches('#').to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ScriptWidget {
    shell: PageShell,
    constructed: Option<(WidgetOptions, CsrfInterceptor)>,
    oauth: Option<OAuthInit>,
}

impl ScriptWidget {
    pub fn new(shell: PageShell) -> Self {
        Self {
            shell,
            constructed: None,
            oauth: None,
        }
    }

    /// Render just the initializer script.
    pub fn render_script(&self) -> Result<String, BootstrapError> {
        let Some((options, interceptor)) = &self.constructed else {
            return Err(BootstrapError::Render("widget was never constructed".into()));
        };

        let oauth = match &self.oauth {
            Some(oauth) => serde_json::to_value(oauth)
                .map(|v| script_safe_json(&v))
                .map_err(|e| BootstrapError::Render(format!("failed to serialize OAuth config: {e}")))?,
            None => return Err(BootstrapError::Render("OAuth was never initialized".into())),
        };

        InitializerScript {
            options: &options.to_js_properties(),
            header: &script_safe_json(&Value::from(interceptor.header_name())),
            token: &script_safe_json(&Value::from(interceptor.token())),
            oauth: &oauth,
        }
        .render()
        .map_err(|e| BootstrapError::Render(e.to_string()))
    }

    /// Render the complete documentation page.
    pub fn render(self) -> Result<String, BootstrapError> {
        let script = self.render_script()?;

        DocsPage {
            title: &self.shell.title,
            assets_url: &self.shell.assets_url,
            mount_id: &self.shell.mount_id,
            script: &script,
        }
        .render()
        .map_err(|e| BootstrapError::Render(e.to_string()))
    }
}

impl Widget for ScriptWidget {
    fn construct(
        &mut self,
        options: WidgetOptions,
        interceptor: CsrfInterceptor,
    ) -> Result<(), BootstrapError> {
        let dom_id = options.dom_id();
        if dom_id.trim_start_matches('#') != self.shell.mount_id {
            return Err(BootstrapError::MountPointMissing(dom_id.to_string()));
        }
        self.constructed = Some((options, interceptor));
        Ok(())
    }

    fn init_oauth(&mut self, oauth: OAuthInit) -> Result<(), BootstrapError> {
        if self.constructed.is_none() {
            return Err(BootstrapError::Render(
                "initOAuth called before the widget was constructed".into(),
            ));
        }
        self.oauth = Some(oauth);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::bootstrap::DocViewerBootstrapper;
    use crate::viewer::settings::ViewerSettings;
    use serde_json::json;

    fn shell() -> PageShell {
        PageShell {
            title: "Docs & more".into(),
            assets_url: "https://cdn.example.com/swagger-ui".into(),
            mount_id: "swagger-ui".into(),
        }
    }

    fn bootstrap(settings: Value, token: &str) -> Result<ScriptWidget, BootstrapError> {
        let Value::Object(map) = settings else {
            panic!("expected a JSON object");
        };
        DocViewerBootstrapper::new("/v1/openapi.json", token, ViewerSettings::new(map))
            .bootstrap(ScriptWidget::new(shell()))
    }

    #[test]
    fn test_script_contains_interceptor_and_oauth() {
        let widget = bootstrap(json!({"clientId": "abc"}), "tok-1").unwrap();
        let script = widget.render_script().unwrap();

        assert!(script.starts_with("const ui = SwaggerUIBundle({"));
        assert!(script.contains("\"url\": \"/v1/openapi.json\","));
        assert!(script.contains("\"dom_id\": \"#swagger-ui\","));
        assert!(script.contains("const csrfHeader = \"X-CSRFToken\";"));
        assert!(script.contains("request.headers[csrfHeader] = \"tok-1\";"));
        assert!(script.contains(r#"ui.initOAuth({"clientId":"abc","scopes":"abc/.default"});"#));
    }

    #[test]
    fn test_interceptor_comes_after_settings() {
        let widget = bootstrap(json!({"requestInterceptor": "x", "zzz": 1}), "tok").unwrap();
        let script = widget.render_script().unwrap();

        let interceptor_at = script.find("requestInterceptor:").unwrap();
        let last_setting_at = script.find("\"zzz\"").unwrap();
        assert!(interceptor_at > last_setting_at);
        assert_eq!(script.matches("requestInterceptor").count(), 1);
    }

    #[test]
    fn test_interceptor_replaces_header_in_any_case() {
        let widget = bootstrap(json!({}), "tok").unwrap();
        let script = widget.render_script().unwrap();

        let delete_at = script.find("delete request.headers[name];").unwrap();
        let assign_at = script.find("request.headers[csrfHeader] = \"tok\";").unwrap();
        assert!(delete_at < assign_at);
        assert!(script.contains("name.toLowerCase() === csrfHeader.toLowerCase()"));
    }

    #[test]
    fn test_token_cannot_break_out_of_script() {
        let widget = bootstrap(json!({}), "</script><b>").unwrap();
        let page = widget.render().unwrap();
        assert_eq!(page.matches("</script>").count(), 2);
    }

    #[test]
    fn test_page_layout() {
        let page = bootstrap(json!({}), "tok").unwrap().render().unwrap();
        assert!(page.contains("<div id=\"swagger-ui\"></div>"));
        assert!(page.contains("swagger-ui-bundle.js"));
        assert!(page.contains("Docs &amp; more") || page.contains("Docs &#38; more"));
    }

    #[test]
    fn test_overridden_dom_id_not_in_page() {
        let result = bootstrap(json!({"dom_id": "#elsewhere"}), "tok");
        assert_eq!(
            result.err(),
            Some(BootstrapError::MountPointMissing("#elsewhere".into()))
        );
    }

    #[test]
    fn test_render_requires_construction() {
        let widget = ScriptWidget::new(shell());
        assert!(matches!(widget.render(), Err(BootstrapError::Render(_))));
    }
}
