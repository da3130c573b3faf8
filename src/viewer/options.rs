use serde_json::{Map, Value};

use super::settings::ViewerSettings;

pub const DEFAULT_LAYOUT: &str = "BaseLayout";
pub const DEFAULT_PRESETS: &[&str] = &["apis"];
pub const DEFAULT_PLUGINS: &[&str] = &["DownloadUrl"];

/// Members of `SwaggerUIBundle.presets` / `SwaggerUIBundle.plugins` that may be
/// referenced by name from settings.
const KNOWN_PRESETS: &[&str] = &["apis", "base"];
const KNOWN_PLUGINS: &[&str] = &["DownloadUrl", "DeepLinking", "Filter", "RequestSnippets"];

/// Set by the bootstrapper itself; never taken from settings.
const RESERVED_KEYS: &[&str] = &["requestInterceptor"];

/// Widget construction options: a fixed base overlaid with the external settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetOptions {
    values: Map<String, Value>,
}

impl WidgetOptions {
    /// Build the base options and merge `settings` over them. A key present in
    /// `settings` always wins, including `layout`, `presets`, `plugins`, `url`
    /// and `dom_id`. Values are not validated.
    pub fn build(schema_url: &str, mount_point: &str, settings: &ViewerSettings) -> Self {
        let mut values = Map::new();
        values.insert("url".into(), Value::from(schema_url));
        values.insert("dom_id".into(), Value::from(mount_point));
        values.insert("presets".into(), names(DEFAULT_PRESETS));
        values.insert("plugins".into(), names(DEFAULT_PLUGINS));
        values.insert("layout".into(), Value::from(DEFAULT_LAYOUT));

        for (key, value) in settings.iter() {
            if RESERVED_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "Ignoring reserved widget setting");
                continue;
            }
            values.insert(key.clone(), value.clone());
        }

        Self { values }
    }

    #[allow(dead_code)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The mount point selector, or `""` if settings replaced it with a non-string.
    pub fn dom_id(&self) -> &str {
        self.values
            .get("dom_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Render the options as the body of a JavaScript object literal, one
    /// `key: value,` property per line.
    pub fn to_js_properties(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.values {
            let rendered = match key.as_str() {
                "presets" => bundle_refs("presets", KNOWN_PRESETS, value),
                "plugins" => bundle_refs("plugins", KNOWN_PLUGINS, value),
                _ => script_safe_json(value),
            };
            out.push_str("  ");
            out.push_str(&script_safe_json(&Value::from(key.as_str())));
            out.push_str(": ");
            out.push_str(&rendered);
            out.push_str(",\n");
        }
        out
    }
}

fn names(list: &[&str]) -> Value {
    Value::Array(list.iter().map(|name| Value::from(*name)).collect())
}

/// Turn `["apis"]` into `[SwaggerUIBundle.presets.apis]`. Anything that is not a
/// known member name is emitted as plain JSON.
fn bundle_refs(kind: &str, known: &[&str], value: &Value) -> String {
    let Value::Array(items) = value else {
        return script_safe_json(value);
    };

    let parts: Vec<String> = items
        .iter()
        .map(|item| match item.as_str() {
            Some(name) if known.contains(&name) => format!("SwaggerUIBundle.{kind}.{name}"),
            _ => script_safe_json(item),
        })
        .collect();

    format!("[{}]", parts.join(", "))
}

/// JSON that can sit inside an inline `<script>` element: `<`, `>` and `&`
/// only occur inside string literals, where their `\u` escapes are equivalent.
pub fn script_safe_json(value: &Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
