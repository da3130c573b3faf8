use serde_json::{Map, Value};

/// Externally supplied widget settings, e.g. `[viewer.settings]` from the config file.
///
/// The mapping is frozen once built and handed to the bootstrapper by value;
/// nothing reads settings from ambient state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerSettings {
    values: Map<String, Value>,
}

impl ViewerSettings {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// The OAuth client id, or `""` when absent or not a string.
    pub fn client_id(&self) -> &str {
        self.values
            .get("clientId")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}
