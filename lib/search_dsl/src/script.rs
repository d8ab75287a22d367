use serde_json::{Map, Value, json};

/// A backend-evaluated script with bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub source: String,
    pub lang: String,
    pub params: Map<String, Value>,
}

impl Script {
    pub fn painless(source: impl Into<String>) -> Self {
        Script {
            source: source.into(),
            lang: "painless".to_string(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut script = json!({
            "source": self.source,
            "lang": self.lang,
        });
        if !self.params.is_empty() {
            script["params"] = Value::Object(self.params.clone());
        }
        script
    }
}
