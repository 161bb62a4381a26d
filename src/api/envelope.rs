use serde_json::Value;

/// Canonical form of the backend's response envelopes.
///
/// The API is inconsistent about its envelope: some endpoints return
/// `{success, message, data}`, some return the resource bare, some wrap a
/// list under a resource-named key (`{"orders": [...]}`). This adapter is
/// the only place that knows about those shapes; everything above it works
/// with one normalized type.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub success: bool,
    pub message: Option<String>,
    pub data: Value,
}

impl Envelope {
    pub fn parse(value: Value) -> Self {
        let success = value
            .get("success")
            .and_then(Value::as_bool)
            // A 2xx body without an explicit flag counts as success.
            .unwrap_or(true);
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        let data = match value.get("data") {
            Some(data) if !data.is_null() => data.clone(),
            _ => value,
        };

        Self {
            success,
            message,
            data,
        }
    }

    /// First string found under any of `keys`, searched in order.
    pub fn str_field(&self, keys: &[&str]) -> Option<String> {
        pluck(&self.data, keys)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    /// First number found under any of `keys`.
    pub fn f64_field(&self, keys: &[&str]) -> Option<f64> {
        pluck(&self.data, keys).and_then(|v| v.as_f64())
    }

    /// Extract a list: either the data itself is an array, or it is wrapped
    /// under one of the given keys. Missing entirely means empty.
    pub fn list(&self, keys: &[&str]) -> Vec<Value> {
        if let Some(items) = self.data.as_array() {
            return items.clone();
        }
        for key in keys {
            if let Some(items) = self.data.get(key).and_then(Value::as_array) {
                return items.clone();
            }
        }
        Vec::new()
    }

    /// The object holding the entity itself, unwrapping one resource-named
    /// level if present.
    pub fn entity(&self, keys: &[&str]) -> Value {
        for key in keys {
            if let Some(inner) = self.data.get(key) {
                if inner.is_object() {
                    return inner.clone();
                }
            }
        }
        self.data.clone()
    }
}

fn pluck<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| data.get(key)).filter(|v| !v.is_null())
}
