use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Plotly figure: a list of traces and a layout object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Map<String, Value>,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trace(&mut self, trace: Value) {
        self.data.push(trace);
    }

    /// Deep-merges `patch` into the layout. Nested objects are merged key by
    /// key; anything else replaces the existing value.
    pub fn update_layout(&mut self, patch: Value) {
        if let Value::Object(patch) = patch {
            merge(&mut self.layout, patch);
        }
    }
}

fn merge(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge(existing, incoming),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}
