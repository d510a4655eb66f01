// Local mirror of a realtime-database location, driven by streamed events
use crate::infrastructure::event_stream::ServerEvent;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Malformed {event} payload: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// What an event meant for the mirrored value.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeChange {
    Updated,
    Unchanged,
    /// The server ended the stream (`cancel` or `auth_revoked`).
    Closed(String),
}

#[derive(Debug, Deserialize)]
struct PathData {
    path: String,
    data: Value,
}

#[derive(Debug, Default)]
pub struct RealtimeTree {
    root: Value,
}

impl RealtimeTree {
    pub fn new() -> Self {
        Self { root: Value::Null }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn apply(&mut self, event: &ServerEvent) -> Result<TreeChange, TreeError> {
        match event.event.as_str() {
            "put" => {
                let update = parse_payload(event)?;
                set_at(&mut self.root, &segments(&update.path), update.data);
                Ok(TreeChange::Updated)
            }
            "patch" => {
                let update = parse_payload(event)?;
                let base = segments(&update.path);
                if let Value::Object(children) = update.data {
                    for (key, value) in children {
                        let mut path = base.clone();
                        path.extend(segments(&key));
                        set_at(&mut self.root, &path, value);
                    }
                }
                Ok(TreeChange::Updated)
            }
            "cancel" => Ok(TreeChange::Closed(format!("cancelled: {}", event.data))),
            "auth_revoked" => Ok(TreeChange::Closed("credential revoked".to_string())),
            _ => Ok(TreeChange::Unchanged),
        }
    }
}

fn parse_payload(event: &ServerEvent) -> Result<PathData, TreeError> {
    serde_json::from_str(&event.data).map_err(|source| TreeError::Payload {
        event: event.event.clone(),
        source,
    })
}

fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write `value` at `path`; `null` deletes the child, like the database does.
fn set_at(node: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(serde_json::Map::new());
    }
    let Value::Object(children) = node else {
        return;
    };

    if rest.is_empty() && value.is_null() {
        children.remove(head);
    } else {
        let child = children.entry(head.clone()).or_insert(Value::Null);
        set_at(child, rest, value);
        if child.is_null() {
            children.remove(head);
        }
    }
    if children.is_empty() {
        *node = Value::Null;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(name: &str, data: Value) -> ServerEvent {
        ServerEvent {
            event: name.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_put_root_then_field() {
        let mut tree = RealtimeTree::new();
        tree.apply(&event("put", json!({"path": "/", "data": {"Fuel": 50, "MPU": {"X": 1}}})))
            .unwrap();
        tree.apply(&event("put", json!({"path": "/MPU/Y", "data": 4})))
            .unwrap();

        assert_eq!(tree.root(), &json!({"Fuel": 50, "MPU": {"X": 1, "Y": 4}}));
    }

    #[test]
    fn test_patch_merges_children() {
        let mut tree = RealtimeTree::new();
        tree.apply(&event("put", json!({"path": "/", "data": {"Fuel": 50, "Oil": 70}})))
            .unwrap();
        tree.apply(&event("patch", json!({"path": "/", "data": {"Oil": 20, "Temp": 95}})))
            .unwrap();

        assert_eq!(tree.root(), &json!({"Fuel": 50, "Oil": 20, "Temp": 95}));
    }

    #[test]
    fn test_null_deletes() {
        let mut tree = RealtimeTree::new();
        tree.apply(&event("put", json!({"path": "/", "data": {"Fuel": 50, "MPU": {"X": 1}}})))
            .unwrap();
        tree.apply(&event("put", json!({"path": "/MPU/X", "data": null})))
            .unwrap();
        assert_eq!(tree.root(), &json!({"Fuel": 50}));

        tree.apply(&event("put", json!({"path": "/", "data": null})))
            .unwrap();
        assert!(tree.root().is_null());
    }

    #[test]
    fn test_control_events() {
        let mut tree = RealtimeTree::new();
        assert_eq!(
            tree.apply(&event("keep-alive", Value::Null)).unwrap(),
            TreeChange::Unchanged
        );
        assert!(matches!(
            tree.apply(&event("auth_revoked", Value::Null)).unwrap(),
            TreeChange::Closed(_)
        ));
    }

    #[test]
    fn test_malformed_payload() {
        let mut tree = RealtimeTree::new();
        let bad = ServerEvent {
            event: "put".to_string(),
            data: "not json".to_string(),
        };
        assert!(tree.apply(&bad).is_err());
    }
}
