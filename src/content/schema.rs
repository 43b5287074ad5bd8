//! Nested data schema derived from a document's variable paths.
//!
//! `agency.name` and `agency.phone` merge into one `agency` object with two
//! leaves. A path that is both a leaf and a prefix (`agency` and
//! `agency.name`) resolves to the object.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Value type reported for every leaf in the JSON form of the schema.
const LEAF_TYPE: &str = "string";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    Leaf,
    Object(BTreeMap<String, SchemaNode>),
}

/// Skeleton of the data object a document expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSchema {
    root: BTreeMap<String, SchemaNode>,
}

impl DataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from dot paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Self::new();
        for path in paths {
            schema.insert(path.as_ref());
        }
        schema
    }

    /// Merge one dot path into the schema.
    pub fn insert(&mut self, path: &str) {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut level = &mut self.root;
        for segment in parents {
            let node = level
                .entry(segment.to_string())
                .or_insert_with(|| SchemaNode::Object(BTreeMap::new()));
            if matches!(node, SchemaNode::Leaf) {
                *node = SchemaNode::Object(BTreeMap::new());
            }
            level = match node {
                SchemaNode::Object(children) => children,
                SchemaNode::Leaf => return,
            };
        }
        level.entry(last.to_string()).or_insert(SchemaNode::Leaf);
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Top-level keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Every leaf as a dot path, sorted.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_leaves(&self.root, "", &mut out);
        out
    }

    /// JSON form: objects for groups, `"string"` for leaves.
    pub fn to_json(&self) -> Value {
        build_json(&self.root, "", &|_| Value::String(LEAF_TYPE.to_string()))
    }

    /// Sample data conforming to the schema, for previews without real data.
    ///
    /// Each leaf is set to its own path in brackets, e.g. `"[agency.name]"`.
    pub fn sample_data(&self) -> Value {
        build_json(&self.root, "", &|path| Value::String(format!("[{}]", path)))
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn collect_leaves(level: &BTreeMap<String, SchemaNode>, prefix: &str, out: &mut Vec<String>) {
    for (key, node) in level {
        let path = join(prefix, key);
        match node {
            SchemaNode::Leaf => out.push(path),
            SchemaNode::Object(children) => collect_leaves(children, &path, out),
        }
    }
}

fn build_json(level: &BTreeMap<String, SchemaNode>, prefix: &str, leaf: &dyn Fn(&str) -> Value) -> Value {
    let mut map = Map::new();
    for (key, node) in level {
        let path = join(prefix, key);
        let value = match node {
            SchemaNode::Leaf => leaf(&path),
            SchemaNode::Object(children) => build_json(children, &path, leaf),
        };
        map.insert(key.clone(), value);
    }
    Value::Object(map)
}

impl Serialize for DataSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
