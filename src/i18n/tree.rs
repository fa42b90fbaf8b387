use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A value inside a translation tree: either a translated string or a nested tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Text(String),
    Tree(TranslationTree),
}

/// Nested translation dictionary addressed by dot-separated keys.
///
/// `{"auth": {"login": {"title": "Sign in"}}}` resolves `auth.login.title`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTree(BTreeMap<String, TranslationNode>);

impl TranslationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, segment: &str) -> Option<&TranslationNode> {
        self.0.get(segment)
    }

    pub fn insert(&mut self, segment: impl Into<String>, node: TranslationNode) {
        self.0.insert(segment.into(), node);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TranslationNode)> {
        self.0.iter()
    }

    /// Inserts a string at a dotted path, creating intermediate trees.
    ///
    /// A leaf sitting where a branch is needed is replaced by a tree.
    pub fn insert_path(&mut self, key: &str, text: impl Into<String>) {
        let mut segments: Vec<&str> = key.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = self;
        for segment in segments {
            let entry = current
                .0
                .entry(segment.to_string())
                .or_insert_with(|| TranslationNode::Tree(TranslationTree::new()));
            if let TranslationNode::Text(_) = entry {
                *entry = TranslationNode::Tree(TranslationTree::new());
            }
            let TranslationNode::Tree(next) = entry else {
                return;
            };
            current = next;
        }
        current
            .0
            .insert(last.to_string(), TranslationNode::Text(text.into()));
    }

    /// Walks the tree segment by segment. Only string leaves resolve.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut node = self.0.get(first)?;

        for segment in segments {
            match node {
                TranslationNode::Tree(tree) => node = tree.0.get(segment)?,
                TranslationNode::Text(_) => return None,
            }
        }

        match node {
            TranslationNode::Text(text) => Some(text.as_str()),
            TranslationNode::Tree(_) => None,
        }
    }

    /// Deep-merges `other` into `self`; `other` wins on every conflicting leaf.
    ///
    /// Branches present on both sides merge recursively. When one side holds a
    /// leaf and the other a branch, the incoming node replaces the existing one.
    pub fn merge(&mut self, other: &TranslationTree) {
        for (segment, incoming) in &other.0 {
            match (self.0.get_mut(segment), incoming) {
                (Some(TranslationNode::Tree(existing)), TranslationNode::Tree(incoming)) => {
                    existing.merge(incoming);
                }
                _ => {
                    self.0.insert(segment.clone(), incoming.clone());
                }
            }
        }
    }

    /// Number of string leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.0
            .values()
            .map(|node| match node {
                TranslationNode::Text(_) => 1,
                TranslationNode::Tree(tree) => tree.leaf_count(),
            })
            .sum()
    }

    /// Builds a tree from parsed JSON, keeping only objects and strings.
    ///
    /// Returns `None` when the document root is not an object. Non-string
    /// leaves (numbers, arrays, booleans, null) are dropped.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let mut tree = TranslationTree::new();
                for (key, value) in map {
                    match value {
                        Value::String(text) => tree.insert(key, TranslationNode::Text(text)),
                        nested @ Value::Object(_) => {
                            if let Some(subtree) = TranslationTree::from_json(nested) {
                                tree.insert(key, TranslationNode::Tree(subtree));
                            }
                        }
                        other => {
                            tracing::debug!(key = %key, value = %other, "Skipping non-string translation leaf");
                        }
                    }
                }
                Some(tree)
            }
            _ => None,
        }
    }
}

impl FromIterator<(String, String)> for TranslationTree {
    /// Collects `(dotted.key, text)` pairs into a nested tree.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut tree = TranslationTree::new();
        for (key, text) in iter {
            tree.insert_path(&key, text);
        }
        tree
    }
}
