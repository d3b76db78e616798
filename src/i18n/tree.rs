//! Translation trees: nested namespaces of localized strings.
//!
//! A tree deserializes from a JSON object where nested objects are namespaces
//! and strings are the displayable text. Anything else is rejected at load time.

use crate::i18n::LoadError;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap())
}

/// One node of a translation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Displayable text.
    Text(String),
    /// Nested keys.
    Namespace(BTreeMap<String, Node>),
}

/// The sequence of keys naming one leaf, e.g. `settings.general.drives_title`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dot-delimited path. Returns `None` for an empty path or one
    /// with empty segments (`a..b`, `.a`, `a.`).
    pub fn parse(path: &str) -> Option<KeyPath> {
        KeyPath::from_segments(path.split('.'))
    }

    /// Build a path from explicit segments. Returns `None` if there are no
    /// segments or any segment is empty or contains a `.`, so the dotted form
    /// always parses back to the same path.
    pub fn from_segments<I, S>(segments: I) -> Option<KeyPath>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(|s| s.is_empty() || s.contains('.')) {
            return None;
        }
        Some(KeyPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// A locale's complete set of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTree {
    root: BTreeMap<String, Node>,
}

impl TranslationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tree from a JSON object.
    pub fn from_json(json: &str) -> Result<TranslationTree, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Insert (or replace) the text at a dot-delimited path, creating
    /// namespaces along the way. A leaf sitting where a namespace is needed
    /// is replaced by that namespace. Invalid paths are ignored.
    pub fn insert(&mut self, path: &str, text: impl Into<String>) -> &mut Self {
        let Some(path) = KeyPath::parse(path) else {
            return self;
        };
        let Some((leaf, parents)) = path.segments.split_last() else {
            return self;
        };

        let mut level = &mut self.root;
        for segment in parents {
            let node = level
                .entry(segment.clone())
                .or_insert_with(|| Node::Namespace(BTreeMap::new()));
            if let Node::Text(_) = node {
                *node = Node::Namespace(BTreeMap::new());
            }
            level = match node {
                Node::Namespace(children) => children,
                Node::Text(_) => return self,
            };
        }
        level.insert(leaf.clone(), Node::Text(text.into()));
        self
    }

    /// The node at `path`, leaf or namespace.
    pub fn node(&self, path: &KeyPath) -> Option<&Node> {
        let (first, rest) = path.segments.split_first()?;
        let mut node = self.root.get(first)?;
        for segment in rest {
            node = match node {
                Node::Namespace(children) => children.get(segment)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    /// The text at `path`. A path naming a namespace is not a hit.
    pub fn get(&self, path: &KeyPath) -> Option<&str> {
        match self.node(path)? {
            Node::Text(text) => Some(text.as_str()),
            Node::Namespace(_) => None,
        }
    }

    /// Every leaf as `(dotted path, text)`, in key order.
    pub fn leaves(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, "", &mut out);
        out
    }

    /// Every leaf path, in key order.
    pub fn key_paths(&self) -> Vec<String> {
        self.leaves().into_iter().map(|(path, _)| path).collect()
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        count_leaves(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn count_leaves(level: &BTreeMap<String, Node>) -> usize {
    level
        .values()
        .map(|node| match node {
            Node::Text(_) => 1,
            Node::Namespace(children) => count_leaves(children),
        })
        .sum()
}

fn collect_leaves<'a>(
    level: &'a BTreeMap<String, Node>,
    prefix: &str,
    out: &mut Vec<(String, &'a str)>,
) {
    for (key, node) in level {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match node {
            Node::Text(text) => out.push((path, text.as_str())),
            Node::Namespace(children) => collect_leaves(children, &path, out),
        }
    }
}

/// Replace `{name}` placeholders in a single pass.
///
/// Placeholders with no matching argument are left as-is; substituted values
/// are never scanned again.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            args.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Names of the `{name}` placeholders used in a template.
pub fn placeholders(template: &str) -> BTreeSet<String> {
    placeholder_regex()
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TranslationTree {
        TranslationTree::from_json(
            r#"{
                "error": "Error",
                "settings": {
                    "title": "Settings",
                    "general": { "drives_title": "Drives to scan" }
                }
            }"#,
        )
        .unwrap()
    }

    // ==================== KeyPath Tests ====================

    #[test]
    fn test_key_path_parse() {
        let path = KeyPath::parse("settings.general.drives_title").unwrap();
        assert_eq!(path.segments(), &["settings", "general", "drives_title"]);
        assert_eq!(path.to_string(), "settings.general.drives_title");
    }

    #[test]
    fn test_key_path_rejects_empty_segments() {
        assert!(KeyPath::parse("").is_none());
        assert!(KeyPath::parse(".error").is_none());
        assert!(KeyPath::parse("error.").is_none());
        assert!(KeyPath::parse("settings..title").is_none());
    }

    #[test]
    fn test_key_path_from_segments() {
        let path = KeyPath::from_segments(["settings", "title"]).unwrap();
        assert_eq!(path, KeyPath::parse("settings.title").unwrap());
        assert!(KeyPath::from_segments(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_key_path_from_segments_rejects_dotted_segment() {
        assert!(KeyPath::from_segments(["settings.general", "title"]).is_none());
        assert!(KeyPath::from_segments(["settings", ""]).is_none());
    }

    #[test]
    fn test_key_path_display_parses_back() {
        let path = KeyPath::from_segments(["settings", "general", "drives_title"]).unwrap();
        assert_eq!(KeyPath::parse(&path.to_string()), Some(path));
    }

    // ==================== Descent Tests ====================

    #[test]
    fn test_get_top_level_leaf() {
        let tree = sample();
        assert_eq!(tree.get(&KeyPath::parse("error").unwrap()), Some("Error"));
    }

    #[test]
    fn test_get_nested_leaf() {
        let tree = sample();
        let path = KeyPath::parse("settings.general.drives_title").unwrap();
        assert_eq!(tree.get(&path), Some("Drives to scan"));
    }

    #[test]
    fn test_get_namespace_is_not_text() {
        let tree = sample();
        let path = KeyPath::parse("settings.general").unwrap();
        assert!(tree.get(&path).is_none());
        assert!(matches!(tree.node(&path), Some(Node::Namespace(_))));
    }

    #[test]
    fn test_get_through_leaf_misses() {
        let tree = sample();
        assert!(tree.get(&KeyPath::parse("error.detail").unwrap()).is_none());
    }

    #[test]
    fn test_get_missing() {
        let tree = sample();
        assert!(tree.get(&KeyPath::parse("missing.key").unwrap()).is_none());
    }

    // ==================== Loading Tests ====================

    #[test]
    fn test_from_json_rejects_numbers() {
        let result = TranslationTree::from_json(r#"{ "count": 3 }"#);
        assert!(matches!(result, Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(TranslationTree::from_json(r#"["a", "b"]"#).is_err());
        assert!(TranslationTree::from_json("not json").is_err());
    }

    #[test]
    fn test_insert_builds_namespaces() {
        let mut tree = TranslationTree::new();
        tree.insert("error", "Erreur")
            .insert("details.loading", "Chargement...");
        assert_eq!(tree.get(&KeyPath::parse("error").unwrap()), Some("Erreur"));
        assert_eq!(
            tree.get(&KeyPath::parse("details.loading").unwrap()),
            Some("Chargement...")
        );
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_insert_replaces_leaf_with_namespace() {
        let mut tree = TranslationTree::new();
        tree.insert("error", "Error").insert("error.title", "Oops");
        assert!(tree.get(&KeyPath::parse("error").unwrap()).is_none());
        assert_eq!(tree.get(&KeyPath::parse("error.title").unwrap()), Some("Oops"));
    }

    #[test]
    fn test_len_counts_nested_leaves() {
        let tree = sample();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.len(), tree.leaves().len());
        assert!(TranslationTree::new().is_empty());
    }

    #[test]
    fn test_len_ignores_empty_namespaces() {
        let tree = TranslationTree::from_json(r#"{ "settings": { "general": {} } }"#).unwrap();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_insert_ignores_invalid_path() {
        let mut tree = TranslationTree::new();
        tree.insert("a..b", "x");
        assert!(tree.is_empty());
    }

    #[test]
    fn test_key_paths_sorted_and_flattened() {
        let tree = sample();
        assert_eq!(
            tree.key_paths(),
            vec!["error", "settings.general.drives_title", "settings.title"]
        );
    }

    #[test]
    fn test_tree_json_round_trip_preserves_structure() {
        let tree = sample();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(TranslationTree::from_json(&json).unwrap(), tree);
    }

    // ==================== Interpolation Tests ====================

    #[test]
    fn test_interpolate_replaces_known() {
        let text = interpolate("Welcome, you have {count} games", &[("count", "12")]);
        assert_eq!(text, "Welcome, you have 12 games");
    }

    #[test]
    fn test_interpolate_keeps_unknown() {
        let text = interpolate("{count} of {total}", &[("count", "3")]);
        assert_eq!(text, "3 of {total}");
    }

    #[test]
    fn test_interpolate_single_pass() {
        let text = interpolate("{a}", &[("a", "{b}"), ("b", "nested")]);
        assert_eq!(text, "{b}");
    }

    #[test]
    fn test_placeholders() {
        let names = placeholders("{sent} sent, {failed} failed, {sent} again");
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["failed".to_string(), "sent".to_string()]
        );
    }
}
