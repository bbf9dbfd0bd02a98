//! Document tree.
//!
//! The structural parser produces a generic labeled tree: each node carries
//! a tag, an optional qualifier, named-value pairs, children grouped by tag,
//! attached comment lines, and a source origin. The tree knows nothing about
//! any particular dialect; the schema dispatcher gives it meaning.

use modl_core::{Fatal, ModlResult, Origin, NAME};
use std::collections::BTreeMap;

/// Synthetic tag of the document root node.
pub const DOC_ROOT: &str = "doc-root";

/// One node of the document tree.
///
/// Same-tag children keep insertion order within their group; the groups
/// themselves are stored and iterated in sorted-by-tag order, not document
/// order.
#[derive(Debug, Clone)]
pub struct DocNode {
    tag: String,
    qual: Option<String>,
    nvps: BTreeMap<String, String>,
    children: BTreeMap<String, Vec<DocNode>>,
    comments: Vec<String>,
    origin: Origin,
    path: String,
}

impl DocNode {
    pub fn new(tag: impl Into<String>, parent_path: &str, origin: Origin) -> Self {
        let tag = tag.into();
        let path = if parent_path.is_empty() {
            format!("/{}", tag)
        } else {
            format!("{}/{}", parent_path, tag)
        };
        Self {
            tag,
            qual: None,
            nvps: BTreeMap::new(),
            children: BTreeMap::new(),
            comments: Vec::new(),
            origin,
            path,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn qual(&self) -> Option<&str> {
        self.qual.as_deref()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Slash-joined ancestry path, for diagnostics.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn named_value(&self, key: &str) -> Option<&str> {
        self.nvps.get(key).map(String::as_str)
    }

    /// Looks up a mandatory named value; its absence is fatal and the
    /// diagnostic lists the keys that are present.
    pub fn require_named_value(&self, key: &str) -> ModlResult<&str> {
        self.named_value(key).ok_or_else(|| {
            let present: Vec<&str> = self.nvps.keys().map(String::as_str).collect();
            self.fatal(
                "named value retrieval",
                format!("missing mandatory named value '{}'", key),
            )
            .with_detail(format!("present: [{}]", present.join(", ")))
        })
    }

    /// True when a bare flag (stored as `flag=flag`) or any value is
    /// present under `key`.
    pub fn flag(&self, key: &str) -> bool {
        self.nvps.contains_key(key)
    }

    pub fn named_keys(&self) -> impl Iterator<Item = &str> {
        self.nvps.keys().map(String::as_str)
    }

    pub fn named_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nvps.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Children carrying the given tag, in insertion order.
    pub fn children(&self, tag: &str) -> &[DocNode] {
        self.children.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_child(&self, tag: &str) -> Option<&DocNode> {
        self.children(tag).first()
    }

    /// Child groups in sorted-by-tag order.
    pub fn child_groups(&self) -> impl Iterator<Item = (&str, &[DocNode])> {
        self.children.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// A fatal diagnostic anchored at this node's path and origin.
    pub fn fatal(&self, operation: impl Into<String>, cause: impl Into<String>) -> Fatal {
        Fatal::new(
            format!("parse-node[{} @ {}]", self.path, self.origin),
            operation,
            cause,
        )
    }

    pub(crate) fn push_comment(&mut self, line: String) {
        self.comments.push(line);
    }

    pub(crate) fn add_child(&mut self, child: DocNode) {
        self.children
            .entry(child.tag.clone())
            .or_default()
            .push(child);
    }

    /// Decomposes a composite value (`key=value;flag;...`) into named-value
    /// pairs on this node. The first unlabeled segment becomes both the
    /// node's qualifier and an implicit `name` pair; later unlabeled
    /// segments are flags (`flag=flag`). Double-quoted text escapes the
    /// `;`, newline, and `=` separators. A segment with more than one
    /// unquoted `=` is malformed.
    pub fn apply_composite(&mut self, text: &str) -> Result<(), String> {
        for raw in split_segments(text) {
            let segment = raw.trim();
            if segment.is_empty() {
                continue;
            }
            match split_pair(segment)? {
                Some((key, value)) => {
                    self.nvps
                        .insert(unquote(key).to_string(), unquote(value).to_string());
                }
                None => {
                    let token = unquote(segment).to_string();
                    if self.qual.is_none() {
                        self.qual = Some(token.clone());
                        self.nvps.insert(NAME.to_string(), token);
                    } else {
                        self.nvps.insert(token.clone(), token);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Splits composite text on `;` and newlines, honoring double quotes.
fn split_segments(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    for c in text.chars() {
        match c {
            '"' => {
                in_quote = !in_quote;
                current.push(c);
            }
            ';' | '\n' if !in_quote => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Splits one segment on its unquoted `=`, if any. More than one is
/// malformed composite syntax.
fn split_pair(segment: &str) -> Result<Option<(&str, &str)>, String> {
    let mut in_quote = false;
    let mut split_at = None;
    for (i, c) in segment.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '=' if !in_quote => {
                if split_at.is_some() {
                    return Err(format!(
                        "malformed composite segment '{}': more than one '='",
                        segment
                    ));
                }
                split_at = Some(i);
            }
            _ => {}
        }
    }
    Ok(split_at.map(|i| (segment[..i].trim(), segment[i + 1..].trim())))
}

fn unquote(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}
