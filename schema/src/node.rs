//! Schema nodes and the schema table.
//!
//! A schema is a static tree of nodes mirroring the dialect's expected
//! shape. Nodes live in a flat id-keyed table; tree edges map a child tag
//! to a node id, so one node can be shared between parents and `uses`
//! delegation is a plain id reference resolved lazily.

use modl_model::{EntityRef, ModelCtx};
use modl_parser::DocNode;
use modl_core::{Fatal, ModlResult};
use std::collections::{BTreeMap, BTreeSet};

/// What the dispatcher does after a node's `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Recurse into the node's children.
    Continue,
    /// Skip the node's children, keep processing siblings.
    EndSubtree,
    /// Stop processing the whole document.
    EndTree,
}

/// Per-construct factory: creates or augments a semantic entity from a
/// document node. Returning no entity makes the node pass-through (the
/// parent entity flows to the children unchanged).
pub type Factory =
    fn(&ModelCtx, &DocNode, Option<&EntityRef>) -> ModlResult<(Directive, Option<EntityRef>)>;

/// Invoked after a node's children have been walked; receives the entity
/// the node's factory produced (or the inherited parent entity). Used for
/// checks that need the subtree complete.
pub type EndHook = fn(&ModelCtx, &DocNode, Option<&EntityRef>) -> ModlResult<()>;

/// One schema node: the legal named-value set, the factory, and the tree
/// edges to child nodes.
pub struct SchemaNode {
    id: String,
    allowed: BTreeSet<String>,
    factory: Option<Factory>,
    end: Option<EndHook>,
    uses: Option<String>,
    recursive: bool,
    children: BTreeMap<String, String>,
}

impl SchemaNode {
    /// Starts a node. The id doubles as the default tag when linked via
    /// [`SchemaNode::child`].
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            allowed: BTreeSet::new(),
            factory: None,
            end: None,
            uses: None,
            recursive: false,
            children: BTreeMap::new(),
        }
    }

    /// Declares legal named-value keys.
    pub fn allow<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Attaches a hook run once the node's children have been walked.
    pub fn on_end(mut self, end: EndHook) -> Self {
        self.end = Some(end);
        self
    }

    /// Delegates processing to another node by id, resolved lazily at
    /// dispatch time.
    pub fn uses(mut self, target: impl Into<String>) -> Self {
        self.uses = Some(target.into());
        self
    }

    /// Marks the node self-matching: unknown children recurse into the
    /// node itself, with no named-value checking.
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Links a child node whose id equals its tag.
    pub fn child(self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let id = tag.clone();
        self.child_as(tag, id)
    }

    /// Links a child under `tag` to the node registered as `id`.
    pub fn child_as(mut self, tag: impl Into<String>, id: impl Into<String>) -> Self {
        self.children.insert(tag.into(), id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub(crate) fn allowed(&self) -> &BTreeSet<String> {
        &self.allowed
    }

    pub(crate) fn get_factory(&self) -> Option<Factory> {
        self.factory
    }

    pub(crate) fn get_end(&self) -> Option<EndHook> {
        self.end
    }

    pub(crate) fn uses_target(&self) -> Option<&str> {
        self.uses.as_deref()
    }

    pub(crate) fn child_id(&self, tag: &str) -> Option<&str> {
        self.children.get(tag).map(String::as_str)
    }

    pub(crate) fn child_tags(&self) -> Vec<&str> {
        self.children.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaNode")
            .field("id", &self.id)
            .field("allowed", &self.allowed)
            .field("uses", &self.uses)
            .field("recursive", &self.recursive)
            .field("children", &self.children)
            .finish()
    }
}

/// The complete schema of one dialect.
#[derive(Debug)]
pub struct Schema {
    nodes: BTreeMap<String, SchemaNode>,
    root: String,
}

impl Schema {
    pub fn root_id(&self) -> &str {
        &self.root
    }

    pub fn node(&self, id: &str) -> ModlResult<&SchemaNode> {
        self.nodes.get(id).ok_or_else(|| {
            Fatal::new(
                format!("schema-node[{}]", id),
                "schema lookup",
                "no node registered under this id",
            )
        })
    }

    /// Resolves a node through its `uses` chain to the node that actually
    /// carries the factory. A node with neither a factory nor a
    /// resolvable delegation target is fatal.
    pub fn effective<'a>(&'a self, node: &'a SchemaNode) -> ModlResult<&'a SchemaNode> {
        let mut current = node;
        let mut visited = BTreeSet::from([current.id().to_string()]);
        while current.get_factory().is_none() {
            let Some(target) = current.uses_target() else {
                return Err(Fatal::new(
                    format!("schema-node[{}]", current.id()),
                    "delegation resolution",
                    "neither a factory nor a delegation target exists",
                ));
            };
            let next = self.node(target)?;
            if !visited.insert(next.id().to_string()) {
                return Err(Fatal::new(
                    format!("schema-node[{}]", node.id()),
                    "delegation resolution",
                    format!("delegation cycle through '{}'", next.id()),
                ));
            }
            current = next;
        }
        Ok(current)
    }
}

/// Assembles a [`Schema`] from node declarations.
pub struct SchemaBuilder {
    nodes: BTreeMap<String, SchemaNode>,
    root: String,
}

impl SchemaBuilder {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            nodes: BTreeMap::new(),
            root: root_id.into(),
        }
    }

    pub fn add(mut self, node: SchemaNode) -> Self {
        self.nodes.insert(node.id().to_string(), node);
        self
    }

    /// Finalizes the schema. Every tree edge must point at a registered
    /// node; `uses` targets stay lazy per design.
    pub fn build(self) -> ModlResult<Schema> {
        if !self.nodes.contains_key(&self.root) {
            return Err(Fatal::new(
                format!("schema-node[{}]", self.root),
                "schema construction",
                "root node is not registered",
            ));
        }
        for node in self.nodes.values() {
            for tag in node.child_tags() {
                let id = node.child_id(tag).expect("tag comes from the map");
                if !self.nodes.contains_key(id) {
                    return Err(Fatal::new(
                        format!("schema-node[{}]", node.id()),
                        "schema construction",
                        format!("child '{}' points at unregistered node '{}'", tag, id),
                    ));
                }
            }
        }
        Ok(Schema {
            nodes: self.nodes,
            root: self.root,
        })
    }
}
