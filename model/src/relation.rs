//! Relationship rules: dual-registered Relator/Related views.
//!
//! A class declares named relationships pointing at other classes. As
//! with containment, every rule registers under both endpoints: the
//! Relator is keyed by the source class and carries the relationship
//! objects, the Related is keyed by the target class and records which
//! classes point at it.

use crate::containment::expand_concrete;
use crate::{MClass, ModelCtx};
use modl_core::{Fatal, ModlResult, Origin};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// How many instances one end of a relationship admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Many,
}

impl Cardinality {
    pub fn parse(text: &str) -> Option<Cardinality> {
        match text {
            "single" => Some(Cardinality::Single),
            "many" => Some(Cardinality::Many),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cardinality::Single => "single",
            Cardinality::Many => "many",
        }
    }
}

/// An open relationship declaration: carries the source class, the
/// relationship name and the source-side cardinality while the target
/// bindings underneath it are processed.
#[derive(Debug)]
pub struct DependencyDecl {
    gname: String,
    source: String,
    name: String,
    cardinality: Cardinality,
}

impl DependencyDecl {
    pub fn new(source_gname: &str, name: &str, cardinality: Cardinality) -> Self {
        Self {
            gname: format!("{}/{}", source_gname, name),
            source: source_gname.to_string(),
            name: name.to_string(),
            cardinality,
        }
    }

    pub fn gname(&self) -> &str {
        &self.gname
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }
}

/// One named relationship: a source class pointing at a target class,
/// with a cardinality on each end.
#[derive(Debug)]
pub struct Relationship {
    name: String,
    source: String,
    target: String,
    source_cardinality: Cardinality,
    target_cardinality: Cardinality,
    origin: Origin,
}

impl Relationship {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn source_cardinality(&self) -> Cardinality {
        self.source_cardinality
    }

    pub fn target_cardinality(&self) -> Cardinality {
        self.target_cardinality
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

/// The source-keyed view: the relationships a class declares, grouped by
/// target class, keyed by relationship name within a target.
#[derive(Debug)]
pub struct Relator {
    class: String,
    relationships: RwLock<BTreeMap<String, BTreeMap<String, Arc<Relationship>>>>,
}

impl Relator {
    pub fn new(class_gname: impl Into<String>) -> Self {
        Self {
            class: class_gname.into(),
            relationships: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn class_gname(&self) -> &str {
        &self.class
    }

    pub fn target_names(&self) -> Vec<String> {
        self.relationships
            .read()
            .expect("relation lock")
            .keys()
            .cloned()
            .collect()
    }

    /// Every relationship of this class, sorted by target then name.
    pub fn relationships(&self) -> Vec<Arc<Relationship>> {
        self.relationships
            .read()
            .expect("relation lock")
            .values()
            .flat_map(|named| named.values().cloned())
            .collect()
    }

    pub fn relationships_to(&self, target_gname: &str) -> Vec<Arc<Relationship>> {
        self.relationships
            .read()
            .expect("relation lock")
            .get(target_gname)
            .map(|named| named.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_relationship_named(&self, name: &str) -> bool {
        self.relationships
            .read()
            .expect("relation lock")
            .values()
            .any(|named| named.contains_key(name))
    }

    /// Target classes with abstract endpoints expanded to their concrete
    /// descendants, at read time.
    pub fn concrete_targets(&self, ctx: &ModelCtx) -> ModlResult<Vec<Arc<MClass>>> {
        expand_concrete(ctx, &self.target_names())
    }

    fn add(&self, relationship: Relationship) -> ModlResult<Arc<Relationship>> {
        let mut map = self.relationships.write().expect("relation lock");
        let named = map.entry(relationship.target.clone()).or_default();
        if named.contains_key(&relationship.name) {
            return Err(Fatal::new(
                format!("relator[{}]", self.class),
                "relationship registration",
                format!(
                    "duplicate relationship '{}' to '{}'",
                    relationship.name, relationship.target
                ),
            ));
        }
        let relationship = Arc::new(relationship);
        named.insert(relationship.name.clone(), relationship.clone());
        Ok(relationship)
    }
}

/// The target-keyed view: which classes point at this class.
#[derive(Debug)]
pub struct Related {
    class: String,
    sources: RwLock<BTreeSet<String>>,
}

impl Related {
    pub fn new(class_gname: impl Into<String>) -> Self {
        Self {
            class: class_gname.into(),
            sources: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn class_gname(&self) -> &str {
        &self.class
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.read().expect("relation lock").iter().cloned().collect()
    }

    pub fn has_source(&self, gname: &str) -> bool {
        self.sources.read().expect("relation lock").contains(gname)
    }

    /// Source classes with abstract endpoints expanded to their concrete
    /// descendants, at read time.
    pub fn concrete_sources(&self, ctx: &ModelCtx) -> ModlResult<Vec<Arc<MClass>>> {
        expand_concrete(ctx, &self.source_names())
    }

    fn add_source(&self, gname: &str) {
        self.sources.write().expect("relation lock").insert(gname.to_string());
    }
}

/// Registers one relationship in both views. The Relator and Related
/// sides are always created together, never one alone.
pub fn add_relationship(
    ctx: &ModelCtx,
    source_gname: &str,
    name: &str,
    source_cardinality: Cardinality,
    target_gname: &str,
    target_cardinality: Cardinality,
    origin: Origin,
) -> ModlResult<Arc<Relationship>> {
    let relator = ctx
        .relators
        .get_or_create(source_gname, || Relator::new(source_gname));
    let relationship = relator.add(Relationship {
        name: name.to_string(),
        source: source_gname.to_string(),
        target: target_gname.to_string(),
        source_cardinality,
        target_cardinality,
        origin,
    })?;
    let related = ctx
        .related
        .get_or_create(target_gname, || Related::new(target_gname));
    related.add_source(source_gname);
    Ok(relationship)
}
