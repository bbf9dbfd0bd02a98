//! The schema tree of the modeling dialect.
//!
//! This is the compile-time registration table: every construct name is
//! bound to its factory here, at every nesting depth where it is legal.

use crate::factories::*;
use modl_core::ModlResult;
use modl_schema::{Schema, SchemaBuilder, SchemaNode};

/// Builds the modeling-language schema.
pub fn schema() -> ModlResult<Schema> {
    SchemaBuilder::new("doc-root")
        .add(
            SchemaNode::new("doc-root")
                .factory(pass_through)
                .child("module")
                .child("owner")
                .child("info"),
        )
        .add(
            SchemaNode::new("module")
                .allow(["name"])
                .factory(module_factory)
                .child("class")
                .child("type")
                .child("info"),
        )
        .add(
            SchemaNode::new("class")
                .allow(["name", "abstract", "super"])
                .factory(class_factory)
                .child("prop")
                .child("override")
                .child("hide")
                .child("contained")
                .child("dependency")
                .child("named")
                .child("info"),
        )
        .add(
            SchemaNode::new("type")
                .allow(["name", "super"])
                .factory(type_factory)
                .child("const")
                .child("validator")
                .child("info"),
        )
        .add(
            SchemaNode::new("prop")
                .allow(["name", "type", "group"])
                .factory(prop_define_factory)
                .child("const")
                .child("validator")
                .child("info"),
        )
        .add(
            SchemaNode::new("override")
                .allow(["name", "group"])
                .factory(prop_override_factory)
                .child("const")
                .child("validator")
                .child("info"),
        )
        .add(
            SchemaNode::new("hide")
                .allow(["name"])
                .factory(prop_hide_factory),
        )
        .add(
            SchemaNode::new("const")
                .allow(["name", "action", "value", "target"])
                .factory(const_factory)
                .child("info"),
        )
        .add(
            SchemaNode::new("validator")
                .allow(["name", "action"])
                .factory(validator_factory)
                .child("range")
                .child("content")
                .child("info"),
        )
        .add(
            SchemaNode::new("range")
                .allow(["name", "min", "max"])
                .factory(range_factory),
        )
        .add(
            SchemaNode::new("content")
                .allow(["name", "match"])
                .factory(content_factory),
        )
        .add(
            SchemaNode::new("contained")
                .factory(pass_through)
                .child("parent"),
        )
        .add(
            SchemaNode::new("parent")
                .allow(["class"])
                .factory(parent_factory),
        )
        .add(
            SchemaNode::new("dependency")
                .allow(["name", "cardinality"])
                .factory(dependency_factory)
                .on_end(dependency_end)
                .child("to")
                .child("info"),
        )
        .add(
            SchemaNode::new("to")
                .allow(["class", "cardinality"])
                .factory(to_factory),
        )
        .add(
            SchemaNode::new("named")
                .factory(pass_through)
                .child_as("rule", "named-rule"),
        )
        .add(
            SchemaNode::new("named-rule")
                .allow(["name"])
                .factory(name_rule_factory)
                .child("component"),
        )
        .add(
            SchemaNode::new("component")
                .allow(["name", "prefix", "prop"])
                .factory(component_factory),
        )
        .add(
            SchemaNode::new("owner")
                .allow(["name"])
                .factory(owner_factory)
                .child_as("rule", "owner-rule"),
        )
        // The owner rule carries no factory of its own; it delegates to
        // the shared matching-rule node.
        .add(SchemaNode::new("owner-rule").uses("match-rule"))
        .add(
            SchemaNode::new("match-rule")
                .allow(["module", "class"])
                .factory(match_rule_factory),
        )
        // Free-form annotations, arbitrarily nested.
        .add(SchemaNode::new("info").factory(pass_through).recursive())
        .build()
}
