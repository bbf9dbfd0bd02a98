//! The dispatcher: walks a document tree in lockstep with the schema.

use crate::{Directive, Schema, SchemaNode};
use modl_core::ModlResult;
use modl_model::{EntityRef, ModelCtx};
use modl_parser::{DocNode, DOC_ROOT};
use tracing::trace;

/// Control flow bubbling up from a node walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    EndTree,
}

/// Matches one parsed document against the schema, invoking factories
/// top-down and end hooks bottom-up. The synthetic `doc-root` has no
/// construct of its own; its children are matched against the schema
/// root's children.
pub fn dispatch(schema: &Schema, ctx: &ModelCtx, root: &DocNode) -> ModlResult<()> {
    debug_assert_eq!(root.tag(), DOC_ROOT);
    let schema_root = schema.node(schema.root_id())?;
    walk_children(schema, schema_root, ctx, root, None)?;
    Ok(())
}

fn walk_children(
    schema: &Schema,
    snode: &SchemaNode,
    ctx: &ModelCtx,
    dnode: &DocNode,
    entity: Option<&EntityRef>,
) -> ModlResult<Flow> {
    // Sorted-by-tag group order; insertion order within a group.
    for (tag, group) in dnode.child_groups() {
        let child_snode = match snode.child_id(tag) {
            Some(id) => schema.node(id)?,
            None if snode.is_recursive() => snode,
            None => {
                return Err(dnode.fatal(
                    "dispatch",
                    format!(
                        "unknown node '{}', legal children: [{}]",
                        tag,
                        snode.child_tags().join(", ")
                    ),
                ));
            }
        };
        for child in group {
            if walk_node(schema, child_snode, ctx, child, entity)? == Flow::EndTree {
                return Ok(Flow::EndTree);
            }
        }
    }
    Ok(Flow::Continue)
}

fn walk_node(
    schema: &Schema,
    snode: &SchemaNode,
    ctx: &ModelCtx,
    dnode: &DocNode,
    parent_entity: Option<&EntityRef>,
) -> ModlResult<Flow> {
    let effective = schema.effective(snode)?;
    trace!(node = dnode.path(), schema = effective.id(), "dispatch");

    // Recursive nodes take free-form annotations; everything else gets its
    // named values checked against the declared legal set before begin.
    if !effective.is_recursive() {
        for key in dnode.named_keys() {
            if !effective.allowed().contains(key) {
                let allowed: Vec<&str> = effective.allowed().iter().map(String::as_str).collect();
                return Err(dnode.fatal(
                    "dispatch",
                    format!(
                        "illegal named value '{}', legal set: [{}]",
                        key,
                        allowed.join(", ")
                    ),
                ));
            }
        }
    }

    let factory = effective
        .get_factory()
        .expect("effective() guarantees a factory");
    let (directive, entity) = factory(ctx, dnode, parent_entity)?;
    let child_entity = entity.as_ref().or(parent_entity);

    match directive {
        Directive::EndTree => Ok(Flow::EndTree),
        Directive::EndSubtree => Ok(Flow::Continue),
        Directive::Continue => {
            let flow = walk_children(schema, effective, ctx, dnode, child_entity)?;
            if flow == Flow::Continue {
                if let Some(end) = effective.get_end() {
                    end(ctx, dnode, child_entity)?;
                }
            }
            Ok(flow)
        }
    }
}
