//! Whole-model validation, run once after the final stage drains.

use crate::{ModelCtx, PropAction};
use modl_core::{ModlResult, ANY};
use tracing::{debug, warn};

/// Checks every deferred invariant the parse stages could not: superclass
/// chains resolve without cycles, DEFINE properties carry resolvable
/// types, OVERRIDE/HIDE properties have a base, containment and
/// relationship endpoints and naming references resolve.
pub fn validate(ctx: &ModelCtx) -> ModlResult<()> {
    debug!(
        classes = ctx.classes.len(),
        types = ctx.types.len(),
        props = ctx.props.len(),
        "validating model"
    );

    for class in ctx.classes.values() {
        class.chain(ctx)?;
    }
    for mtype in ctx.types.values() {
        mtype.chain(ctx)?;
    }

    for prop in ctx.props.values() {
        match prop.action() {
            PropAction::Define => {
                if prop.type_name().is_none() {
                    return Err(prop.fatal(
                        "validation",
                        "DEFINE property carries no type",
                    ));
                }
                prop.declared_type(ctx)?;
            }
            PropAction::Override | PropAction::Hide => {
                if prop.type_name().is_some() {
                    return Err(prop.fatal(
                        "validation",
                        format!("{} property may not carry a type", prop.action().name()),
                    ));
                }
                prop.base(ctx)?;
            }
        }
    }

    for contained in ctx.contained.values() {
        ctx.classes.require(contained.class_gname())?;
        for parent in contained.parent_names() {
            ctx.classes.require(&parent)?;
        }
    }
    for container in ctx.containers.values() {
        ctx.classes.require(container.class_gname())?;
        for child in container.child_names() {
            ctx.classes.require(&child)?;
        }
    }

    for relator in ctx.relators.values() {
        ctx.classes.require(relator.class_gname())?;
        for relationship in relator.relationships() {
            ctx.classes.require(relationship.target())?;
        }
    }
    for related in ctx.related.values() {
        ctx.classes.require(related.class_gname())?;
        for source in related.source_names() {
            ctx.classes.require(&source)?;
        }
    }

    for namer in ctx.namers.values() {
        let class = ctx.classes.require(namer.class_gname())?;
        for rule in namer.rules() {
            if rule.key() != ANY {
                ctx.classes.require(rule.key())?;
            }
            for component in rule.components() {
                if let Some(prop_name) = &component.prop {
                    if class.find_prop(ctx, prop_name)?.is_none() {
                        return Err(class.fatal(
                            "naming validation",
                            format!(
                                "naming property '{}' of rule '{}' does not resolve",
                                prop_name,
                                rule.key()
                            ),
                        ));
                    }
                }
            }
        }
    }

    for owner in ctx.owners.values() {
        if owner.classes(ctx).is_empty() {
            warn!(owner = owner.name(), "owner matches no classes");
        }
    }

    Ok(())
}
