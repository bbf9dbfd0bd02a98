//! Per-construct factories for the modeling dialect.
//!
//! Each factory turns one document node into a create-or-augment action on
//! the model context. Factories run during the parallel LOAD stage, so
//! everything here is get-or-create or insert-new; no factory mutates an
//! entity another file may be mutating, beyond merge-only adds.

use modl_core::{ModlResult, ANY, NAME, WILDCARD};
use modl_model::{
    add_relationship, add_rule, Cardinality, ConstAction, ContentConstraint, DependencyDecl,
    EntityRef, Holder, MClass, MModule, MProp, MType, ModelCtx, NameComponent, Namer, Owner,
    OwnerRule, PropAction, RangeConstraint, ValidatorAction,
};
use modl_parser::DocNode;
use modl_schema::Directive;
use tracing::debug;

type FactoryResult = ModlResult<(Directive, Option<EntityRef>)>;

/// Grouping constructs contribute no entity; the parent flows through.
pub fn pass_through(
    _ctx: &ModelCtx,
    _node: &DocNode,
    _parent: Option<&EntityRef>,
) -> FactoryResult {
    Ok((Directive::Continue, None))
}

fn require_parent<'a>(
    node: &DocNode,
    parent: Option<&'a EntityRef>,
    operation: &str,
) -> ModlResult<&'a EntityRef> {
    parent.ok_or_else(|| node.fatal(operation, "construct requires an enclosing entity"))
}

pub fn module_factory(ctx: &ModelCtx, node: &DocNode, _parent: Option<&EntityRef>) -> FactoryResult {
    let name = node.require_named_value(NAME)?;
    let module = ctx.modules.get_or_create(name, || MModule::new(name));
    Ok((Directive::Continue, Some(EntityRef::Module(module))))
}

pub fn class_factory(ctx: &ModelCtx, node: &DocNode, parent: Option<&EntityRef>) -> FactoryResult {
    let module = require_parent(node, parent, "class definition")?
        .expect_module("class definition")?;
    let name = node.require_named_value(NAME)?;
    let concrete = !node.flag("abstract");

    let class = MClass::new(module.name(), name, concrete, node.origin().clone());
    let class_gname = class.gname().to_string();
    let class = ctx.classes.insert_new(&class_gname, class)?;
    module.add_class(class.gname());
    if let Some(super_gname) = node.named_value("super") {
        class.set_super(ctx, super_gname)?;
    }
    Ok((Directive::Continue, Some(EntityRef::Class(class))))
}

pub fn type_factory(ctx: &ModelCtx, node: &DocNode, parent: Option<&EntityRef>) -> FactoryResult {
    let module = require_parent(node, parent, "type definition")?
        .expect_module("type definition")?;
    let name = node.require_named_value(NAME)?;

    let mtype = MType::new(module.name(), name, node.origin().clone());
    let mtype_gname = mtype.gname().to_string();
    let mtype = ctx.types.insert_new(&mtype_gname, mtype)?;
    module.add_type(mtype.gname());
    if let Some(super_gname) = node.named_value("super") {
        mtype.set_super(super_gname)?;
    }
    Ok((Directive::Continue, Some(EntityRef::Type(mtype))))
}

fn define_prop(
    ctx: &ModelCtx,
    node: &DocNode,
    parent: Option<&EntityRef>,
    action: PropAction,
) -> FactoryResult {
    let operation = format!("{} property", action.name());
    let class = require_parent(node, parent, &operation)?.expect_class(&operation)?;
    let name = node.require_named_value(NAME)?;
    let group = node.named_value("group").map(str::to_string);

    let prop = MProp::new(class.gname(), name, action, group, node.origin().clone());
    let prop_gname = prop.gname().to_string();
    let prop = ctx.props.insert_new(&prop_gname, prop)?;
    if let Some(type_gname) = node.named_value("type") {
        prop.set_type(type_gname)?;
    }
    class.add_prop(prop.clone())?;
    Ok((Directive::Continue, Some(EntityRef::Prop(prop))))
}

pub fn prop_define_factory(
    ctx: &ModelCtx,
    node: &DocNode,
    parent: Option<&EntityRef>,
) -> FactoryResult {
    define_prop(ctx, node, parent, PropAction::Define)
}

pub fn prop_override_factory(
    ctx: &ModelCtx,
    node: &DocNode,
    parent: Option<&EntityRef>,
) -> FactoryResult {
    define_prop(ctx, node, parent, PropAction::Override)
}

pub fn prop_hide_factory(
    ctx: &ModelCtx,
    node: &DocNode,
    parent: Option<&EntityRef>,
) -> FactoryResult {
    define_prop(ctx, node, parent, PropAction::Hide)
}

/// Splits a const/validator parent into its holder key and the node it
/// hangs off.
enum AttachTo {
    Prop(std::sync::Arc<MProp>),
    Type(std::sync::Arc<MType>),
}

fn attach_target(node: &DocNode, parent: Option<&EntityRef>, operation: &str) -> ModlResult<AttachTo> {
    match require_parent(node, parent, operation)? {
        EntityRef::Prop(p) => Ok(AttachTo::Prop(p.clone())),
        EntityRef::Type(t) => Ok(AttachTo::Type(t.clone())),
        other => Err(node.fatal(
            operation,
            format!("expected a property or type parent, found {}", other.kind()),
        )),
    }
}

pub fn const_factory(ctx: &ModelCtx, node: &DocNode, parent: Option<&EntityRef>) -> FactoryResult {
    let target = attach_target(node, parent, "constant definition")?;
    let name = node.require_named_value(NAME)?;

    let action_text = node.named_value("action").unwrap_or("value");
    let action = ConstAction::parse(action_text).ok_or_else(|| {
        node.fatal(
            "constant definition",
            format!("unknown action '{}'", action_text),
        )
    })?;
    if node.named_value("action").is_none() {
        debug!(node = node.path(), "constant action defaults to 'value'");
    }
    let value = node.named_value("value").map(str::to_string);
    let indirection = node.named_value("target").map(str::to_string);

    let constant = match target {
        AttachTo::Prop(p) => p.consts().define(
            ctx,
            Holder::Prop(p.gname().to_string()),
            name,
            action,
            value,
            indirection,
            node.origin().clone(),
        )?,
        AttachTo::Type(t) => t.consts().define(
            ctx,
            Holder::Type(t.gname().to_string()),
            name,
            action,
            value,
            indirection,
            node.origin().clone(),
        )?,
    };
    Ok((Directive::Continue, Some(EntityRef::Const(constant))))
}

pub fn validator_factory(
    ctx: &ModelCtx,
    node: &DocNode,
    parent: Option<&EntityRef>,
) -> FactoryResult {
    let target = attach_target(node, parent, "validator definition")?;
    let name = node.require_named_value(NAME)?;

    let action_text = node.named_value("action").unwrap_or("add");
    let action = ValidatorAction::parse(action_text).ok_or_else(|| {
        node.fatal(
            "validator definition",
            format!("unknown action '{}'", action_text),
        )
    })?;

    let validator = match target {
        AttachTo::Prop(p) => p.validators().define(
            ctx,
            Holder::Prop(p.gname().to_string()),
            name,
            action,
            node.origin().clone(),
        )?,
        AttachTo::Type(t) => t.validators().define(
            ctx,
            Holder::Type(t.gname().to_string()),
            name,
            action,
            node.origin().clone(),
        )?,
    };
    Ok((Directive::Continue, Some(EntityRef::Validator(validator))))
}

pub fn range_factory(ctx: &ModelCtx, node: &DocNode, parent: Option<&EntityRef>) -> FactoryResult {
    let _ = ctx;
    let validator = require_parent(node, parent, "range constraint")?
        .expect_validator("range constraint")?;
    let name = node.require_named_value(NAME)?;

    validator.add_range(RangeConstraint {
        name: name.to_string(),
        min: node.named_value("min").map(str::to_string),
        max: node.named_value("max").map(str::to_string),
    })?;
    Ok((Directive::Continue, None))
}

pub fn content_factory(ctx: &ModelCtx, node: &DocNode, parent: Option<&EntityRef>) -> FactoryResult {
    let _ = ctx;
    let validator = require_parent(node, parent, "content constraint")?
        .expect_validator("content constraint")?;
    let name = node.require_named_value(NAME)?;
    let pattern = node.require_named_value("match")?;

    let subject = format!("mvalidator[{}]", validator.gname());
    validator.add_content(ContentConstraint::new(&subject, name, pattern)?)?;
    Ok((Directive::Continue, None))
}

/// `parent<class=G>` under `class C { contained { ... } }`: C may live
/// inside G. Registers both containment views.
pub fn parent_factory(ctx: &ModelCtx, node: &DocNode, parent: Option<&EntityRef>) -> FactoryResult {
    let class = require_parent(node, parent, "containment rule")?
        .expect_class("containment rule")?;
    let container = node.require_named_value("class")?;

    add_rule(ctx, container, class.gname());
    Ok((Directive::Continue, None))
}

fn parse_cardinality(node: &DocNode, operation: &str, dflt: Cardinality) -> ModlResult<Cardinality> {
    match node.named_value("cardinality") {
        Some(text) => Cardinality::parse(text).ok_or_else(|| {
            node.fatal(
                operation,
                format!("unknown cardinality '{}', legal set: [single, many]", text),
            )
        }),
        None => {
            debug!(
                node = node.path(),
                "cardinality defaults to '{}'",
                dflt.name()
            );
            Ok(dflt)
        }
    }
}

/// `dependency<name;cardinality=..>` under a class: opens a named
/// relationship of the enclosing class. Each `to` child binds one target.
pub fn dependency_factory(
    ctx: &ModelCtx,
    node: &DocNode,
    parent: Option<&EntityRef>,
) -> FactoryResult {
    let _ = ctx;
    let class = require_parent(node, parent, "relationship declaration")?
        .expect_class("relationship declaration")?;
    let name = node.require_named_value(NAME)?;
    let cardinality = parse_cardinality(node, "relationship declaration", Cardinality::Single)?;

    let decl = DependencyDecl::new(class.gname(), name, cardinality);
    Ok((
        Directive::Continue,
        Some(EntityRef::Dependency(std::sync::Arc::new(decl))),
    ))
}

/// Runs after a dependency's children: a declaration that bound no
/// target is dangling.
pub fn dependency_end(ctx: &ModelCtx, node: &DocNode, entity: Option<&EntityRef>) -> ModlResult<()> {
    let decl = entity
        .ok_or_else(|| node.fatal("relationship close", "construct requires an enclosing entity"))?
        .expect_dependency("relationship close")?;
    let bound = ctx
        .relators
        .get(decl.source())
        .map(|relator| relator.has_relationship_named(decl.name()))
        .unwrap_or(false);
    if !bound {
        return Err(node.fatal(
            "relationship close",
            format!("relationship '{}' declares no target", decl.name()),
        ));
    }
    Ok(())
}

/// `to<class=G;cardinality=..>` under `dependency`: registers the
/// relationship in both the relator and related views.
pub fn to_factory(ctx: &ModelCtx, node: &DocNode, parent: Option<&EntityRef>) -> FactoryResult {
    let decl = require_parent(node, parent, "relationship target")?
        .expect_dependency("relationship target")?;
    let target = node.require_named_value("class")?;
    let target_cardinality = parse_cardinality(node, "relationship target", Cardinality::Many)?;

    add_relationship(
        ctx,
        decl.source(),
        decl.name(),
        decl.cardinality(),
        target,
        target_cardinality,
        node.origin().clone(),
    )?;
    Ok((Directive::Continue, None))
}

/// `rule<containing-or-any>` under `named`: one naming rule of the
/// enclosing class, keyed by the containing class (or `any`).
pub fn name_rule_factory(
    ctx: &ModelCtx,
    node: &DocNode,
    parent: Option<&EntityRef>,
) -> FactoryResult {
    let class = require_parent(node, parent, "naming rule")?.expect_class("naming rule")?;
    let key = node.named_value(NAME).unwrap_or(ANY);

    let namer = ctx
        .namers
        .get_or_create(class.gname(), || Namer::new(class.gname()));
    let rule = namer.get_or_create_rule(key);
    Ok((Directive::Continue, Some(EntityRef::NameRule(rule))))
}

pub fn component_factory(
    ctx: &ModelCtx,
    node: &DocNode,
    parent: Option<&EntityRef>,
) -> FactoryResult {
    let _ = ctx;
    let rule = require_parent(node, parent, "naming component")?
        .expect_name_rule("naming component")?;

    rule.add_component(NameComponent {
        prefix: node.named_value("prefix").map(str::to_string),
        prop: node.named_value("prop").map(str::to_string),
    });
    Ok((Directive::Continue, None))
}

pub fn owner_factory(ctx: &ModelCtx, node: &DocNode, _parent: Option<&EntityRef>) -> FactoryResult {
    let name = node.require_named_value(NAME)?;
    let owner = ctx.owners.get_or_create(name, || Owner::new(name));
    Ok((Directive::Continue, Some(EntityRef::Owner(owner))))
}

/// Shared matching-rule factory; the owner `rule` construct delegates
/// here. An omitted side defaults to the wildcard.
pub fn match_rule_factory(
    ctx: &ModelCtx,
    node: &DocNode,
    parent: Option<&EntityRef>,
) -> FactoryResult {
    let _ = ctx;
    let owner = require_parent(node, parent, "ownership rule")?.expect_owner("ownership rule")?;

    let module = node.named_value("module").unwrap_or(WILDCARD);
    let class = node.named_value("class").unwrap_or(WILDCARD);
    if module == WILDCARD && class == WILDCARD {
        debug!(owner = owner.name(), "ownership rule matches every class");
    }
    owner.add_rule(OwnerRule {
        module: module.to_string(),
        class: class.to_string(),
    });
    Ok((Directive::Continue, None))
}
