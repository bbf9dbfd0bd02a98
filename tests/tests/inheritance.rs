//! Property inheritance integration tests.
//!
//! Override chains, base resolution, group inheritance and hidden
//! properties over a three-level class hierarchy.

use modl_tests::prelude::*;

const MODEL: &str = r#"
module<app> {
    type<primitive>
    type<string;super=app/primitive>
    type<uuid;super=app/string>

    class<Base;abstract> {
        prop<id;type=app/uuid;group=key>
        prop<label;type=app/string>
        prop<scratch;type=app/string>
    }

    class<Middle;super=app/Base> {
        override<id>
        prop<owner;type=app/string>
    }

    class<Leaf;super=app/Middle> {
        override<id;group=alt>
        hide<scratch>
    }
}
"#;

fn scenario() -> Fixture {
    Fixture::new("inheritance").load("model.modl", MODEL)
}

mod base_resolution {
    use super::*;

    #[test]
    fn an_override_finds_its_define_on_the_nearest_defining_ancestor() {
        let ctx = scenario().compile().unwrap();

        let leaf_id = ctx.props.require("app/Leaf/id").unwrap();
        assert_eq!(leaf_id.action(), PropAction::Override);
        assert_eq!(leaf_id.base(&ctx).unwrap().gname(), "app/Base/id");

        let middle_id = ctx.props.require("app/Middle/id").unwrap();
        assert_eq!(middle_id.base(&ctx).unwrap().gname(), "app/Base/id");
    }

    #[test]
    fn get_type_returns_the_declared_type_or_its_primitive_ancestor() {
        let ctx = scenario().compile().unwrap();
        let leaf_id = ctx.props.require("app/Leaf/id").unwrap();

        assert_eq!(leaf_id.get_type(&ctx, false).unwrap().gname(), "app/uuid");
        assert_eq!(
            leaf_id.get_type(&ctx, true).unwrap().gname(),
            "app/primitive"
        );
    }

    #[test]
    fn overridden_walks_intermediate_redefinitions() {
        let ctx = scenario().compile().unwrap();
        let leaf_id = ctx.props.require("app/Leaf/id").unwrap();

        // Nearest redefinition above Leaf is Middle's override.
        let nearest = leaf_id.overridden(&ctx, true).unwrap().unwrap();
        assert_eq!(nearest.gname(), "app/Middle/id");
    }
}

mod groups {
    use super::*;

    #[test]
    fn a_group_is_inherited_from_the_nearest_override_that_sets_one() {
        let ctx = scenario().compile().unwrap();

        // Middle's override sets no group; Base's DEFINE carries "key".
        let middle_id = ctx.props.require("app/Middle/id").unwrap();
        assert_eq!(middle_id.effective_group(&ctx).unwrap(), "key");

        // Leaf's override sets its own.
        let leaf_id = ctx.props.require("app/Leaf/id").unwrap();
        assert_eq!(leaf_id.effective_group(&ctx).unwrap(), "alt");
    }

    #[test]
    fn an_ungrouped_property_falls_back_to_the_default_group() {
        let ctx = scenario().compile().unwrap();

        let label = ctx.props.require("app/Base/label").unwrap();
        assert_eq!(label.effective_group(&ctx).unwrap(), DEFAULT_GROUP);
    }
}

mod hidden {
    use super::*;

    #[test]
    fn resolved_props_collapse_overrides_and_exclude_hidden_ones() {
        let ctx = scenario().compile().unwrap();
        let leaf = ctx.classes.require("app/Leaf").unwrap();

        let resolved = leaf.resolved_props(&ctx).unwrap();
        let names: Vec<&str> = resolved.iter().map(|p| p.lname()).collect();

        // id collapses to Leaf's override; scratch is hidden.
        assert!(!names.contains(&"scratch"));
        assert!(names.contains(&"label"));
        assert!(names.contains(&"owner"));
        let id = resolved.iter().find(|p| p.lname() == "id").unwrap();
        assert_eq!(id.gname(), "app/Leaf/id");
    }

    #[test]
    fn a_hidden_property_is_still_reachable_by_direct_lookup() {
        let ctx = scenario().compile().unwrap();
        let leaf = ctx.classes.require("app/Leaf").unwrap();

        let hidden = leaf.find_prop(&ctx, "scratch").unwrap().unwrap();
        assert_eq!(hidden.action(), PropAction::Hide);
        assert_eq!(hidden.base(&ctx).unwrap().gname(), "app/Base/scratch");
    }

    #[test]
    fn the_hide_does_not_leak_into_sibling_branches() {
        let ctx = scenario().compile().unwrap();

        // Middle never hid scratch; it still resolves there.
        let middle = ctx.classes.require("app/Middle").unwrap();
        let resolved = middle.resolved_props(&ctx).unwrap();
        assert!(resolved.iter().any(|p| p.lname() == "scratch"));
    }
}

mod diagnostics {
    use super::*;

    #[test]
    fn an_override_without_any_define_above_is_fatal() {
        let err = Fixture::new("nobase")
            .load(
                "model.modl",
                r#"
module<app> {
    type<primitive>
    class<Base;abstract>
    class<Leaf;super=app/Base> {
        override<ghost>
    }
}
"#,
            )
            .compile()
            .unwrap_err();

        assert!(err.to_string().contains("no base definition"));
    }
}
