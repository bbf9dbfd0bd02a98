//! Constant resolution integration tests.
//!
//! Literal values, explicit indirection, the synthesized companion of an
//! EXCLUSIVE constant, and REMOVE tombstones, resolved over property and
//! type chains.

use modl_tests::prelude::*;

const MODEL: &str = r#"
module<app> {
    type<primitive>
    type<status;super=app/primitive> {
        const<init;value=down>
        const<limit;value=10>
    }
    type<hardened;super=app/status> {
        const<limit;action=remove>
    }

    class<Node;abstract> {
        prop<state;type=app/status> {
            const<max;value=3>
        }
    }

    class<Switch;super=app/Node> {
        override<state> {
            const<max;value=5>
            const<boot;action=default;target=init>
            const<grace;action=auto-transition;target=max>
            const<active;action=exclusive;value=on>
        }
    }
}
"#;

fn scenario() -> Fixture {
    Fixture::new("constants").load("model.modl", MODEL)
}

mod indirection {
    use super::*;

    #[test]
    fn explicit_indirection_reaches_the_declared_type_chain() {
        let ctx = scenario().compile().unwrap();

        // boot has no literal; its target lives on the property's type.
        let boot = ctx.consts.require("app/Switch/state/boot").unwrap();
        assert_eq!(boot.action(), ConstAction::Default);
        assert_eq!(boot.find_value(&ctx).unwrap(), Some("down".to_string()));
    }

    #[test]
    fn explicit_indirection_prefers_the_nearest_holder() {
        let ctx = scenario().compile().unwrap();

        // grace targets max; Switch's override redeclares max=5 closer
        // than Node's 3.
        let grace = ctx.consts.require("app/Switch/state/grace").unwrap();
        assert!(grace.action().is_transient());
        assert_eq!(grace.find_value(&ctx).unwrap(), Some("5".to_string()));
    }

    #[test]
    fn a_missing_indirection_target_is_fatal() {
        let ctx = scenario().compile().unwrap();
        let holder = Holder::Prop("app/Switch/state".to_string())
            .resolve(&ctx)
            .unwrap();

        let err = holder
            .consts()
            .define(
                &ctx,
                Holder::Prop("app/Switch/state".to_string()),
                "late",
                ConstAction::Default,
                None,
                Some("nowhere".to_string()),
                modl_core::Origin::synthetic(),
            )
            .unwrap()
            .find_value(&ctx)
            .unwrap_err();

        assert!(err.to_string().contains("indirection target 'nowhere' not found"));
    }
}

mod exclusive {
    use super::*;

    #[test]
    fn an_exclusive_constant_synthesizes_its_companion_default() {
        let ctx = scenario().compile().unwrap();

        let companion = ctx
            .consts
            .require(&format!("app/Switch/state/{DEFAULT_CONST}"))
            .unwrap();
        assert_eq!(companion.action(), ConstAction::Default);
        assert_eq!(companion.target(), Some("active"));
        assert_eq!(companion.find_value(&ctx).unwrap(), Some("on".to_string()));
    }
}

mod tombstones {
    use super::*;

    #[test]
    fn a_removed_constant_is_excluded_from_enumeration() {
        let ctx = scenario().compile().unwrap();
        let holder = Holder::Type("app/hardened".to_string()).resolve(&ctx).unwrap();

        let visible = holder.visible_consts(&ctx).unwrap();
        assert!(!visible.iter().any(|c| c.lname() == "limit"));
        assert!(visible.iter().any(|c| c.lname() == "init"));
    }

    #[test]
    fn a_removed_constant_is_still_reachable_by_direct_lookup() {
        let ctx = scenario().compile().unwrap();
        let hardened = ctx.types.require("app/hardened").unwrap();

        let tombstone = hardened.consts().direct("limit").unwrap();
        assert!(tombstone.is_tombstone());
        assert_eq!(tombstone.find_value(&ctx).unwrap(), None);
    }
}

mod chains {
    use super::*;

    #[test]
    fn a_same_named_constant_resolves_through_the_super_chain() {
        let ctx = scenario().compile().unwrap();

        // Node's max sits above Switch's on the holder chain; Switch's
        // own literal wins for itself.
        let switch_max = ctx.consts.require("app/Switch/state/max").unwrap();
        assert_eq!(switch_max.find_value(&ctx).unwrap(), Some("5".to_string()));

        let node_max = ctx.consts.require("app/Node/state/max").unwrap();
        assert_eq!(node_max.find_value(&ctx).unwrap(), Some("3".to_string()));
    }

    #[test]
    fn nearest_declaration_wins_in_visible_enumeration() {
        let ctx = scenario().compile().unwrap();
        let holder = Holder::Prop("app/Switch/state".to_string())
            .resolve(&ctx)
            .unwrap();

        let visible = holder.visible_consts(&ctx).unwrap();
        let max = visible.iter().find(|c| c.lname() == "max").unwrap();
        assert_eq!(max.gname(), "app/Switch/state/max");
    }
}
