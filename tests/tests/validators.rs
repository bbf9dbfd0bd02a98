//! Validator inheritance integration tests.
//!
//! ADD merge, CLOBBER replacement and REMOVE tombstoning across type and
//! property chains.

use modl_tests::prelude::*;

const MODEL: &str = r#"
module<app> {
    type<primitive>
    type<name;super=app/primitive> {
        validator<shape> {
            range<len;min=1;max=64>
            content<chars;match="[a-z0-9-]+">
        }
    }
    type<hostname;super=app/name> {
        validator<shape> {
            range<len;min=1;max=255>
            range<labels;min=1;max=127>
        }
    }
    type<loose;super=app/name> {
        validator<shape;action=clobber> {
            range<len;min=0>
        }
    }
    type<free;super=app/name> {
        validator<shape;action=remove>
    }

    class<Host;abstract> {
        prop<fqdn;type=app/hostname>
    }
    class<Server;super=app/Host> {
        override<fqdn> {
            validator<shape> {
                range<len;min=4;max=128>
            }
        }
    }
}
"#;

fn scenario() -> Fixture {
    Fixture::new("validators").load("model.modl", MODEL)
}

fn type_holder(ctx: &ModelCtx, gname: &str) -> HolderRef {
    Holder::Type(gname.to_string()).resolve(ctx).unwrap()
}

mod merging {
    use super::*;

    #[test]
    fn add_merges_with_the_inherited_validator_nearest_winning() {
        let ctx = scenario().compile().unwrap();
        let holder = type_holder(&ctx, "app/hostname");

        let shape = holder.effective_validator(&ctx, "shape").unwrap().unwrap();
        // Own len replaces the inherited one; labels is added; the
        // inherited content constraint survives the merge.
        assert_eq!(shape.ranges["len"].max.as_deref(), Some("255"));
        assert!(shape.ranges.contains_key("labels"));
        assert!(shape.contents.contains_key("chars"));
    }

    #[test]
    fn clobber_discards_everything_inherited() {
        let ctx = scenario().compile().unwrap();
        let holder = type_holder(&ctx, "app/loose");

        let shape = holder.effective_validator(&ctx, "shape").unwrap().unwrap();
        assert_eq!(shape.ranges["len"].min.as_deref(), Some("0"));
        assert_eq!(shape.ranges["len"].max, None);
        assert!(shape.contents.is_empty());
    }

    #[test]
    fn remove_tombstones_the_validator_for_the_whole_subtree() {
        let ctx = scenario().compile().unwrap();
        let holder = type_holder(&ctx, "app/free");

        assert!(holder.effective_validator(&ctx, "shape").unwrap().is_none());
        assert!(holder.visible_validators(&ctx).unwrap().is_empty());
    }

    #[test]
    fn an_untouched_subtype_inherits_the_base_validator_unchanged() {
        let ctx = scenario().compile().unwrap();
        let holder = type_holder(&ctx, "app/name");

        let shape = holder.effective_validator(&ctx, "shape").unwrap().unwrap();
        assert_eq!(shape.ranges["len"].max.as_deref(), Some("64"));
    }
}

mod property_chains {
    use super::*;

    #[test]
    fn a_property_validator_merges_over_the_declared_type_chain() {
        let ctx = scenario().compile().unwrap();
        let holder = Holder::Prop("app/Server/fqdn".to_string())
            .resolve(&ctx)
            .unwrap();

        let shape = holder.effective_validator(&ctx, "shape").unwrap().unwrap();
        // The override's own range is nearest; the type chain contributes
        // the rest of the merged view.
        assert_eq!(shape.ranges["len"].min.as_deref(), Some("4"));
        assert_eq!(shape.ranges["len"].max.as_deref(), Some("128"));
        assert!(shape.ranges.contains_key("labels"));
        assert!(shape.contents.contains_key("chars"));
    }
}

mod diagnostics {
    use super::*;

    #[test]
    fn a_malformed_content_pattern_is_rejected_at_declaration() {
        let err = Fixture::new("badpattern")
            .load(
                "model.modl",
                r#"
module<app> {
    type<primitive>
    type<name;super=app/primitive> {
        validator<shape> {
            content<chars;match="[unclosed">
        }
    }
}
"#,
            )
            .compile()
            .unwrap_err();

        assert!(err.to_string().contains("malformed pattern"));
    }

    #[test]
    fn duplicate_constraint_names_within_a_validator_are_fatal() {
        let err = Fixture::new("dupconstraint")
            .load(
                "model.modl",
                r#"
module<app> {
    type<primitive>
    type<name;super=app/primitive> {
        validator<shape> {
            range<len;min=1>
            range<len;min=2>
        }
    }
}
"#,
            )
            .compile()
            .unwrap_err();

        assert!(err.to_string().contains("len"));
    }
}
