//! Relationship integration tests.
//!
//! Dependency declarations register under both endpoints: the relator is
//! keyed by the source class, the related by the target class. Abstract
//! endpoints expand to concrete descendants at read time.

use modl_tests::prelude::*;

const MODEL: &str = r#"
module<net> {
    type<primitive>
    type<string;super=net/primitive>

    class<Device;abstract>
    class<Switch;super=net/Device>
    class<Router;super=net/Device>

    class<Port> {
        prop<name;type=net/string>
        dependency<attached;cardinality=single> {
            to<class=net/Device;cardinality=many>
        }
    }
}

module<ops> {
    class<Monitor> {
        dependency<watches> {
            to<class=net/Switch>
            to<class=net/Router>
        }
    }
}
"#;

fn scenario() -> Fixture {
    Fixture::new("relationships").load("model.modl", MODEL)
}

mod dual_views {
    use super::*;

    #[test]
    fn a_dependency_registers_both_endpoints() {
        let ctx = scenario().compile().unwrap();

        let relator = ctx.relators.require("net/Port").unwrap();
        assert!(relator.has_relationship_named("attached"));
        assert_eq!(relator.target_names(), vec!["net/Device".to_string()]);

        let related = ctx.related.require("net/Device").unwrap();
        assert!(related.has_source("net/Port"));
    }

    #[test]
    fn cardinalities_survive_to_the_model() {
        let ctx = scenario().compile().unwrap();

        let relator = ctx.relators.require("net/Port").unwrap();
        let relationships = relator.relationships_to("net/Device");
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].source_cardinality(), Cardinality::Single);
        assert_eq!(relationships[0].target_cardinality(), Cardinality::Many);
    }

    #[test]
    fn one_dependency_may_bind_several_targets() {
        let ctx = scenario().compile().unwrap();

        let relator = ctx.relators.require("ops/Monitor").unwrap();
        assert_eq!(relator.relationships().len(), 2);
        assert!(ctx.related.require("net/Switch").unwrap().has_source("ops/Monitor"));
        assert!(ctx.related.require("net/Router").unwrap().has_source("ops/Monitor"));
    }

    #[test]
    fn an_abstract_target_expands_at_read_time() {
        let ctx = scenario().compile().unwrap();

        let relator = ctx.relators.require("net/Port").unwrap();
        let targets = relator.concrete_targets(&ctx).unwrap();
        let names: Vec<&str> = targets.iter().map(|c| c.gname()).collect();
        assert_eq!(names, vec!["net/Router", "net/Switch"]);
    }
}

mod failures {
    use super::*;

    #[test]
    fn a_dependency_without_a_target_is_fatal() {
        let fixture = Fixture::new("dangling-decl").load(
            "model.modl",
            "module<net> { class<Port> { dependency<orphan> } }",
        );

        let err = fixture.compile().unwrap_err();
        assert!(err.to_string().contains("relationship 'orphan' declares no target"));
    }

    #[test]
    fn a_target_that_never_materializes_fails_validation() {
        let fixture = Fixture::new("dangling-target").load(
            "model.modl",
            "module<net> { class<Port> { dependency<uplink> { to<class=net/Ghost> } } }",
        );

        let err = fixture.compile().unwrap_err();
        assert!(err.to_string().contains("net/Ghost"));
    }

    #[test]
    fn duplicate_targets_under_one_dependency_are_fatal() {
        let fixture = Fixture::new("duplicate-target").load(
            "model.modl",
            "module<net> { class<Switch> class<Port> { dependency<uplink> { \
             to<class=net/Switch> to<class=net/Switch> } } }",
        );

        let err = fixture.compile().unwrap_err();
        assert!(err.to_string().contains("duplicate relationship 'uplink'"));
    }
}
