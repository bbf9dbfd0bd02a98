//! Pipeline integration tests.
//!
//! Stage ordering, parallel fan-out and barrier behavior over real
//! multi-file source trees.

use modl_tests::prelude::*;

const SETUP: &str = r#"
module<net> {
    type<primitive>
    type<string;super=net/primitive>
    class<Node;abstract> {
        prop<name;type=net/string>
    }
}
"#;

mod fan_out {
    use super::*;

    fn scenario() -> Fixture {
        let mut fixture = Fixture::new("fanout").pre("setup.modl", SETUP);
        for index in 0..40 {
            fixture = fixture.load(
                format!("device{index:02}.modl"),
                format!("module<net> {{ class<Device{index:02};super=net/Node> }}\n"),
            );
        }
        fixture.post(
            "owners.modl",
            "owner<netops> { rule[module=net;class=*] }\n",
        )
    }

    #[test]
    fn forty_parallel_files_all_land_in_the_model() {
        let ctx = scenario().compile().unwrap();

        assert_eq!(ctx.classes.len(), 41);
        for index in 0..40 {
            let device = ctx.classes.require(&format!("net/Device{index:02}")).unwrap();
            assert!(device.derives_from(&ctx, "net/Node").unwrap());
        }
    }

    #[test]
    fn post_stage_owners_see_every_load_stage_class() {
        let ctx = scenario().compile().unwrap();

        for index in 0..40 {
            let device = ctx.classes.require(&format!("net/Device{index:02}")).unwrap();
            assert!(device.owners().iter().any(|o| o == "netops"));
        }
    }
}

mod ordering {
    use super::*;

    #[test]
    fn load_stage_files_resolve_regardless_of_file_order() {
        // GIVEN a subclass that sorts before the file defining its superclass
        let ctx = Fixture::new("ordering")
            .pre("setup.modl", SETUP)
            .load(
                "a_leaf.modl",
                "module<net> { class<Port;super=net/Card> }\n",
            )
            .load(
                "z_branch.modl",
                "module<net> { class<Card;super=net/Node> }\n",
            )
            .compile()
            .unwrap();

        // THEN the reference resolves after the stage barrier
        let port = ctx.classes.require("net/Port").unwrap();
        assert!(port.derives_from(&ctx, "net/Node").unwrap());
    }

    #[test]
    fn many_files_contribute_to_the_same_module() {
        // Module creation is idempotent; every file's classes land in it.
        let ctx = Fixture::new("merge")
            .pre("setup.modl", SETUP)
            .load(
                "one.modl",
                "module<net> { class<Switch;super=net/Node> { prop<ports;type=net/string> } }\n",
            )
            .load(
                "two.modl",
                "module<net> { class<Router;super=net/Node> { prop<vendor;type=net/string> } }\n",
            )
            .compile()
            .unwrap();

        let module = ctx.modules.require("net").unwrap();
        let classes = module.class_names();
        assert!(classes.iter().any(|c| c == "net/Switch"));
        assert!(classes.iter().any(|c| c == "net/Router"));
    }

    #[test]
    fn defining_the_same_class_twice_is_fatal() {
        let err = Fixture::new("dup")
            .pre("setup.modl", SETUP)
            .load("one.modl", "module<net> { class<Switch;super=net/Node> }\n")
            .load("two.modl", "module<net> { class<Switch;super=net/Node> }\n")
            .compile()
            .unwrap_err();

        assert!(err.to_string().contains("duplicate global name"));
    }
}

mod failures {
    use super::*;

    #[test]
    fn a_malformed_file_names_itself_in_the_diagnostic() {
        let err = Fixture::new("broken")
            .pre("setup.modl", SETUP)
            .load("broken.modl", "module<net> { class<Oops>\n")
            .compile()
            .unwrap_err();

        assert!(err.to_string().contains("broken.modl"));
    }

    #[test]
    fn an_unknown_construct_is_fatal() {
        let err = Fixture::new("unknown")
            .pre("setup.modl", SETUP)
            .load("bad.modl", "module<net> { gadget<X> }\n")
            .compile()
            .unwrap_err();

        assert!(err.to_string().contains("unknown node 'gadget'"));
    }

    #[test]
    fn a_dangling_superclass_fails_final_validation() {
        let err = Fixture::new("dangling")
            .pre("setup.modl", SETUP)
            .load("orphan.modl", "module<net> { class<Orphan;super=net/Ghost> }\n")
            .compile()
            .unwrap_err();

        assert!(err.to_string().contains("net/Ghost"));
    }
}
