//! Structural rule integration tests.
//!
//! Containment dual views with lazy abstract expansion, naming-rule
//! lookup per containing class, and ownership matching.

use modl_tests::prelude::*;

const MODEL: &str = r#"
module<dc> {
    type<primitive>
    type<string;super=dc/primitive>

    class<Enclosure;abstract>
    class<Rack;super=dc/Enclosure>
    class<Chassis;super=dc/Enclosure>

    class<Blade> {
        prop<name;type=dc/string>
        prop<slot;type=dc/string>
        contained {
            parent<class=dc/Enclosure>
        }
        named {
            rule<dc/Rack> {
                component<main;prefix=blade-;prop=slot>
            }
            rule<any> {
                component<main;prop=name>
            }
        }
    }
}

module<ops> {
    class<Dashboard> {
        contained {
            parent<class=dc/Rack>
        }
    }
}

owner<facilities> {
    rule[module=dc;class=*]
}
owner<fleet> {
    rule[module=*;class=Dashboard]
    rule[module=dc;class=Blade]
}
"#;

fn scenario() -> Fixture {
    Fixture::new("structure").load("model.modl", MODEL)
}

mod containment {
    use super::*;

    #[test]
    fn both_views_exist_for_every_rule() {
        let ctx = scenario().compile().unwrap();

        let contained = ctx.contained.require("dc/Blade").unwrap();
        let container = ctx.containers.require("dc/Enclosure").unwrap();
        assert!(contained.has_parent("dc/Enclosure"));
        assert!(container.has_child("dc/Blade"));
    }

    #[test]
    fn an_abstract_parent_expands_to_its_concrete_descendants_at_read_time() {
        let ctx = scenario().compile().unwrap();
        let contained = ctx.contained.require("dc/Blade").unwrap();

        // The rule table keeps the abstract endpoint; expansion happens
        // here, against the finished hierarchy.
        assert_eq!(contained.parent_names(), vec!["dc/Enclosure".to_string()]);
        let concrete = contained.concrete_parents(&ctx).unwrap();
        let names: Vec<&str> = concrete.iter().map(|c| c.gname()).collect();
        assert_eq!(names, vec!["dc/Chassis", "dc/Rack"]);
    }

    #[test]
    fn a_container_accumulates_children_across_modules() {
        let ctx = scenario().compile().unwrap();

        let rack = ctx.containers.require("dc/Rack").unwrap();
        assert!(rack.has_child("ops/Dashboard"));
    }
}

mod naming {
    use super::*;

    #[test]
    fn the_rule_for_a_specific_container_wins_over_the_wildcard() {
        let ctx = scenario().compile().unwrap();
        let namer = ctx.namers.require("dc/Blade").unwrap();
        let rack = ctx.classes.require("dc/Rack").unwrap();

        let rule = namer.find_name_rule(&ctx, Some(&rack)).unwrap().unwrap();
        assert_eq!(rule.key(), "dc/Rack");

        let components = rule.components();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].prefix.as_deref(), Some("blade-"));
        assert_eq!(components[0].prop.as_deref(), Some("slot"));
    }

    #[test]
    fn an_unkeyed_container_falls_back_to_the_wildcard_rule() {
        let ctx = scenario().compile().unwrap();
        let namer = ctx.namers.require("dc/Blade").unwrap();
        let chassis = ctx.classes.require("dc/Chassis").unwrap();

        let rule = namer.find_name_rule(&ctx, Some(&chassis)).unwrap().unwrap();
        assert_eq!(rule.key(), ANY);
        assert_eq!(rule.components()[0].prop.as_deref(), Some("name"));
    }

    #[test]
    fn a_container_subclass_matches_through_its_chain() {
        // A rule keyed by an ancestor applies to containing subclasses.
        let ctx = Fixture::new("chainkey")
            .load(
                "model.modl",
                r#"
module<dc> {
    type<primitive>
    type<string;super=dc/primitive>
    class<Enclosure;abstract>
    class<Rack;super=dc/Enclosure>
    class<Blade> {
        prop<name;type=dc/string>
        named {
            rule<dc/Enclosure> {
                component<main;prop=name>
            }
        }
    }
}
"#,
            )
            .compile()
            .unwrap();

        let namer = ctx.namers.require("dc/Blade").unwrap();
        let rack = ctx.classes.require("dc/Rack").unwrap();
        let rule = namer.find_name_rule(&ctx, Some(&rack)).unwrap().unwrap();
        assert_eq!(rule.key(), "dc/Enclosure");
    }

    #[test]
    fn a_component_naming_an_unknown_property_fails_validation() {
        let err = Fixture::new("badcomponent")
            .load(
                "model.modl",
                r#"
module<dc> {
    class<Blade> {
        named {
            rule<any> {
                component<main;prop=ghost>
            }
        }
    }
}
"#,
            )
            .compile()
            .unwrap_err();

        assert!(err.to_string().contains("ghost"));
    }
}

mod ownership {
    use super::*;

    #[test]
    fn wildcard_rules_match_whole_modules() {
        let ctx = scenario().compile().unwrap();
        let facilities = ctx.owners.require("facilities").unwrap();

        let classes = facilities.classes(&ctx);
        let names: Vec<&str> = classes.iter().map(|c| c.gname()).collect();
        assert_eq!(
            names,
            vec!["dc/Blade", "dc/Chassis", "dc/Enclosure", "dc/Rack"]
        );
    }

    #[test]
    fn an_owner_unions_all_of_its_rules() {
        let ctx = scenario().compile().unwrap();
        let fleet = ctx.owners.require("fleet").unwrap();

        let classes = fleet.classes(&ctx);
        assert!(classes.iter().any(|c| c.gname() == "ops/Dashboard"));
        assert!(classes.iter().any(|c| c.gname() == "dc/Blade"));
    }

    #[test]
    fn every_matched_class_is_tagged_with_its_owners() {
        let ctx = scenario().compile().unwrap();

        // Blade is claimed by both; both tags stick.
        let blade = ctx.classes.require("dc/Blade").unwrap();
        let owners = blade.owners();
        assert!(owners.iter().any(|o| o == "facilities"));
        assert!(owners.iter().any(|o| o == "fleet"));

        let dashboard = ctx.classes.require("ops/Dashboard").unwrap();
        assert_eq!(dashboard.owners(), vec!["fleet".to_string()]);
    }
}
