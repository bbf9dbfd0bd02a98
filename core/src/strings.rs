//! Shared string constants and helpers.

/// Implicit named-value key carrying a node's name.
pub const NAME: &str = "name";

/// Default property group.
pub const DEFAULT_GROUP: &str = "default";

/// Wildcard naming-rule key: matches any containing class.
pub const ANY: &str = "any";

/// Wildcard for ownership rules: matches any module or class name.
pub const WILDCARD: &str = "*";

/// Reserved local name of the companion DEFAULT constant synthesized for
/// an EXCLUSIVE constant.
pub const DEFAULT_CONST: &str = "default";

/// Separator used to derive global names from ancestry.
pub const GNAME_SEP: char = '/';

/// Joins a parent global name and a local name into a global name.
pub fn global_name(parent: Option<&str>, lname: &str) -> String {
    match parent {
        Some(p) => format!("{}{}{}", p, GNAME_SEP, lname),
        None => lname.to_string(),
    }
}
