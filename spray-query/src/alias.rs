//! Query alias derivation from entity type names.

/// Derive the query alias for an entity type name.
///
/// The namespace is stripped up to the last `::`, `.` or `\` separator, then
/// every ASCII uppercase letter of the remaining simple name is kept, in
/// order, and lowercased. Generic parameters are ignored.
///
/// ```rust
/// use spray_query::alias::entity_alias;
///
/// assert_eq!(entity_alias("SomeNamespace.UserAccount"), "ua");
/// assert_eq!(entity_alias("my_app::model::BlogPost"), "bp");
/// assert_eq!(entity_alias("User"), "u");
/// ```
///
/// A simple name without uppercase letters yields an empty alias; query
/// builders then address the table without one.
pub fn entity_alias(entity_name: &str) -> String {
    let base = entity_name.split('<').next().unwrap_or(entity_name);
    let simple = base.rsplit([':', '.', '\\']).next().unwrap_or(base);

    simple
        .chars()
        .filter(char::is_ascii_uppercase)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_namespace() {
        assert_eq!(entity_alias("App.Model.BlogPost"), "bp");
    }

    #[test]
    fn test_unqualified() {
        assert_eq!(entity_alias("User"), "u");
    }

    #[test]
    fn test_backslash_namespace() {
        assert_eq!(entity_alias("Acme\\Entity\\OrderLineItem"), "oli");
    }

    #[test]
    fn test_rust_path() {
        assert_eq!(entity_alias("crate::entities::UserAccount"), "ua");
    }

    #[test]
    fn test_namespace_capitals_are_ignored() {
        assert_eq!(entity_alias("ACME::Models::Invoice"), "i");
    }

    #[test]
    fn test_generic_parameters_are_ignored() {
        assert_eq!(entity_alias("app::Versioned<app::BlogPost>"), "v");
    }

    #[test]
    fn test_no_uppercase() {
        assert_eq!(entity_alias("app::widget"), "");
    }

    #[test]
    fn test_consecutive_capitals() {
        assert_eq!(entity_alias("HTTPRequestLog"), "httprl");
    }
}
