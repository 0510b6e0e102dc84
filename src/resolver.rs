//! Safe navigation over untyped WHOIS documents.
//!
//! Providers disagree on key names and shapes, so every lookup here treats a
//! missing or wrong-typed node as empty instead of failing.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

static EMPTY: Lazy<Map<String, Value>> = Lazy::new(Map::new);

/// Contact roles exposed in [`crate::ContactInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactRole {
    Registrant,
    Technical,
    Administrative,
}

impl ContactRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactRole::Registrant => "registrant",
            ContactRole::Technical => "technical",
            ContactRole::Administrative => "administrative",
        }
    }

    /// Top-level keys some providers use instead of `contacts.<role>`.
    fn alternate_keys(&self) -> &'static [&'static str] {
        match self {
            ContactRole::Registrant => &["registrant", "owner"],
            ContactRole::Technical => &["technical", "technicalContact", "tech"],
            ContactRole::Administrative => &["administrative", "administrativeContact", "admin"],
        }
    }
}

/// Empty mapping for defaults that must outlive the document.
pub fn empty() -> &'static Map<String, Value> {
    &EMPTY
}

/// Child mapping under `key`, or an empty mapping.
pub fn object<'a>(value: &'a Value, key: &str) -> &'a Map<String, Value> {
    value.get(key).and_then(Value::as_object).unwrap_or_else(|| empty())
}

/// Child mapping under `key` of a mapping, or an empty mapping.
pub fn child<'a>(map: &'a Map<String, Value>, key: &str) -> &'a Map<String, Value> {
    map.get(key).and_then(Value::as_object).unwrap_or_else(|| empty())
}

/// String value under `key`. Non-string values count as absent.
pub fn text<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// First candidate that is present and not empty, in caller order.
pub fn first_non_empty<'a, I>(values: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values.into_iter().flatten().find(|v| !v.is_empty())
}

/// Locate the contact block for `role`.
///
/// `contacts.<role>` wins when it is a mapping. Otherwise each alternate key is
/// probed on the registry mapping, then the record mapping. Falls back to an
/// empty mapping.
pub fn pick_contact<'a>(
    contacts: &'a Map<String, Value>,
    registry: &'a Map<String, Value>,
    record: &'a Map<String, Value>,
    role: ContactRole,
) -> &'a Map<String, Value> {
    if let Some(contact) = contacts.get(role.as_str()).and_then(Value::as_object) {
        return contact;
    }

    role.alternate_keys()
        .iter()
        .flat_map(|key| [registry.get(*key), record.get(*key)])
        .flatten()
        .filter_map(Value::as_object)
        .find(|contact| !contact.is_empty())
        .unwrap_or_else(|| empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_first_non_empty_respects_order() {
        assert_eq!(first_non_empty([Some(""), None, Some("b"), Some("c")]), Some("b"));
        assert_eq!(first_non_empty([Some("a"), Some("b")]), Some("a"));
        assert_eq!(first_non_empty([None, Some("")]), None);
        assert_eq!(first_non_empty(Vec::<Option<&str>>::new()), None);
    }

    #[test]
    fn test_navigation_tolerates_wrong_shapes() {
        let doc = json!({"WhoisRecord": {"registryData": "oops", "domainName": 42}});
        let record = object(&doc, "WhoisRecord");
        assert!(child(record, "registryData").is_empty());
        assert_eq!(text(record, "domainName"), None);
        assert!(object(&json!([1, 2]), "WhoisRecord").is_empty());
        assert!(object(&Value::Null, "WhoisRecord").is_empty());
    }

    #[test]
    fn test_pick_contact_prefers_contacts_block() {
        let contacts = map(json!({"technical": {"name": "From Contacts"}}));
        let registry = map(json!({"technicalContact": {"name": "From Registry"}}));
        let record = Map::new();

        let picked = pick_contact(&contacts, &registry, &record, ContactRole::Technical);
        assert_eq!(text(picked, "name"), Some("From Contacts"));
    }

    #[test]
    fn test_pick_contact_probes_registry_before_record() {
        let contacts = Map::new();
        let registry = map(json!({"admin": {"name": "Registry Admin"}}));
        let record = map(json!({"administrativeContact": {"name": "Record Admin"}}));

        // administrativeContact precedes admin in the alternate key order
        let picked = pick_contact(&contacts, &registry, &record, ContactRole::Administrative);
        assert_eq!(text(picked, "name"), Some("Record Admin"));

        let record = Map::new();
        let picked = pick_contact(&contacts, &registry, &record, ContactRole::Administrative);
        assert_eq!(text(picked, "name"), Some("Registry Admin"));
    }

    #[test]
    fn test_pick_contact_skips_non_mappings() {
        let contacts = map(json!({"registrant": ["not", "a", "map"]}));
        let registry = map(json!({"registrant": "REDACTED"}));
        let record = map(json!({"owner": {"organization": "Owner Org"}}));

        let picked = pick_contact(&contacts, &registry, &record, ContactRole::Registrant);
        assert_eq!(text(picked, "organization"), Some("Owner Org"));
    }

    #[test]
    fn test_pick_contact_defaults_to_empty() {
        let empty_map = Map::new();
        let picked = pick_contact(&empty_map, &empty_map, &empty_map, ContactRole::Technical);
        assert!(picked.is_empty());
    }
}
