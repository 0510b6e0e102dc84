use crate::{
    dates::estimate_age,
    resolver::{child, empty, first_non_empty, object, pick_contact, text, ContactRole},
    ContactInfo, DomainInfo,
};
use serde_json::{Map, Value};

pub const NOT_AVAILABLE: &str = "N/A";

const HOSTNAMES_MAX_LEN: usize = 25;
const HOSTNAMES_KEEP: usize = 22;

/// Build the domain registration summary from a raw provider document.
pub fn extract_domain_info(doc: &Value) -> DomainInfo {
    let record = object(doc, "WhoisRecord");
    let registry = child(record, "registryData");

    // Registry-level and pre-normalized values are authoritative
    let created = resolve_date(registry, record, "createdDate");
    let expires = resolve_date(registry, record, "expiresDate");

    let registrar = first_non_empty([
        text(registry, "registrarName"),
        text(record, "registrarName"),
    ]);
    let domain_name = first_non_empty([text(record, "domainName")]);

    DomainInfo {
        domain_name: or_na(domain_name),
        registrar: or_na(registrar),
        registration_date: or_na(created),
        expiration_date: or_na(expires),
        estimated_domain_age: estimate_age(created),
        hostnames: display_hostnames(registry),
    }
}

/// Build the contact summary from a raw provider document.
pub fn extract_contact_info(doc: &Value) -> ContactInfo {
    let record = object(doc, "WhoisRecord");
    let registry = child(record, "registryData");

    let contacts = [child(registry, "contacts"), child(record, "contacts")]
        .into_iter()
        .find(|c| !c.is_empty())
        .unwrap_or_else(|| empty());

    let registrant = pick_contact(contacts, registry, record, ContactRole::Registrant);
    let technical = pick_contact(contacts, registry, record, ContactRole::Technical);
    let administrative = pick_contact(contacts, registry, record, ContactRole::Administrative);

    let contact_email = first_non_empty([
        text(record, "contactEmail"),
        text(registry, "contactEmail"),
        text(registrant, "email"),
        text(technical, "email"),
        text(administrative, "email"),
    ]);

    ContactInfo {
        registrant_name: contact_name(registrant),
        technical_contact_name: contact_name(technical),
        administrative_contact_name: contact_name(administrative),
        contact_email: or_na(contact_email),
    }
}

fn resolve_date<'a>(
    registry: &'a Map<String, Value>,
    record: &'a Map<String, Value>,
    field: &str,
) -> Option<&'a str> {
    let normalized = format!("{}Normalized", field);
    first_non_empty([
        text(registry, &normalized),
        text(registry, field),
        text(record, &normalized),
        text(record, field),
    ])
}

fn contact_name(contact: &Map<String, Value>) -> String {
    or_na(first_non_empty([text(contact, "name"), text(contact, "organization")]))
}

fn display_hostnames(registry: &Map<String, Value>) -> String {
    let names: Vec<&str> = child(registry, "nameServers")
        .get("hostNames")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    truncate_hostnames(&names.join(", "))
}

/// Shorten a joined hostname list for display.
pub fn truncate_hostnames(joined: &str) -> String {
    if joined.chars().count() > HOSTNAMES_MAX_LEN {
        let kept: String = joined.chars().take(HOSTNAMES_KEEP).collect();
        format!("{}...", kept)
    } else {
        joined.to_string()
    }
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}
