//! Small helpers shared by the XML readers and writers.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesStart;

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Whether a qualified name carries a namespace prefix.
fn is_prefixed(name: &[u8]) -> bool {
    name.contains(&b':')
}

/// Decode an attribute value, falling back to a lossy conversion.
pub(crate) fn attr_value(attr: &Attribute) -> String {
    attr.unescape_value()
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Find an unprefixed attribute by name.
pub(crate) fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| attr_value(&a))
}

/// Find the relationship id attribute (`r:id`) regardless of its prefix.
pub(crate) fn rel_id(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| is_prefixed(a.key.as_ref()) && local_name(a.key.as_ref()) == b"id")
        .map(|a| attr_value(&a))
}

/// Parse an integer attribute.
pub(crate) fn attr_i64(e: &BytesStart, key: &[u8]) -> Option<i64> {
    attr(e, key).and_then(|v| v.trim().parse().ok())
}

/// Parse an OOXML boolean attribute (`1`, `true`, `on`).
pub(crate) fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr(e, key).map(|v| matches!(v.as_str(), "1" | "true" | "on"))
}

/// The namespace prefix of an element name, if any.
pub(crate) fn prefix(name: &[u8]) -> Option<String> {
    name.iter()
        .position(|&b| b == b':')
        .map(|pos| String::from_utf8_lossy(&name[..pos]).into_owned())
}

/// Escape XML special characters.
pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
