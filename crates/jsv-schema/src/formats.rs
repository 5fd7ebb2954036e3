//! # Format Registry — Named `format` Validators
//!
//! Maps a format name to a validator function. A validator receives the
//! instance and the enclosing subschema and returns `None` on success or
//! a failure description. The registry is seeded with the draft-04
//! built-ins and is extensible by the host — registering an existing
//! name (built-ins included) replaces it.
//!
//! Unknown format names are not errors; the engine simply skips them.
//! Built-in validators pass on non-string instances: shape enforcement
//! belongs to the `type` keyword.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

/// A format validator: `None` = pass, `Some(description)` = fail.
pub type FormatValidator = dyn Fn(&Value, &Value) -> Option<String> + Send + Sync;

/// Registry of named format validators.
pub struct FormatRegistry {
    handlers: HashMap<String, Box<FormatValidator>>,
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FormatRegistry").field("formats", &names).finish()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FormatRegistry {
    /// An empty registry with no formats at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry seeded with the draft-04 built-in formats:
    /// `date-time`, `email`, `hostname`, `ipv4`, `ipv6`, `uri`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.add("date-time", format_date_time);
        registry.add("email", format_email);
        registry.add("hostname", format_hostname);
        registry.add("ipv4", format_ipv4);
        registry.add("ipv6", format_ipv6);
        registry.add("uri", format_uri);
        registry
    }

    /// Register or override a named format validator.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        validator: impl Fn(&Value, &Value) -> Option<String> + Send + Sync + 'static,
    ) {
        self.handlers.insert(name.into(), Box::new(validator));
    }

    /// Look up a validator by name.
    pub fn get(&self, name: &str) -> Option<&FormatValidator> {
        self.handlers.get(name).map(|validator| validator.as_ref())
    }
}

fn format_date_time(instance: &Value, _schema: &Value) -> Option<String> {
    let Some(text) = instance.as_str() else {
        return None;
    };
    match chrono::DateTime::parse_from_rfc3339(text) {
        Ok(_) => None,
        Err(_) => Some(String::from("not a valid RFC 3339 date-time")),
    }
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

fn format_email(instance: &Value, _schema: &Value) -> Option<String> {
    let Some(text) = instance.as_str() else {
        return None;
    };
    if email_re().is_match(text) {
        None
    } else {
        Some(String::from("not a valid email address"))
    }
}

fn hostname_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
        )
        .expect("hostname pattern is valid")
    })
}

fn format_hostname(instance: &Value, _schema: &Value) -> Option<String> {
    let Some(text) = instance.as_str() else {
        return None;
    };
    if text.len() <= 255 && hostname_re().is_match(text) {
        None
    } else {
        Some(String::from("not a valid hostname"))
    }
}

fn format_ipv4(instance: &Value, _schema: &Value) -> Option<String> {
    let Some(text) = instance.as_str() else {
        return None;
    };
    match text.parse::<Ipv4Addr>() {
        Ok(_) => None,
        Err(_) => Some(String::from("not a valid dotted-quad IPv4 address")),
    }
}

fn format_ipv6(instance: &Value, _schema: &Value) -> Option<String> {
    let Some(text) = instance.as_str() else {
        return None;
    };
    match text.parse::<Ipv6Addr>() {
        Ok(_) => None,
        Err(_) => Some(String::from("not a valid IPv6 address")),
    }
}

fn format_uri(instance: &Value, _schema: &Value) -> Option<String> {
    let Some(text) = instance.as_str() else {
        return None;
    };
    match Url::parse(text) {
        Ok(_) => None,
        Err(_) => Some(String::from("not a valid URI")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(registry: &FormatRegistry, name: &str, instance: Value) -> Option<String> {
        registry.get(name).unwrap()(&instance, &json!({"format": name}))
    }

    #[test]
    fn test_date_time() {
        let reg = FormatRegistry::with_builtins();
        assert!(check(&reg, "date-time", json!("2013-02-18T18:04:00Z")).is_none());
        assert!(check(&reg, "date-time", json!("2013-02-18T18:04:00+05:00")).is_none());
        assert!(check(&reg, "date-time", json!("February 18th")).is_some());
        assert!(check(&reg, "date-time", json!("2013-02-18")).is_some());
    }

    #[test]
    fn test_email() {
        let reg = FormatRegistry::with_builtins();
        assert!(check(&reg, "email", json!("nobody@example.com")).is_none());
        assert!(check(&reg, "email", json!("not-an-email")).is_some());
        assert!(check(&reg, "email", json!("two@@example.com")).is_some());
    }

    #[test]
    fn test_hostname() {
        let reg = FormatRegistry::with_builtins();
        assert!(check(&reg, "hostname", json!("example.com")).is_none());
        assert!(check(&reg, "hostname", json!("a-b.c-d.example")).is_none());
        assert!(check(&reg, "hostname", json!("-leading.example")).is_some());
        assert!(check(&reg, "hostname", json!("spaces are bad")).is_some());
    }

    #[test]
    fn test_ipv4_and_ipv6() {
        let reg = FormatRegistry::with_builtins();
        assert!(check(&reg, "ipv4", json!("192.168.0.1")).is_none());
        assert!(check(&reg, "ipv4", json!("256.0.0.1")).is_some());
        assert!(check(&reg, "ipv6", json!("::1")).is_none());
        assert!(check(&reg, "ipv6", json!("not::an::address::at::all::really")).is_some());
    }

    #[test]
    fn test_uri() {
        let reg = FormatRegistry::with_builtins();
        assert!(check(&reg, "uri", json!("http://example.com/a?b=c#d")).is_none());
        assert!(check(&reg, "uri", json!("/relative/path")).is_some());
    }

    #[test]
    fn test_builtins_pass_non_string_instances() {
        let reg = FormatRegistry::with_builtins();
        for name in ["date-time", "email", "hostname", "ipv4", "ipv6", "uri"] {
            assert!(check(&reg, name, json!(42)).is_none(), "{name} rejected a number");
            assert!(check(&reg, name, json!(null)).is_none(), "{name} rejected null");
        }
    }

    #[test]
    fn test_custom_format_overrides_builtin() {
        let mut reg = FormatRegistry::with_builtins();
        reg.add("uri", |_, _| Some(String::from("everything is rejected")));
        assert!(check(&reg, "uri", json!("http://example.com/")).is_some());
    }

    #[test]
    fn test_unknown_format_is_absent() {
        let reg = FormatRegistry::with_builtins();
        assert!(reg.get("phone-us").is_none());
    }
}
