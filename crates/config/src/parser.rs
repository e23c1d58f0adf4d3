//! Configuration parsing and default merging

use malloy_conn_core::{
    ConfigDocument, ConfigValue, ConnectionConfigEntry, Error, Result, ALIAS_CONNECTION_KIND,
    ALIAS_CONNECTION_NAME, ALIAS_PROPERTY_NAME, ALIAS_PROPERTY_VALUE, CONFIG_FILENAME,
};

/// Parse project configuration text.
///
/// Fails on malformed text; a bad document is rejected as a whole.
pub fn parse(raw_text: &str) -> Result<ConfigDocument> {
    parse_named(CONFIG_FILENAME, raw_text)
}

/// Parse configuration text, labelling errors with `origin`
pub fn parse_named(origin: &str, raw_text: &str) -> Result<ConfigDocument> {
    let value: serde_json::Value =
        serde_json::from_str(raw_text).map_err(|e| Error::parse_json(origin, e))?;
    ConfigDocument::from_json(origin, value)
}

/// The synthesized defaults: one bare entry per registered kind, named after the
/// kind, plus the built-in convenience alias.
///
/// A registered kind that shares the alias name keeps its own default.
pub fn default_document<S: AsRef<str>>(registered_kinds: &[S]) -> ConfigDocument {
    let mut document = ConfigDocument::new().with_connection(
        ALIAS_CONNECTION_NAME,
        ConnectionConfigEntry::new(ALIAS_CONNECTION_KIND)
            .with_property(ALIAS_PROPERTY_NAME, ConfigValue::literal(ALIAS_PROPERTY_VALUE)),
    );
    for kind in registered_kinds {
        let kind = kind.as_ref();
        document.insert(kind, ConnectionConfigEntry::new(kind));
    }
    document
}

/// Overlay `user` on the defaults. User entries replace defaults of the same
/// name wholesale; nothing is merged property by property.
pub fn merge_with_defaults<S: AsRef<str>>(
    user: &ConfigDocument,
    registered_kinds: &[S],
) -> ConfigDocument {
    let mut merged = default_document(registered_kinds);
    for (name, entry) in user.iter() {
        merged.insert(name, entry.clone());
    }
    merged
}
