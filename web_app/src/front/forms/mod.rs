pub mod order;
pub mod profile;

/// Serializer escapes that ammonia writes back into text nodes
const TEXT_ENTITIES: [(&str, &str); 5] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&nbsp;", "\u{a0}"),
    ("&amp;", "&"),
];

/// Trimmed plain text of a form value: every tag is dropped (script and
/// style with their content) and the text is not entity-encoded, so the
/// value stays equal to what the buyer typed and what the payment provider
/// echoes back.
pub fn strip_markup(value: &str) -> String {
    let cleaned = ammonia::Builder::empty().clean(value.trim()).to_string();
    TEXT_ENTITIES
        .iter()
        .fold(cleaned, |text, (entity, plain)| text.replace(entity, plain))
        .trim()
        .to_string()
}
