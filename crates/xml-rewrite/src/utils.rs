//! Markup escaping and serialized-output helpers.

/// Escape `&`, `<` and `>` for inclusion in markup.
pub fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Undo [`escape`].
pub fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Escape a value for use inside a double-quoted attribute.
pub(crate) fn escape_attribute(value: &str) -> String {
    escape(value).replace('"', "&quot;")
}

/// Sort the attributes and namespace declarations of the root start tag of
/// a serialized document, so documents can be compared textually.
pub fn sort_root_attributes(xml: &str) -> String {
    let Some(start) = root_tag_start(xml) else {
        return xml.to_string();
    };
    let Some(end) = tag_end(xml, start) else {
        return xml.to_string();
    };
    let tag = &xml[start + 1..end];
    let (tag, self_closing) = match tag.strip_suffix('/') {
        Some(tag) => (tag.trim_end(), true),
        None => (tag.trim_end(), false),
    };
    let name_end = tag.find(char::is_whitespace).unwrap_or(tag.len());
    let (name, rest) = tag.split_at(name_end);
    let mut attributes = split_attributes(rest);
    attributes.sort_unstable();

    let mut sorted = String::with_capacity(xml.len());
    sorted.push_str(&xml[..start]);
    sorted.push('<');
    sorted.push_str(name);
    for attribute in attributes {
        sorted.push(' ');
        sorted.push_str(attribute);
    }
    sorted.push_str(if self_closing { "/>" } else { ">" });
    sorted.push_str(&xml[end + 1..]);
    sorted
}

fn root_tag_start(xml: &str) -> Option<usize> {
    xml.match_indices('<')
        .map(|(i, _)| i)
        .find(|&i| !matches!(xml[i + 1..].chars().next(), Some('?' | '!')))
}

fn tag_end(xml: &str, start: usize) -> Option<usize> {
    let mut quote = None;
    for (i, c) in xml[start..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(start + i),
            None => {}
        }
    }
    None
}

fn split_attributes(text: &str) -> Vec<&str> {
    let mut attributes = Vec::new();
    let mut start = None;
    let mut quote = None;
    for (i, c) in text.char_indices() {
        match (start, quote) {
            (None, _) if c.is_whitespace() => {}
            (None, _) => start = Some(i),
            (Some(_), None) if c == '"' || c == '\'' => quote = Some(c),
            (Some(s), Some(q)) if c == q => {
                attributes.push(&text[s..=i]);
                start = None;
                quote = None;
            }
            _ => {}
        }
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_round_trip() {
        assert_eq!(escape("a&b <c>"), "a&amp;b &lt;c&gt;");
        assert_eq!(unescape("a&amp;lt;b"), "a&lt;b");
    }

    #[test]
    fn sorts_root_tag_attributes() {
        let input = "<a:root xmlns:b=\"namespace B\" xmlns:a=\"namespace A\">\n    <b:sub>tag</b:sub>\n</a:root>";
        assert_eq!(
            sort_root_attributes(input),
            "<a:root xmlns:a=\"namespace A\" xmlns:b=\"namespace B\">\n    <b:sub>tag</b:sub>\n</a:root>"
        );
    }

    #[test]
    fn sorting_skips_declaration_and_keeps_empty_tags() {
        let input = r#"<?xml version="1.0"?><x b="2" a="1"/>"#;
        assert_eq!(
            sort_root_attributes(input),
            r#"<?xml version="1.0"?><x a="1" b="2"/>"#
        );
    }
}
