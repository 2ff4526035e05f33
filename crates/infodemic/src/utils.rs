use std::path::Path;

#[inline]
pub(crate) fn relpath<P1, P2>(path: P1, prefix: P2) -> String
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let path = path.as_ref();
    path.strip_prefix(prefix)
        .unwrap_or(path)
        .to_string_lossy()
        .into()
}

/// Escapes a string for use in XML text and attribute values.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
