//! LaTeX escaping for user-supplied text.
//!
//! Escaping is a single pass over the input, so an escape sequence that was
//! just emitted is never escaped again.

/// Escapes every LaTeX-significant character in `text`.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '$' => out.push_str("\\$"),
            '&' => out.push_str("\\&"),
            '#' => out.push_str("\\#"),
            '^' => out.push_str("\\^{}"),
            '_' => out.push_str("\\_"),
            '~' => out.push_str("\\~{}"),
            '%' => out.push_str("\\%"),
            other => out.push(other),
        }
    }
    out
}

/// Optional fields render as empty text when absent.
pub fn escape_opt(text: Option<&str>) -> String {
    text.map(escape_latex).unwrap_or_default()
}

/// Escapes a URL for use as the first argument of `\href`.
///
/// hyperref accepts `\#`, `\%` and `\&` inside the target; braces and
/// backslashes cannot appear in a valid URL and are dropped.
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.trim().chars() {
        match c {
            '#' => out.push_str("\\#"),
            '%' => out.push_str("\\%"),
            '&' => out.push_str("\\&"),
            '{' | '}' | '\\' => {}
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_latex`]: recovers the visible text of an escaped string.
#[cfg(test)]
pub fn unescape_latex(text: &str) -> String {
    const SEQUENCES: &[(&str, char)] = &[
        ("\\textbackslash{}", '\\'),
        ("\\^{}", '^'),
        ("\\~{}", '~'),
        ("\\{", '{'),
        ("\\}", '}'),
        ("\\$", '$'),
        ("\\&", '&'),
        ("\\#", '#'),
        ("\\_", '_'),
        ("\\%", '%'),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while let Some(c) = rest.chars().next() {
        if c == '\\' {
            for (sequence, replacement) in SEQUENCES {
                if let Some(after) = rest.strip_prefix(sequence) {
                    out.push(*replacement);
                    rest = after;
                    continue 'outer;
                }
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
