pub fn escape_string(str: &str) -> String {
    let mut res = String::new();

    for ch in str.chars() {
        match ch {
            '\\' => res.push_str("\\\\"),
            '\t' => res.push_str("\\t"),
            '\n' => res.push_str("\\n"),
            '\r' => res.push_str("\\r"),
            '"' => res.push_str("\\\""),
            ch => res.push(ch),
        }
    }

    res
}

/// Strip the surrounding quotes of a quoted literal and resolve its escapes.
pub fn unquote(src: &str) -> String {
    let mut res = String::new();

    let mut chars = strip_quotes(src).chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('t') => res.push('\t'),
                Some('n') => res.push('\n'),
                Some('r') => res.push('\r'),
                Some(ch) => res.push(ch),
                None => res.push('\\'),
            }
        } else {
            res.push(ch);
        }
    }

    res
}

/// Strip the surrounding quotes of a lexer rule body. Only `\"` is resolved,
/// every other escape belongs to the regular expression.
pub fn unquote_pattern(src: &str) -> String {
    let mut res = String::new();

    let mut chars = strip_quotes(src).chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('"') => res.push('"'),
                Some(ch) => {
                    res.push('\\');
                    res.push(ch);
                }
                None => res.push('\\'),
            }
        } else {
            res.push(ch);
        }
    }

    res
}

fn strip_quotes(src: &str) -> &str {
    src.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(src)
}

/// The first `max` characters of `src`, for error messages.
pub fn preview(src: &str, max: usize) -> String {
    src.chars().take(max).collect()
}
