use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters `encodeURIComponent` leaves alone
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A query parameter. `None` values are dropped.
pub type Param<'a> = (&'a str, Option<String>);

/// Convert a key to snake_case: `taskType` and `task-type` both become
/// `task_type`, `HTTPServer` becomes `http_server`.
pub fn snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() && c.is_ascii_digit())
                || (prev.is_ascii_digit() && c.is_alphabetic())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(|n| n.is_lowercase()));
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT_ENCODE_SET).to_string()
}

/// `key=value` pairs joined with `&`, skipping absent values
pub fn join_params(params: &[Param<'_>]) -> String {
    params
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k, v)))
        .map(|(k, v)| format!("{}={}", encode(&snake_case(k)), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append each non-empty parameter group to `url`, starting the query with
/// `?` or continuing it with `&`.
pub fn join_url_params(url: &str, groups: &[&[Param<'_>]]) -> String {
    let mut result = url.to_string();
    for group in groups {
        let joined = join_params(group);
        if joined.is_empty() {
            continue;
        }
        result.push(if result.contains('?') { '&' } else { '?' });
        result.push_str(&joined);
    }
    result
}
