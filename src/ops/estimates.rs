use serde_json::Value;

/// Parse an estimate the way the web client did (`parseInt(s, 10)`):
/// leading whitespace, an optional sign, then as many digits as present.
/// Anything after the digits is ignored; no digits at all gives `None`.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i);
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Effort in days for aggregate totals. Unparsable or empty text counts as 0.
pub fn effort_days(estimates: &str) -> i64 {
    parse_leading_int(estimates).unwrap_or(0)
}

/// Normalise keyboard input for an estimate field.
///
/// Empty input is kept as empty (a legal in-progress state). Otherwise the
/// leading integer is stored in canonical form. Input with no leading
/// integer, or a negative one, is rejected and the field keeps its value.
pub fn normalize_input(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return Some(String::new());
    }
    match parse_leading_int(raw) {
        Some(n) if n >= 0 => Some(n.to_string()),
        _ => None,
    }
}

/// Convert an estimate as delivered by the backend into the text model.
/// Missing, null and empty values become `"0"`.
pub fn from_backend(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i.max(0).to_string(),
            None => (n.as_f64().unwrap_or(0.0).trunc() as i64).max(0).to_string(),
        },
        Some(Value::String(s)) if !s.trim().is_empty() => {
            effort_days(s).max(0).to_string()
        }
        _ => "0".to_string(),
    }
}
