use analysis_core::StatementPeriod;

/// Title-case spelling of a camel-case key: `totalRevenue` -> `Total Revenue`.
///
/// A space goes in front of every capital, the first letter is upper-cased,
/// and runs of whitespace collapse to one. Already title-cased keys come
/// back unchanged.
pub fn title_case_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 8);
    for ch in key.chars() {
        if ch.is_uppercase() {
            spaced.push(' ');
        }
        spaced.push(ch);
    }

    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Non-zero numeric value stored under `key` or its title-case spelling.
fn lookup(record: &StatementPeriod, key: &str) -> Option<f64> {
    let direct = record
        .get(key)
        .and_then(|v| v.as_number())
        .filter(|v| *v != 0.0);
    if direct.is_some() {
        return direct;
    }

    let title = title_case_key(key);
    if title == key {
        return None;
    }
    record
        .get(&title)
        .and_then(|v| v.as_number())
        .filter(|v| *v != 0.0)
}

/// First usable value among `aliases`, or 0.0.
///
/// Zero is treated like a missing field so that a later alias still gets a
/// chance; absence is data, not an error.
pub fn extract(record: Option<&StatementPeriod>, aliases: &[&str]) -> f64 {
    record
        .and_then(|r| aliases.iter().find_map(|key| lookup(r, key)))
        .unwrap_or(0.0)
}

/// [`extract`] over several records in priority order; first non-zero wins.
pub fn extract_across_sources(sources: &[Option<&StatementPeriod>], aliases: &[&str]) -> f64 {
    sources
        .iter()
        .map(|source| extract(*source, aliases))
        .find(|v| *v != 0.0)
        .unwrap_or(0.0)
}
