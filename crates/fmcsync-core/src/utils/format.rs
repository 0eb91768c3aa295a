/// Turn a policy name into a file stem: every non-alphanumeric character
/// becomes `_`.
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Remove a leading `https://` or `http://` and any trailing slash
pub fn strip_scheme(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_string()
}

/// Split a comma-separated address list, trimming entries and dropping
/// blanks and repeats while keeping first-seen order.
pub fn parse_address_list(input: &str) -> Vec<String> {
    normalize_addresses(input.split(','))
}

/// Trim, drop blanks and dedupe, keeping first-seen order
pub fn normalize_addresses<I, S>(addresses: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for addr in addresses {
        let addr = addr.as_ref().trim();
        if !addr.is_empty() && !out.iter().any(|seen| seen == addr) {
            out.push(addr.to_string());
        }
    }
    out
}

/// Human-readable age for a snapshot that is `minutes` old
pub fn format_age(minutes: i64) -> String {
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}
