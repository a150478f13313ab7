/// Text processing utilities
pub mod text {
    /// Escape the characters that are significant in HTML text and
    /// double-quoted attribute values.
    pub fn escape_html(s: &str) -> String {
        if !s.contains(['&', '<', '>', '"', '\'']) {
            return s.to_string();
        }
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Split an author cell such as `"A Jones, N Bommakanti"`.
    pub fn split_authors(cell: &str) -> Vec<String> {
        cell.split(", ")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Leading whitespace-delimited token, e.g. the year of `"2023 Jan 15"`.
    pub fn first_token(s: &str) -> &str {
        s.split_whitespace().next().unwrap_or("")
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    use crate::types::Result;

    /// Append `segments` to `base` and attach `query` pairs.
    pub fn endpoint(base: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let trimmed = base.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", trimmed, segments.join("/")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }
        Ok(url)
    }

    /// Only http(s) endpoints are fetched.
    pub fn is_fetchable(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            url.scheme() == "http" || url.scheme() == "https"
        } else {
            false
        }
    }
}
