use url::{form_urlencoded, Url};

/// Query parameter carrying a setlist URL to convert right away.
pub const AUTO_START_PARAM: &str = "auto";

/// Extracts the auto-start candidate from a deep link.
///
/// `link` may be a full URL (`https://host/?auto=...`) or just its query
/// string, with or without the leading `?`. The value is not validated here.
pub fn auto_start_candidate(link: &str) -> Option<String> {
    let link = link.trim();
    let query = match Url::parse(link) {
        Ok(url) => url.query()?.to_string(),
        Err(_) => link.trim_start_matches('?').to_string(),
    };

    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == AUTO_START_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
