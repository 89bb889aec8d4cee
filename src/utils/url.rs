use anyhow::{anyhow, Result};
use reqwest::Url;

/// Appends path segments to `base`, percent-encoding each one.
pub fn with_segments<I, S>(base: &str, segments: I) -> Result<Url>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("not a hierarchical base url: {}", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_after_trailing_slash() {
        let url = with_segments("https://example.com/", ["v1", "a:b"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/v1/a:b");
    }

    #[test]
    fn keeps_existing_prefix() {
        let url = with_segments("http://localhost:4443/storage", ["x"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:4443/storage/x");
    }

    #[test]
    fn encodes_segment_separators() {
        let url = with_segments("https://example.com/", ["a/b c"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/a%2Fb%20c");
    }

    #[test]
    fn rejects_opaque_base() {
        assert!(with_segments("mailto:someone@example.com", ["x"]).is_err());
    }
}
