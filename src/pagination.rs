use crate::error::{GistViewerError, Result};
use url::Url;

const LAST_RELATION: &str = "rel=\"last\"";
const PAGE_PARAM: &str = "page";

/// Read the last page number out of a GitHub `Link` header.
///
/// Returns `Ok(0)` when there is no `rel="last"` entry, which callers treat
/// as a single page (nothing left to page backward through). A `last` entry
/// whose `page` query parameter can't be read is an
/// [`GistViewerError::InvalidLinkHeader`].
pub fn last_page_number(link_header: &str) -> Result<u32> {
    let Some(last_index) = link_header.find(LAST_RELATION) else {
        return Ok(0);
    };

    let invalid = || GistViewerError::InvalidLinkHeader(link_header.to_string());

    // The `<url>` of the entry the relation belongs to.
    let preceding = &link_header[..last_index];
    let url_start = preceding.rfind('<').ok_or_else(invalid)? + 1;
    let url_end = preceding[url_start..]
        .find('>')
        .map(|offset| url_start + offset)
        .ok_or_else(invalid)?;
    let last_url = Url::parse(&preceding[url_start..url_end]).map_err(|_| invalid())?;

    last_url
        .query_pairs()
        .filter(|(name, _)| name == PAGE_PARAM)
        .last()
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LINK_HEADER_ERROR;

    #[test]
    fn reads_last_page() {
        let header = "<https://api.example.com/gists/x/comments?page=2>; rel=\"next\", \
                      <https://api.example.com/gists/x/comments?page=5>; rel=\"last\"";
        assert_eq!(last_page_number(header).unwrap(), 5);
    }

    #[test]
    fn ignores_page_params_after_last() {
        let header = "<https://api.github.com/gists/x/comments?page=7>; rel=\"last\", \
                      <https://api.github.com/gists/x/comments?page=1>; rel=\"first\"";
        assert_eq!(last_page_number(header).unwrap(), 7);
    }

    #[test]
    fn per_page_is_not_page() {
        let header = "<https://api.github.com/gists/x/comments?page=3&per_page=30>; rel=\"last\"";
        assert_eq!(last_page_number(header).unwrap(), 3);
    }

    #[test]
    fn page_after_other_query_params() {
        let header = "<https://api.github.com/gists/x/comments?per_page=30&page=12>; rel=\"last\"";
        assert_eq!(last_page_number(header).unwrap(), 12);
    }

    #[test]
    fn missing_last_relation_is_zero() {
        let header = "<https://api.example.com/gists/x/comments?page=2>; rel=\"next\"";
        assert_eq!(last_page_number(header).unwrap(), 0);
        assert_eq!(last_page_number("").unwrap(), 0);
    }

    #[test]
    fn malformed_page_number_is_error() {
        let header = "<https://api.example.com/gists/x/comments?page=abc>; rel=\"last\"";
        let err = last_page_number(header).unwrap_err();
        assert!(matches!(err, GistViewerError::InvalidLinkHeader(_)));
        assert_eq!(err.user_message(), LINK_HEADER_ERROR);
    }

    #[test]
    fn last_without_page_param_is_error() {
        let header = "<https://api.example.com/gists/x/comments>; rel=\"last\"";
        assert!(last_page_number(header).is_err());
    }
}
