//! Query-parameter rendering for paged collections.

use streamsight_core::api::PageFilter;

/// Render a [`PageFilter`] as platform query parameters.
pub(crate) fn page_params(filter: &PageFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("pageSize", filter.page_size.to_string()),
        ("currentPage", filter.current_page.to_string()),
        ("withTotalPages", filter.with_total_pages.to_string()),
    ];
    if let Some(source) = &filter.source {
        params.push(("source", source.clone()));
    }
    if let Some(status) = &filter.status {
        params.push(("status", status.clone()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params() {
        let filter = PageFilter {
            page_size: 5,
            current_page: 3,
            source: Some("42".to_string()),
            status: Some("ACTIVE".to_string()),
            with_total_pages: true,
        };
        let params = page_params(&filter);
        assert!(params.contains(&("pageSize", "5".to_string())));
        assert!(params.contains(&("currentPage", "3".to_string())));
        assert!(params.contains(&("source", "42".to_string())));
        assert!(params.contains(&("status", "ACTIVE".to_string())));
    }
}
