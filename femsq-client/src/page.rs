//! List-response normalization.
//!
//! Paged endpoints answer `{content, totalElements, totalPages, number|page,
//! size}`; others answer a bare array. Both decode through [`ListResponse`]
//! and normalize into one [`Page`].

use serde::{Deserialize, Serialize};

/// Either wire shape of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Items(Vec<T>),
    Paged(PageResponse<T>),
}

/// Spring-style page envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// Zero-based page index
    #[serde(default)]
    pub page: Option<u32>,
    /// Zero-based page index under its Spring name
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

/// Normalized page
///
/// Totals are `None` when the server did not report them; the store derives
/// them from the content in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: Option<u64>,
    pub total_pages: Option<u32>,
    /// Zero-based page index reported by the server
    pub page_index: Option<u32>,
    pub size: Option<u32>,
}

impl<T> Page<T> {
    /// Single page holding every item.
    pub fn from_items(items: Vec<T>) -> Self {
        let len = items.len();
        Self {
            content: items,
            total_elements: Some(len as u64),
            total_pages: Some(1),
            page_index: Some(0),
            size: Some(len as u32),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page_index: self.page_index,
            size: self.size,
        }
    }
}

impl<T> From<ListResponse<T>> for Page<T> {
    fn from(response: ListResponse<T>) -> Self {
        match response {
            ListResponse::Items(items) => Page::from_items(items),
            ListResponse::Paged(paged) => Page {
                content: paged.content,
                total_elements: paged.total_elements,
                total_pages: paged.total_pages,
                page_index: paged.page.or(paged.number),
                size: paged.size,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_normalizes_to_single_page() {
        let response: ListResponse<i64> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        let page = Page::from(response);

        assert_eq!(page.content, vec![1, 2, 3]);
        assert_eq!(page.total_elements, Some(3));
        assert_eq!(page.total_pages, Some(1));
        assert_eq!(page.page_index, Some(0));
        assert_eq!(page.size, Some(3));
    }

    #[test]
    fn test_envelope_page_index_from_page_or_number() {
        let response: ListResponse<i64> = serde_json::from_value(json!({
            "content": [1],
            "totalElements": 11,
            "totalPages": 2,
            "number": 1,
            "size": 10
        }))
        .unwrap();
        let page = Page::from(response);
        assert_eq!(page.total_elements, Some(11));
        assert_eq!(page.page_index, Some(1));

        let response: ListResponse<i64> =
            serde_json::from_value(json!({"content": [1], "page": 0, "number": 1})).unwrap();
        assert_eq!(Page::from(response).page_index, Some(0));
    }

    #[test]
    fn test_partial_envelope_leaves_totals_unset() {
        let response: ListResponse<i64> =
            serde_json::from_value(json!({"content": [4, 5], "totalElements": 2})).unwrap();
        let page = Page::from(response);

        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_pages, None);
        assert_eq!(page.page_index, None);
    }
}
