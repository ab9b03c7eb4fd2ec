/// Paginated collection envelope
///
/// Collections are returned in a Hydra-style envelope:
///
/// ```json
/// {
///   "@id": "/api/employees",
///   "@type": "Collection",
///   "totalItems": 42,
///   "member": [ ... ],
///   "view": {
///     "@id": "/api/employees?page=2",
///     "@type": "PartialCollectionView",
///     "first": "/api/employees?page=1",
///     "last": "/api/employees?page=2",
///     "previous": "/api/employees?page=1"
///   }
/// }
/// ```
///
/// Pages are 1-based. `itemsPerPage` defaults to 30 and is capped at 100.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const DEFAULT_ITEMS_PER_PAGE: u32 = 30;
pub const MAX_ITEMS_PER_PAGE: u32 = 100;

/// `page` / `itemsPerPage` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
}

/// Normalized page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl From<PageQuery> for Pagination {
    fn from(query: PageQuery) -> Self {
        Self {
            page: query.page.unwrap_or(1).max(1),
            per_page: query
                .items_per_page
                .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
                .clamp(1, MAX_ITEMS_PER_PAGE),
        }
    }
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Number of the last page; 1 for an empty collection
    pub fn last_page(&self, total: i64) -> u32 {
        let pages = (total.max(0) as u64).div_ceil(u64::from(self.per_page));
        pages.clamp(1, u64::from(u32::MAX)) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionView {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub first: String,
    pub last: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection<T> {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub total_items: i64,
    pub member: Vec<T>,
    pub view: CollectionView,
}

impl<T> Collection<T> {
    /// Builds the envelope; `filters` are repeated in every view link
    pub fn new(
        path: &str,
        filters: &[(&str, String)],
        pagination: Pagination,
        total_items: i64,
        member: Vec<T>,
    ) -> Self {
        let last = pagination.last_page(total_items);
        let link = |page: u32| {
            let mut query = form_urlencoded::Serializer::new(String::new());
            query.extend_pairs(filters.iter().map(|(key, value)| (*key, value.as_str())));
            if pagination.per_page != DEFAULT_ITEMS_PER_PAGE {
                query.append_pair("itemsPerPage", &pagination.per_page.to_string());
            }
            query.append_pair("page", &page.to_string());
            format!("{}?{}", path, query.finish())
        };

        Self {
            id: path.to_string(),
            kind: "Collection".to_string(),
            total_items,
            member,
            view: CollectionView {
                id: link(pagination.page),
                kind: "PartialCollectionView".to_string(),
                first: link(1),
                last: link(last),
                previous: (pagination.page > 1).then(|| link(pagination.page - 1)),
                next: (pagination.page < last).then(|| link(pagination.page + 1)),
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Collection<U> {
        Collection {
            id: self.id,
            kind: self.kind,
            total_items: self.total_items,
            member: self.member.into_iter().map(f).collect(),
            view: self.view,
        }
    }
}
