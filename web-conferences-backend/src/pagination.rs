use http::header::InvalidHeaderValue;
use http::HeaderValue;
use serde::Deserialize;
use web_conferences_config::ApiConfig;

/// The `page` and `per_page` query parameters.
#[derive(Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based.
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Page 0 is page 1, `per_page` is clamped to `1..=max_per_page`.
    #[must_use]
    pub fn resolve(params: PageParams, api: &ApiConfig) -> Self {
        Self {
            page: params.page.unwrap_or(1).max(1),
            per_page: params
                .per_page
                .unwrap_or(api.default_per_page)
                .clamp(1, api.max_per_page.max(1)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
    /// At least 1, even without items.
    pub last_page: u32,
}

#[must_use]
pub fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Page<T> {
    let per_page = pagination.per_page as usize;
    let last_page = u32::try_from(items.len().div_ceil(per_page).max(1)).unwrap_or(u32::MAX);
    let start = (pagination.page as usize).saturating_sub(1).saturating_mul(per_page);
    Page {
        items: items.into_iter().skip(start).take(per_page).collect(),
        pagination,
        last_page,
    }
}

impl<T> Page<T> {
    fn link(path: &str, page: u32, per_page: u32, rel: &str) -> String {
        let query = serde_urlencoded::to_string([("page", page), ("per_page", per_page)])
            .unwrap_or_default();
        format!("<{path}?{query}>; rel=\"{rel}\"")
    }

    /// RFC 5988 links to the current, next, previous, first and last page.
    pub fn link_header(&self, path: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let Pagination { page, per_page } = self.pagination;
        let mut links = vec![Self::link(path, page, per_page, "current")];
        if page < self.last_page {
            links.push(Self::link(path, page + 1, per_page, "next"));
        }
        if page > 1 {
            links.push(Self::link(path, (page - 1).min(self.last_page), per_page, "prev"));
        }
        links.push(Self::link(path, 1, per_page, "first"));
        links.push(Self::link(path, self.last_page, per_page, "last"));
        HeaderValue::try_from(links.join(","))
    }
}
