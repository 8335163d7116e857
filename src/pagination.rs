use serde::{Deserialize, Serialize};
use sqlx::{Postgres, query_builder::QueryBuilder};
use ts_rs::TS;
use utoipa::ToSchema;

/// Default page number when the client sends nothing usable.
pub const DEFAULT_PAGE: i64 = 1;
/// Default page size when the client sends nothing usable.
pub const DEFAULT_LIMIT: i64 = 10;

/// PageParams
///
/// Raw query parameters accepted by every paginated listing endpoint.
/// All three are string-encoded and optional; normalization into a
/// [`ListQuery`] happens explicitly, so a request like `?page=abc&limit=-3`
/// degrades to the defaults instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct PageParams {
    /// 1-based page number. Falls back to 1 when missing or non-numeric.
    pub page: Option<String>,
    /// Page size. Falls back to 10 when missing or non-numeric.
    pub limit: Option<String>,
    /// Free-text search term matched against the resource's search fields.
    pub search: Option<String>,
}

/// ListQuery
///
/// The normalized, bounded representation of a client's list/search/page
/// request. `page` and `limit` are always positive; the sort order is fixed
/// to newest-created first and is not client-controllable.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl ListQuery {
    /// Normalizes raw query parameters. Any missing, non-numeric or
    /// non-positive `page`/`limit` value is coerced to its default; an empty
    /// or whitespace-only search term counts as no search.
    pub fn from_params(params: PageParams) -> Self {
        let search = params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            page: parse_positive(params.page.as_deref(), DEFAULT_PAGE),
            limit: parse_positive(params.limit.as_deref(), DEFAULT_LIMIT),
            search,
        }
    }

    /// Offset of the first row of the requested page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
        }
    }
}

fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// SearchFields
///
/// The per-resource configuration of the disjunctive search predicate: text
/// columns are matched as case-insensitive substrings, numeric columns by
/// exact value when the search term parses as a number of the right shape.
#[derive(Debug, Clone, Copy)]
pub struct SearchFields {
    pub text: &'static [&'static str],
    pub floats: &'static [&'static str],
    pub ints: &'static [&'static str],
}

pub const BANNER_SEARCH: SearchFields = SearchFields {
    text: &["title", "description"],
    floats: &["price"],
    ints: &[],
};

pub const PRODUCTO_SEARCH: SearchFields = SearchFields {
    text: &["description"],
    floats: &["price"],
    ints: &["stock"],
};

pub const SERVICE_SEARCH: SearchFields = SearchFields {
    text: &["title", "description"],
    floats: &["price"],
    ints: &[],
};

pub const USER_SEARCH: SearchFields = SearchFields {
    text: &["username", "email"],
    floats: &[],
    ints: &[],
};

/// Appends the `WHERE` clause for a search term to a partially built query.
///
/// Produces `WHERE (col ILIKE $n OR ... OR price = $n OR stock = $n)` with
/// every value parameterized through `push_bind`. The numeric alternatives
/// are only emitted when the term actually parses as that numeric type, so a
/// plain-text term searches text columns alone. A term matching nothing is
/// not an error; the query simply returns zero rows.
pub fn push_search_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    fields: &SearchFields,
    search: Option<&str>,
) {
    let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) else {
        return;
    };

    let pattern = format!("%{}%", term);
    builder.push(" WHERE (");

    let mut first = true;
    for column in fields.text {
        if !first {
            builder.push(" OR ");
        }
        builder.push(format!("{} ILIKE ", column));
        builder.push_bind(pattern.clone());
        first = false;
    }

    if let Ok(value) = term.parse::<f64>() {
        for column in fields.floats {
            if !first {
                builder.push(" OR ");
            }
            builder.push(format!("{} = ", column));
            builder.push_bind(value);
            first = false;
        }
    }

    if let Ok(value) = term.parse::<i64>() {
        for column in fields.ints {
            if !first {
                builder.push(" OR ");
            }
            builder.push(format!("{} = ", column));
            builder.push_bind(value);
            first = false;
        }
    }

    builder.push(")");
}

/// PageEnvelope
///
/// One page of results plus the pagination metadata every listing endpoint
/// returns. Field names follow the wire contract consumed by the frontend.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    #[serde(rename = "totalDocs")]
    pub total_docs: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    pub page: i64,
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "hasPrevPage")]
    pub has_prev_page: bool,
}

impl<T> PageEnvelope<T> {
    /// Builds the envelope for one retrieved slice.
    ///
    /// Invariants: `total_pages = ceil(total_docs / limit)`,
    /// `has_next_page = page < total_pages`, `has_prev_page = page > 1`.
    /// A page past the end therefore yields an empty `data` with
    /// `has_next_page = false` and `has_prev_page = true`.
    pub fn new(data: Vec<T>, total_docs: i64, query: &ListQuery) -> Self {
        let total_pages = (total_docs + query.limit - 1) / query.limit;
        Self {
            data,
            total_docs,
            total_pages,
            page: query.page,
            has_next_page: query.page < total_pages,
            has_prev_page: query.page > 1,
        }
    }
}
