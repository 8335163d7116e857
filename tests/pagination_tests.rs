use mercado_api::pagination::{
    BANNER_SEARCH, ListQuery, PRODUCTO_SEARCH, PageEnvelope, PageParams, USER_SEARCH,
    push_search_filter,
};
use sqlx::{Postgres, query_builder::QueryBuilder};

fn params(page: Option<&str>, limit: Option<&str>, search: Option<&str>) -> PageParams {
    PageParams {
        page: page.map(str::to_string),
        limit: limit.map(str::to_string),
        search: search.map(str::to_string),
    }
}

// --- Query normalization ---

#[test]
fn test_defaults_when_params_absent() {
    let query = ListQuery::from_params(params(None, None, None));
    assert_eq!(query.page, 1);
    assert_eq!(query.limit, 10);
    assert_eq!(query.search, None);
}

#[test]
fn test_defaults_when_params_non_numeric() {
    let query = ListQuery::from_params(params(Some("abc"), Some("xyz"), None));
    assert_eq!(query.page, 1);
    assert_eq!(query.limit, 10);
}

#[test]
fn test_defaults_when_params_non_positive() {
    let query = ListQuery::from_params(params(Some("0"), Some("-5"), None));
    assert_eq!(query.page, 1);
    assert_eq!(query.limit, 10);
}

#[test]
fn test_fractional_page_is_not_a_page_number() {
    let query = ListQuery::from_params(params(Some("2.5"), Some("10.0"), None));
    assert_eq!(query.page, 1);
    assert_eq!(query.limit, 10);
}

#[test]
fn test_valid_params_pass_through() {
    let query = ListQuery::from_params(params(Some("3"), Some("25"), Some("boots")));
    assert_eq!(query.page, 3);
    assert_eq!(query.limit, 25);
    assert_eq!(query.search.as_deref(), Some("boots"));
    assert_eq!(query.offset(), 50);
}

#[test]
fn test_blank_search_is_dropped() {
    let query = ListQuery::from_params(params(None, None, Some("   ")));
    assert_eq!(query.search, None);
}

// --- Envelope invariants ---

#[test]
fn test_envelope_total_pages_is_ceiling() {
    let query = ListQuery {
        page: 1,
        limit: 10,
        search: None,
    };
    let envelope = PageEnvelope::new(vec![0u8; 10], 21, &query);
    assert_eq!(envelope.total_docs, 21);
    assert_eq!(envelope.total_pages, 3);
    assert!(envelope.has_next_page);
    assert!(!envelope.has_prev_page);
}

#[test]
fn test_envelope_exact_multiple() {
    let query = ListQuery {
        page: 2,
        limit: 10,
        search: None,
    };
    let envelope = PageEnvelope::new(vec![0u8; 10], 20, &query);
    assert_eq!(envelope.total_pages, 2);
    assert!(!envelope.has_next_page);
    assert!(envelope.has_prev_page);
}

#[test]
fn test_envelope_page_past_the_end() {
    // Requesting page totalPages + 1 yields an empty slice with correct flags.
    let query = ListQuery {
        page: 4,
        limit: 10,
        search: None,
    };
    let envelope = PageEnvelope::new(Vec::<u8>::new(), 21, &query);
    assert!(envelope.data.is_empty());
    assert_eq!(envelope.total_pages, 3);
    assert!(!envelope.has_next_page);
    assert!(envelope.has_prev_page);
}

#[test]
fn test_envelope_empty_collection() {
    let query = ListQuery::default();
    let envelope = PageEnvelope::new(Vec::<u8>::new(), 0, &query);
    assert_eq!(envelope.total_docs, 0);
    assert_eq!(envelope.total_pages, 0);
    assert!(!envelope.has_next_page);
    assert!(!envelope.has_prev_page);
}

#[test]
fn test_envelope_wire_field_names() {
    let query = ListQuery::default();
    let envelope = PageEnvelope::new(vec![1u8], 1, &query);
    let json = serde_json::to_value(&envelope).unwrap();
    assert!(json.get("data").is_some());
    assert!(json.get("totalDocs").is_some());
    assert!(json.get("totalPages").is_some());
    assert!(json.get("page").is_some());
    assert!(json.get("hasNextPage").is_some());
    assert!(json.get("hasPrevPage").is_some());
}

// --- Search predicate construction ---

#[test]
fn test_no_search_term_builds_no_filter() {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM banners");
    push_search_filter(&mut builder, &BANNER_SEARCH, None);
    assert_eq!(builder.sql(), "SELECT * FROM banners");

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM banners");
    push_search_filter(&mut builder, &BANNER_SEARCH, Some("   "));
    assert_eq!(builder.sql(), "SELECT * FROM banners");
}

#[test]
fn test_text_term_matches_text_columns_only() {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM productos");
    push_search_filter(&mut builder, &PRODUCTO_SEARCH, Some("boots"));
    let sql = builder.sql();
    assert!(sql.contains("description ILIKE"));
    // A non-numeric term must not emit numeric comparisons.
    assert!(!sql.contains("price ="));
    assert!(!sql.contains("stock ="));
}

#[test]
fn test_float_term_adds_price_comparison() {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM productos");
    push_search_filter(&mut builder, &PRODUCTO_SEARCH, Some("19.99"));
    let sql = builder.sql();
    // Substring match on text columns is always present.
    assert!(sql.contains("description ILIKE"));
    assert!(sql.contains("price ="));
    // 19.99 is not an integer, so the stock comparison is omitted.
    assert!(!sql.contains("stock ="));
}

#[test]
fn test_integer_term_adds_all_numeric_comparisons() {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM productos");
    push_search_filter(&mut builder, &PRODUCTO_SEARCH, Some("42"));
    let sql = builder.sql();
    assert!(sql.contains("description ILIKE"));
    assert!(sql.contains("price ="));
    assert!(sql.contains("stock ="));
}

#[test]
fn test_user_search_has_no_numeric_columns() {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM users");
    push_search_filter(&mut builder, &USER_SEARCH, Some("42"));
    let sql = builder.sql();
    assert!(sql.contains("username ILIKE"));
    assert!(sql.contains("email ILIKE"));
    assert!(!sql.contains("="));
}
