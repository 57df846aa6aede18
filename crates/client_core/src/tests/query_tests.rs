use super::*;

fn pairs(params: &QueryParams) -> Vec<(&'static str, String)> {
    params.to_pairs()
}

fn owned(expected: &[(&'static str, &str)]) -> Vec<(&'static str, String)> {
    expected.iter().map(|(k, v)| (*k, v.to_string())).collect()
}

#[test]
fn initial_state_derives_default_query() {
    let params = QueryParams::derive(&FilterState::default(), SortKey::default(), PageState::first())
        .expect("derive");
    assert_eq!(
        pairs(&params),
        owned(&[
            ("page", "1"),
            ("limit", "12"),
            ("minPrice", "0"),
            ("maxPrice", "1000"),
            ("sortBy", "newest"),
        ])
    );
}

#[test]
fn category_and_rating_filters_are_included() {
    let filters = FilterState::default()
        .with_category("math")
        .with_rating("4");
    let params =
        QueryParams::derive(&filters, SortKey::Newest, PageState::first()).expect("derive");
    assert_eq!(params.rating, Some(4.0));
    assert_eq!(
        pairs(&params),
        owned(&[
            ("page", "1"),
            ("limit", "12"),
            ("category", "math"),
            ("rating", "4"),
            ("minPrice", "0"),
            ("maxPrice", "1000"),
            ("sortBy", "newest"),
        ])
    );
}

#[test]
fn blank_inputs_are_omitted_and_search_is_trimmed() {
    let filters = FilterState::default()
        .with_search("  rust basics ")
        .with_level("   ")
        .with_category("");
    let params =
        QueryParams::derive(&filters, SortKey::PriceLow, PageState { current_page: 3 })
            .expect("derive");
    assert_eq!(params.search.as_deref(), Some("rust basics"));
    assert!(params.level.is_none());
    assert!(params.category.is_none());
    assert_eq!(params.page, 3);
    assert_eq!(params.sort_by, SortKey::PriceLow);
}

#[test]
fn fractional_prices_and_ratings_keep_their_fraction() {
    let filters = FilterState::default()
        .with_rating("3.5")
        .with_price_range(9.99, 250.0);
    let params =
        QueryParams::derive(&filters, SortKey::Rating, PageState::first()).expect("derive");
    let rendered = pairs(&params);
    assert!(rendered.contains(&("rating", "3.5".to_string())));
    assert!(rendered.contains(&("minPrice", "9.99".to_string())));
    assert!(rendered.contains(&("maxPrice", "250".to_string())));
}

#[test]
fn negative_zero_renders_like_zero() {
    let zero = QueryParams::derive(&FilterState::default(), SortKey::Newest, PageState::first())
        .expect("derive");
    let negative = QueryParams::derive(
        &FilterState::default()
            .with_rating("-0")
            .with_price_range(-0.0, 1000.0),
        SortKey::Newest,
        PageState::first(),
    )
    .expect("derive");

    let rendered = pairs(&negative);
    assert!(rendered.contains(&("minPrice", "0".to_string())));
    assert!(rendered.contains(&("rating", "0".to_string())));

    let mut unrated = negative.clone();
    unrated.rating = None;
    assert_eq!(unrated.fingerprint(), zero.fingerprint());
}

#[test]
fn invalid_rating_is_a_validation_error() {
    for rating in ["four", "7", "-1", "NaN"] {
        let err = QueryParams::derive(
            &FilterState::default().with_rating(rating),
            SortKey::Newest,
            PageState::first(),
        )
        .expect_err("must reject rating");
        assert!(
            matches!(err, CatalogError::Validation(_)),
            "unexpected error for {rating}: {err:?}"
        );
    }
}

#[test]
fn inverted_price_range_is_a_validation_error() {
    let err = QueryParams::derive(
        &FilterState::default().with_price_range(500.0, 100.0),
        SortKey::Newest,
        PageState::first(),
    )
    .expect_err("must reject range");
    assert!(err.to_string().contains("exceeds"));
}

#[test]
fn fingerprint_ignores_pair_order() {
    let forward = RequestFingerprint::from_pairs(&[("page", "1"), ("sortBy", "rating")]);
    let reversed = RequestFingerprint::from_pairs(&[("sortBy", "rating"), ("page", "1")]);
    assert_eq!(forward, reversed);
    assert_eq!(forward.as_str(), "page=1&sortBy=rating");
}

#[test]
fn fingerprint_changes_with_any_parameter() {
    let base = QueryParams::derive(&FilterState::default(), SortKey::Newest, PageState::first())
        .expect("derive");
    let mut other = base.clone();
    other.page = 2;
    assert_ne!(base.fingerprint(), other.fingerprint());

    let mut other = base.clone();
    other.sort_by = SortKey::Popular;
    assert_ne!(base.fingerprint(), other.fingerprint());

    assert_eq!(base.fingerprint(), base.clone().fingerprint());
}

#[test]
fn fingerprint_escapes_search_text() {
    let params = QueryParams::derive(
        &FilterState::default().with_search("c++ & rust"),
        SortKey::Newest,
        PageState::first(),
    )
    .expect("derive");
    let fingerprint = params.fingerprint();
    assert!(fingerprint.as_str().contains("search=c%2B%2B+%26+rust"));
}
