use super::*;
use chrono::{TimeZone, Utc};
use shared::domain::CourseId;

fn course(id: &str, price: f64, rating: f64, enrolled: u64, day: Option<u32>) -> Course {
    Course {
        id: CourseId(id.to_string()),
        title: format!("Course {id}"),
        description: String::new(),
        category: "Math".to_string(),
        level: "beginner".to_string(),
        price,
        rating,
        enrolled_count: enrolled,
        instructor: "Grace Hopper".to_string(),
        thumbnail: None,
        status: CourseStatus::Approved,
        created_at: day.map(|d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()),
    }
}

fn catalog() -> Vec<Course> {
    let mut art = course("art", 80.0, 3.9, 500, Some(3));
    art.category = "Art".to_string();
    art.level = "advanced".to_string();
    art.status = CourseStatus::Pending;
    vec![
        course("a", 20.0, 4.8, 120, Some(10)),
        course("b", 0.0, 4.1, 900, None),
        course("c", 45.5, 4.5, 30, Some(2)),
        art,
    ]
}

fn ids(courses: &[Course]) -> Vec<&str> {
    courses.iter().map(|c| c.id.0.as_str()).collect()
}

#[test]
fn default_filters_keep_everything_sorted_newest_first() {
    let sorted = apply_local(&catalog(), &FilterState::default(), SortKey::Newest).expect("apply");
    assert_eq!(ids(&sorted), vec!["a", "art", "c", "b"]);

    let oldest = apply_local(&catalog(), &FilterState::default(), SortKey::Oldest).expect("apply");
    assert_eq!(ids(&oldest), vec!["c", "art", "a", "b"]);
}

#[test]
fn category_and_rating_filters_match_backend_rules() {
    let filters = FilterState::default().with_category("math").with_rating("4.2");
    let selected = apply_local(&catalog(), &filters, SortKey::Rating).expect("apply");
    assert_eq!(ids(&selected), vec!["a", "c"]);
}

#[test]
fn search_matches_instructor_case_insensitively() {
    let filters = FilterState::default().with_search("HOPPER");
    assert_eq!(
        apply_local(&catalog(), &filters, SortKey::Popular)
            .expect("apply")
            .len(),
        4
    );

    let filters = FilterState::default().with_search("course c");
    assert_eq!(
        ids(&apply_local(&catalog(), &filters, SortKey::Popular).expect("apply")),
        vec!["c"]
    );
}

#[test]
fn price_range_is_inclusive_and_sorts_by_price() {
    let filters = FilterState::default().with_price_range(0.0, 45.5);
    let cheap_first = apply_local(&catalog(), &filters, SortKey::PriceLow).expect("apply");
    assert_eq!(ids(&cheap_first), vec!["b", "a", "c"]);

    let dear_first = apply_local(&catalog(), &filters, SortKey::PriceHigh).expect("apply");
    assert_eq!(ids(&dear_first), vec!["c", "a", "b"]);
}

#[test]
fn popularity_orders_by_enrollment() {
    let sorted = apply_local(&catalog(), &FilterState::default(), SortKey::Popular).expect("apply");
    assert_eq!(ids(&sorted), vec!["b", "art", "a", "c"]);
}

#[test]
fn invalid_filters_are_rejected() {
    let err = apply_local(
        &catalog(),
        &FilterState::default().with_rating("lots"),
        SortKey::Newest,
    )
    .expect_err("must fail");
    assert!(matches!(err, CatalogError::Validation(_)));
}

#[test]
fn pending_approval_selects_pending_only() {
    let courses = catalog();
    let pending = pending_approval(&courses);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id.0, "art");
}
