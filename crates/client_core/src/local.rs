//! Filtering and sorting over a course list that is already in memory.
//!
//! Enrolled-course and approval lists come back whole from the backend, so they are narrowed
//! on the client with the same rules the search endpoint applies.

use std::cmp::Ordering;

use shared::{
    domain::{CourseStatus, SortKey},
    protocol::Course,
};

use crate::{
    error::CatalogError,
    query::{FilterState, PageState, QueryParams},
};

pub fn apply_local(
    courses: &[Course],
    filters: &FilterState,
    sort: SortKey,
) -> Result<Vec<Course>, CatalogError> {
    let matcher = LocalMatcher::new(filters)?;
    let mut selected: Vec<Course> = courses
        .iter()
        .filter(|course| matcher.matches(course))
        .cloned()
        .collect();
    selected.sort_by(|a, b| compare(a, b, sort));
    Ok(selected)
}

pub fn pending_approval(courses: &[Course]) -> Vec<&Course> {
    courses
        .iter()
        .filter(|course| course.status == CourseStatus::Pending)
        .collect()
}

struct LocalMatcher {
    search: Option<String>,
    category: Option<String>,
    level: Option<String>,
    min_rating: Option<f64>,
    min_price: f64,
    max_price: f64,
}

impl LocalMatcher {
    fn new(filters: &FilterState) -> Result<Self, CatalogError> {
        // Same validation as the search query.
        let params = QueryParams::derive(filters, SortKey::default(), PageState::first())?;
        Ok(Self {
            search: params.search.map(|s| s.to_lowercase()),
            category: params.category,
            level: params.level,
            min_rating: params.rating,
            min_price: params.min_price,
            max_price: params.max_price,
        })
    }

    fn matches(&self, course: &Course) -> bool {
        if let Some(search) = &self.search {
            let hit = [&course.title, &course.description, &course.instructor]
                .iter()
                .any(|field| field.to_lowercase().contains(search));
            if !hit {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !course.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(level) = &self.level {
            if !course.level.eq_ignore_ascii_case(level) {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if course.rating < min_rating {
                return false;
            }
        }
        course.price >= self.min_price && course.price <= self.max_price
    }
}

fn compare(a: &Course, b: &Course, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Newest => match (a.created_at, b.created_at) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::Oldest => match (a.created_at, b.created_at) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::PriceLow => a.price.total_cmp(&b.price),
        SortKey::PriceHigh => b.price.total_cmp(&a.price),
        SortKey::Rating => b.rating.total_cmp(&a.rating),
        SortKey::Popular => b.enrolled_count.cmp(&a.enrolled_count),
    }
}

#[cfg(test)]
#[path = "tests/local_tests.rs"]
mod tests;
