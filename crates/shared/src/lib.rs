pub mod domain;
pub mod error;
pub mod protocol;

#[cfg(test)]
mod tests {
    use super::{
        domain::{CourseStatus, SortKey},
        error::{ApiError, ErrorCode},
        protocol::{CategoriesPayload, CourseSearchResponse},
    };

    #[test]
    fn sort_key_uses_kebab_case_wire_names() {
        assert_eq!(
            serde_json::to_string(&SortKey::PriceHigh).expect("json"),
            "\"price-high\""
        );
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().expect("parse"), key);
        }
        assert!("cheapest".parse::<SortKey>().is_err());
    }

    #[test]
    fn search_response_tolerates_sparse_courses() {
        let raw = r#"{
            "courses": [
                { "id": "c1", "title": "Algebra", "price": 19.5, "enrolledCount": 40,
                  "createdAt": "2024-03-01T10:00:00Z", "status": "pending" },
                { "id": "c2", "title": "Poetry" }
            ],
            "pagination": { "currentPage": 2, "totalPages": 3, "totalCourses": 30 }
        }"#;
        let parsed: CourseSearchResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.courses.len(), 2);
        assert_eq!(parsed.courses[0].enrolled_count, 40);
        assert_eq!(parsed.courses[0].status, CourseStatus::Pending);
        assert!(parsed.courses[0].created_at.is_some());
        assert_eq!(parsed.courses[1].status, CourseStatus::Approved);
        assert_eq!(parsed.pagination.total_pages, 3);
    }

    #[test]
    fn categories_payload_accepts_bare_and_wrapped_forms() {
        let bare: CategoriesPayload =
            serde_json::from_str(r#"[{ "id": "math", "name": "Math" }]"#).expect("bare");
        let wrapped: CategoriesPayload =
            serde_json::from_str(r#"{ "categories": [{ "id": "art", "name": "Art" }] }"#)
                .expect("wrapped");
        assert_eq!(bare.into_categories()[0].name, "Math");
        assert_eq!(wrapped.into_categories()[0].name, "Art");
    }

    #[test]
    fn api_error_code_is_optional() {
        let parsed: ApiError = serde_json::from_str(r#"{ "message": "boom" }"#).expect("parse");
        assert!(parsed.code.is_none());
        let full = ApiError::new(ErrorCode::RateLimited, "slow down");
        let json = serde_json::to_string(&full).expect("json");
        assert!(json.contains("rate_limited"));
        assert_eq!(parsed.to_string(), "boom");
        assert_eq!(full.to_string(), "slow down [rate_limited]");
    }
}
