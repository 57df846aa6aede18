//! Client-side course catalog: query derivation, the debounced course list controller,
//! and helpers for rendering what it loads.

pub mod api;
pub mod controller;
pub mod error;
pub mod local;
pub mod pagination;
pub mod progress;
pub mod query;

pub use api::{CatalogApi, CatalogClient};
pub use controller::{
    ControllerConfig, ControllerEvent, CourseListController, CourseListView, DEFAULT_DEBOUNCE,
};
pub use error::CatalogError;
pub use query::{FilterState, PageState, PriceRange, QueryParams, RequestFingerprint, PAGE_SIZE};
