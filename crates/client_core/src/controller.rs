//! Course list state: filters, sort and page in; one debounced, deduplicated search out.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use shared::{
    domain::SortKey,
    protocol::{Category, Course, CourseSearchResponse, Pagination},
};
use tokio::{
    sync::{broadcast, Mutex, MutexGuard},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    api::CatalogApi,
    error::CatalogError,
    query::{FilterState, PageState, QueryParams, RequestFingerprint},
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub debounce: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    RequestIssued {
        seq: u64,
        fingerprint: RequestFingerprint,
    },
    DuplicateSkipped {
        fingerprint: RequestFingerprint,
    },
    ResultsLoaded {
        seq: u64,
        total_courses: u64,
    },
    RequestFailed {
        seq: u64,
        error: CatalogError,
    },
    StaleResponseDiscarded {
        seq: u64,
    },
    CategoriesLoaded {
        count: usize,
    },
    CategoriesFailed(CatalogError),
    ValidationFailed(CatalogError),
}

/// What a view needs to render the course list.
#[derive(Debug, Clone, Default)]
pub struct CourseListView {
    pub filters: FilterState,
    pub sort: SortKey,
    pub page: PageState,
    pub courses: Vec<Course>,
    pub pagination: Pagination,
    pub categories: Vec<Category>,
    pub loading: bool,
    /// Outcome of course queries only.
    pub error: Option<String>,
    pub categories_error: Option<String>,
    pub last_issued: Option<RequestFingerprint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Debounced,
    Immediate,
    /// Skips the fingerprint check; only `retry` uses it.
    Forced,
}

#[derive(Default)]
struct ControllerState {
    filters: FilterState,
    sort: SortKey,
    page: PageState,
    courses: Vec<Course>,
    pagination: Pagination,
    categories: Vec<Category>,
    loading: bool,
    error: Option<CatalogError>,
    categories_error: Option<CatalogError>,
    last_issued: Option<RequestFingerprint>,
    latest_seq: u64,
    pending_timer: Option<JoinHandle<()>>,
    timer_generation: u64,
    categories_requested: bool,
    unmounted: bool,
}

impl ControllerState {
    fn cancel_pending_timer(&mut self) {
        // Bumping the generation also disarms a timer that already woke but has not taken the lock.
        self.timer_generation += 1;
        if let Some(timer) = self.pending_timer.take() {
            timer.abort();
        }
    }

    fn current_query(&self) -> Result<QueryParams, CatalogError> {
        QueryParams::derive(&self.filters, self.sort, self.page)
    }

    fn record_issued(&mut self, fingerprint: &RequestFingerprint) -> u64 {
        self.latest_seq += 1;
        self.last_issued = Some(fingerprint.clone());
        self.loading = true;
        self.latest_seq
    }

    fn view(&self) -> CourseListView {
        CourseListView {
            filters: self.filters.clone(),
            sort: self.sort,
            page: self.page,
            courses: self.courses.clone(),
            pagination: self.pagination,
            categories: self.categories.clone(),
            loading: self.loading,
            error: self.error.as_ref().map(ToString::to_string),
            categories_error: self.categories_error.as_ref().map(ToString::to_string),
            last_issued: self.last_issued.clone(),
        }
    }
}

pub struct CourseListController {
    api: Arc<dyn CatalogApi>,
    config: ControllerConfig,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl CourseListController {
    pub fn new(api: Arc<dyn CatalogApi>) -> Arc<Self> {
        Self::with_config(api, ControllerConfig::default())
    }

    pub fn with_config(api: Arc<dyn CatalogApi>, config: ControllerConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            config,
            inner: Mutex::new(ControllerState::default()),
            events,
        })
    }

    pub fn config(&self) -> ControllerConfig {
        self.config
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Issues the initial course query right away and loads categories once.
    pub async fn mount(self: &Arc<Self>) {
        let load_categories = {
            let mut guard = self.inner.lock().await;
            if guard.unmounted {
                debug!("catalog: mount ignored after unmount");
                return;
            }
            let first_mount = !guard.categories_requested;
            guard.categories_requested = true;
            self.dispatch_locked(guard, Dispatch::Immediate);
            first_mount
        };

        if load_categories {
            self.load_categories().await;
        }
    }

    pub async fn set_filters(self: &Arc<Self>, filters: FilterState) {
        let mut guard = self.inner.lock().await;
        guard.filters = filters;
        guard.page = PageState::first();
        self.dispatch_locked(guard, Dispatch::Debounced);
    }

    pub async fn set_sort(self: &Arc<Self>, sort: SortKey) {
        let mut guard = self.inner.lock().await;
        guard.sort = sort;
        self.dispatch_locked(guard, Dispatch::Debounced);
    }

    /// Returns `false` and changes nothing when `page` is outside `1..=total_pages`.
    pub async fn set_page(self: &Arc<Self>, page: u32) -> bool {
        let mut guard = self.inner.lock().await;
        let total_pages = guard.pagination.total_pages.max(1);
        if page < 1 || page > total_pages {
            debug!(page, total_pages, "catalog: page out of range; ignoring");
            return false;
        }
        guard.page = PageState { current_page: page };
        self.dispatch_locked(guard, Dispatch::Debounced);
        true
    }

    pub async fn clear(self: &Arc<Self>) {
        let mut guard = self.inner.lock().await;
        guard.filters = FilterState::default();
        guard.sort = SortKey::default();
        guard.page = PageState::first();
        self.dispatch_locked(guard, Dispatch::Debounced);
    }

    /// Clears the error and re-issues the current query now, even if its fingerprint matches.
    /// Categories are fetched again if their last load failed.
    pub async fn retry(self: &Arc<Self>) {
        let reload_categories = {
            let mut guard = self.inner.lock().await;
            guard.error = None;
            let reload = !guard.unmounted && guard.categories_error.is_some();
            self.dispatch_locked(guard, Dispatch::Forced);
            reload
        };

        if reload_categories {
            self.load_categories().await;
        }
    }

    /// Cancels the pending debounce. Responses still in flight are ignored when they land.
    pub async fn unmount(&self) {
        let mut guard = self.inner.lock().await;
        guard.unmounted = true;
        guard.cancel_pending_timer();
        info!(
            last_seq = guard.latest_seq,
            "catalog: course list unmounted"
        );
    }

    pub async fn snapshot(&self) -> CourseListView {
        self.inner.lock().await.view()
    }

    pub async fn current_query(&self) -> Result<QueryParams, CatalogError> {
        self.inner.lock().await.current_query()
    }

    fn dispatch_locked(
        self: &Arc<Self>,
        mut guard: MutexGuard<'_, ControllerState>,
        dispatch: Dispatch,
    ) {
        if guard.unmounted {
            debug!("catalog: controller unmounted; dropping state change");
            return;
        }

        let params = match guard.current_query() {
            Ok(params) => params,
            Err(err) => {
                warn!(error = %err, "catalog: filters rejected; no request issued");
                guard.cancel_pending_timer();
                guard.error = Some(err.clone());
                let _ = self.events.send(ControllerEvent::ValidationFailed(err));
                return;
            }
        };

        if matches!(guard.error, Some(CatalogError::Validation(_))) {
            guard.error = None;
        }

        let fingerprint = params.fingerprint();
        if dispatch != Dispatch::Forced && guard.last_issued.as_ref() == Some(&fingerprint) {
            // The current state is already loaded or in flight, so any pending timer is moot.
            guard.cancel_pending_timer();
            debug!(%fingerprint, "catalog: duplicate query skipped");
            let _ = self
                .events
                .send(ControllerEvent::DuplicateSkipped { fingerprint });
            return;
        }

        guard.cancel_pending_timer();
        match dispatch {
            Dispatch::Debounced => {
                let generation = guard.timer_generation;
                let delay = self.config.debounce;
                let weak = Arc::downgrade(self);
                guard.pending_timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(controller) = weak.upgrade() {
                        controller.fire_timer(generation).await;
                    }
                }));
            }
            Dispatch::Immediate | Dispatch::Forced => {
                let seq = guard.record_issued(&fingerprint);
                drop(guard);
                self.issue(seq, fingerprint, params);
            }
        }
    }

    async fn fire_timer(self: Arc<Self>, generation: u64) {
        let mut guard = self.inner.lock().await;
        if guard.unmounted || guard.timer_generation != generation {
            return;
        }
        guard.pending_timer = None;

        let params = match guard.current_query() {
            Ok(params) => params,
            Err(err) => {
                guard.error = Some(err.clone());
                let _ = self.events.send(ControllerEvent::ValidationFailed(err));
                return;
            }
        };
        let fingerprint = params.fingerprint();
        if guard.last_issued.as_ref() == Some(&fingerprint) {
            debug!(%fingerprint, "catalog: duplicate query skipped at timer expiry");
            let _ = self
                .events
                .send(ControllerEvent::DuplicateSkipped { fingerprint });
            return;
        }

        let seq = guard.record_issued(&fingerprint);
        drop(guard);
        self.issue(seq, fingerprint, params);
    }

    /// Runs the fetch detached from the debounce slot so a later timer cannot cancel it.
    fn issue(self: &Arc<Self>, seq: u64, fingerprint: RequestFingerprint, params: QueryParams) {
        info!(seq, %fingerprint, "catalog: course search issued");
        let _ = self
            .events
            .send(ControllerEvent::RequestIssued { seq, fingerprint });

        let api = Arc::clone(&self.api);
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let result = api.search_courses(&params).await;
            if let Some(controller) = weak.upgrade() {
                controller.apply_response(seq, result).await;
            }
        });
    }

    async fn apply_response(
        &self,
        seq: u64,
        result: Result<CourseSearchResponse, CatalogError>,
    ) {
        let mut guard = self.inner.lock().await;
        if guard.unmounted {
            debug!(seq, "catalog: response after unmount ignored");
            return;
        }
        if seq != guard.latest_seq {
            debug!(
                seq,
                latest_seq = guard.latest_seq,
                "catalog: stale response discarded"
            );
            let _ = self
                .events
                .send(ControllerEvent::StaleResponseDiscarded { seq });
            return;
        }

        guard.loading = false;
        match result {
            Ok(response) => {
                let total_courses = response.pagination.total_courses;
                info!(
                    seq,
                    courses = response.courses.len(),
                    page = response.pagination.current_page,
                    total_pages = response.pagination.total_pages,
                    total_courses,
                    "catalog: course search applied"
                );
                guard.courses = response.courses;
                guard.pagination = response.pagination;
                guard.error = None;
                let _ = self.events.send(ControllerEvent::ResultsLoaded {
                    seq,
                    total_courses,
                });
            }
            Err(error) => {
                warn!(seq, error = %error, "catalog: course search failed");
                guard.error = Some(error.clone());
                let _ = self
                    .events
                    .send(ControllerEvent::RequestFailed { seq, error });
            }
        }
    }

    async fn load_categories(&self) {
        let result = self.api.list_categories().await;
        let mut guard = self.inner.lock().await;
        if guard.unmounted {
            return;
        }
        match result {
            Ok(categories) => {
                let count = categories.len();
                info!(count, "catalog: categories loaded");
                guard.categories = categories;
                guard.categories_error = None;
                let _ = self
                    .events
                    .send(ControllerEvent::CategoriesLoaded { count });
            }
            Err(err) => {
                warn!(error = %err, "catalog: failed to load categories");
                guard.categories_error = Some(err.clone());
                let _ = self.events.send(ControllerEvent::CategoriesFailed(err));
            }
        }
    }
}

impl Drop for CourseListController {
    fn drop(&mut self) {
        self.inner.get_mut().cancel_pending_timer();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
