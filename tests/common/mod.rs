#![allow(dead_code)]

use coin_catalog::domain::entities::{Entry, EntryId};
use coin_catalog::domain::repositories::CatalogStore;
use coin_catalog::infrastructure::persistence::MemoryCatalogStore;
use coin_catalog::state::AppState;
use coin_catalog::ui::{CardGrid, Control, EntryForm, FilterButton, Notification, View};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Upper bound for waiting on live deliveries.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);

pub fn silver_dollar() -> Entry {
    Entry::new(
        "Silver Dollar",
        "1921 coin",
        "silver",
        "http://x/y.png",
        26.73,
        1921,
        None,
    )
}

pub fn coin(title: &str, category: &str) -> Entry {
    Entry::new(title, "A coin", category, "http://x/c.png", 8.0, 1900, None)
}

pub fn form_for(entry: &Entry) -> EntryForm {
    EntryForm::from_entry(entry)
}

pub fn create_test_state() -> (AppState, Arc<MemoryCatalogStore>) {
    let store = Arc::new(MemoryCatalogStore::new());
    let state = AppState::new(store.clone() as Arc<dyn CatalogStore>);
    (state, store)
}

pub async fn seed(state: &AppState, entries: Vec<Entry>) -> Vec<EntryId> {
    let mut ids = Vec::with_capacity(entries.len());
    for entry in entries {
        ids.push(state.catalog_service.add(&entry).await.unwrap());
    }
    ids
}

/// Everything a [`RecordingView`] was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Grid(Vec<String>),
    Filters(Vec<(String, bool)>),
    Loading(bool),
    Busy(Control, bool),
    Shown(Notification),
    Dismissed(u64),
    ResetAddForm,
    OpenEdit(EntryForm),
    CloseEdit,
    Confirm(String),
}

/// A view that records every call and answers confirmations with a fixed value.
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    confirm_answer: AtomicBool,
    grids: watch::Sender<usize>,
    slow_grid: Mutex<Option<Duration>>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        let (grids, _) = watch::channel(0);
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
            grids,
            slow_grid: Mutex::new(None),
        })
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    /// Makes the next grid render block for `delay` before it is recorded.
    pub fn slow_next_grid(&self, delay: Duration) {
        *self.slow_grid.lock().unwrap() = Some(delay);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn grids(&self) -> Vec<Vec<String>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Grid(titles) => Some(titles),
                _ => None,
            })
            .collect()
    }

    pub fn last_grid(&self) -> Option<Vec<String>> {
        self.grids().pop()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Shown(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn grid_count(&self) -> usize {
        *self.grids.borrow()
    }

    /// Waits until at least `count` grids have been rendered.
    pub async fn wait_for_grids(&self, count: usize) {
        let mut rx = self.grids.subscribe();
        tokio::time::timeout(DELIVERY_TIMEOUT, rx.wait_for(|n| *n >= count))
            .await
            .expect("timed out waiting for a render")
            .unwrap();
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl View for RecordingView {
    fn render_grid(&self, grid: &CardGrid) {
        let delay = self.slow_grid.lock().unwrap().take();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.push(ViewEvent::Grid(
            grid.cards.iter().map(|c| c.title.clone()).collect(),
        ));
        self.grids.send_modify(|n| *n += 1);
    }

    fn render_filters(&self, buttons: &[FilterButton]) {
        self.push(ViewEvent::Filters(
            buttons
                .iter()
                .map(|b| (b.category.clone(), b.active))
                .collect(),
        ));
    }

    fn set_loading(&self, loading: bool) {
        self.push(ViewEvent::Loading(loading));
    }

    fn set_busy(&self, control: Control, busy: bool) {
        self.push(ViewEvent::Busy(control, busy));
    }

    fn show_notification(&self, notification: &Notification) {
        self.push(ViewEvent::Shown(notification.clone()));
    }

    fn dismiss_notification(&self, id: u64) {
        self.push(ViewEvent::Dismissed(id));
    }

    fn reset_add_form(&self) {
        self.push(ViewEvent::ResetAddForm);
    }

    fn open_edit(&self, form: &EntryForm) {
        self.push(ViewEvent::OpenEdit(form.clone()));
    }

    fn close_edit(&self) {
        self.push(ViewEvent::CloseEdit);
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.push(ViewEvent::Confirm(prompt.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }
}
