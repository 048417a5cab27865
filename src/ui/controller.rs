//! Catalog controller wiring user actions to the catalog service.
//!
//! The controller owns a [`ViewState`] and drives a [`View`], the only
//! binding to an actual toolkit. The browser dashboard, the admin CLI, and
//! the tests each provide their own view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::form::EntryForm;
use super::render::{CardGrid, FilterButton, filter_buttons, render_grid};
use super::state::{CategoryFilter, ViewState};
use crate::application::services::{CatalogService, Subscription};
use crate::config::DEFAULT_NOTIFY_DISMISS_SECS;
use crate::domain::entities::{Entry, EntryId};
use crate::domain::repositories::CatalogStore;
use crate::error::CatalogError;

/// Controls that show a busy state while their operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Submit button of the add form.
    Submit,
    /// Save button of the edit surface.
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient banner message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Increases with every notification a controller shows.
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
}

/// Toolkit binding driven by [`CatalogController`].
pub trait View: Send + Sync {
    fn render_grid(&self, grid: &CardGrid);

    fn render_filters(&self, buttons: &[FilterButton]);

    /// Shows or hides the loading indicator.
    fn set_loading(&self, loading: bool);

    /// Disables a control and shows its busy indicator, or restores it.
    fn set_busy(&self, control: Control, busy: bool);

    fn show_notification(&self, notification: &Notification);

    /// Hides the notification with the given id if it is still showing.
    fn dismiss_notification(&self, id: u64);

    /// Clears the add form after a successful add.
    fn reset_add_form(&self);

    /// Opens the edit surface pre-filled with `form`.
    fn open_edit(&self, form: &EntryForm);

    fn close_edit(&self);

    /// Asks the user to confirm a destructive action.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Shows notifications and dismisses each after a fixed delay.
///
/// Only the most recent notification is ever dismissed by a timer, so a
/// newer banner is never hidden by an older one's timeout.
pub struct Notifier<V: View + ?Sized> {
    view: Arc<V>,
    dismiss_after: Duration,
    latest: Arc<AtomicU64>,
}

impl<V: View + ?Sized> Clone for Notifier<V> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            dismiss_after: self.dismiss_after,
            latest: self.latest.clone(),
        }
    }
}

impl<V: View + ?Sized + 'static> Notifier<V> {
    pub fn new(view: Arc<V>, dismiss_after: Duration) -> Self {
        Self {
            view,
            dismiss_after,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shows `message` and schedules its dismissal. Returns the notification id.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let notification = Notification {
            id,
            message: message.into(),
            kind,
        };
        debug!(id, ?kind, message = %notification.message, "Showing notification");
        self.view.show_notification(&notification);

        let view = self.view.clone();
        let latest = self.latest.clone();
        let delay = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) == id {
                view.dismiss_notification(id);
            }
        });

        id
    }
}

/// Marks a control busy for as long as the guard lives.
pub struct BusyGuard<V: View + ?Sized> {
    view: Arc<V>,
    control: Control,
}

impl<V: View + ?Sized> BusyGuard<V> {
    pub fn new(view: Arc<V>, control: Control) -> Self {
        view.set_busy(control, true);
        Self { view, control }
    }
}

impl<V: View + ?Sized> Drop for BusyGuard<V> {
    fn drop(&mut self) {
        self.view.set_busy(self.control, false);
    }
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records the outcome of the first delivery; later ones leave it alone.
fn settle(loaded: &watch::Sender<Option<bool>>, ok: bool) {
    loaded.send_if_modified(|outcome| {
        if outcome.is_some() {
            return false;
        }
        *outcome = Some(ok);
        true
    });
}

/// Renders the current state into the view.
///
/// `gate` is held from reading the state until the view has drawn it, so
/// renders reach the view in the order they read the state and the last one
/// drawn always reflects the latest snapshot.
fn render_state<V: View + ?Sized>(state: &Mutex<ViewState>, gate: &Mutex<()>, view: &V) {
    let _gate = gate.lock().unwrap_or_else(PoisonError::into_inner);
    let (grid, buttons) = {
        let state = lock(state);
        (
            render_grid(state.filtered_entries()),
            filter_buttons(state.all_entries(), state.active_category()),
        )
    };
    view.render_grid(&grid);
    view.render_filters(&buttons);
}

/// Owns the view state for one client and reacts to user actions.
pub struct CatalogController<V: View + 'static> {
    service: Arc<CatalogService<dyn CatalogStore>>,
    view: Arc<V>,
    state: Arc<Mutex<ViewState>>,
    render_gate: Arc<Mutex<()>>,
    notifier: Notifier<V>,
    subscription: tokio::sync::Mutex<Option<Subscription>>,
    loaded: Arc<watch::Sender<Option<bool>>>,
}

impl<V: View + 'static> CatalogController<V> {
    pub fn new(service: Arc<CatalogService<dyn CatalogStore>>, view: Arc<V>) -> Self {
        let notifier = Notifier::new(
            view.clone(),
            Duration::from_secs(DEFAULT_NOTIFY_DISMISS_SECS),
        );
        let (loaded, _) = watch::channel(None);

        Self {
            service,
            view,
            state: Arc::new(Mutex::new(ViewState::new())),
            render_gate: Arc::new(Mutex::new(())),
            notifier,
            subscription: tokio::sync::Mutex::new(None),
            loaded: Arc::new(loaded),
        }
    }

    /// Overrides how long notifications stay visible.
    pub fn with_dismiss_after(mut self, dismiss_after: Duration) -> Self {
        self.notifier = Notifier::new(self.view.clone(), dismiss_after);
        self
    }

    /// Starts with `filter` active instead of showing every category.
    pub fn with_filter(self, filter: CategoryFilter) -> Self {
        lock(&self.state).apply_filter(filter);
        self
    }

    /// Subscribes to the catalog. Calling it again has no effect.
    ///
    /// The loading indicator stays on until the first snapshot or error.
    /// Every snapshot replaces the local list, re-applies the active filter,
    /// and re-renders.
    pub async fn initialize(&self) {
        let mut slot = self.subscription.lock().await;
        if slot.is_some() {
            return;
        }

        self.view.set_loading(true);

        let state = self.state.clone();
        let gate = self.render_gate.clone();
        let view = self.view.clone();
        let loaded = self.loaded.clone();
        let on_change = move |entries: Vec<Entry>| {
            let count = entries.len();
            lock(&state).replace_entries(entries);
            render_state(&state, &gate, view.as_ref());
            view.set_loading(false);
            settle(&loaded, true);
            debug!(count, "Catalog view refreshed");
        };

        let view = self.view.clone();
        let notifier = self.notifier.clone();
        let loaded = self.loaded.clone();
        let on_error = move |e: CatalogError| {
            view.set_loading(false);
            notifier.notify(
                format!("Error connecting to the database: {e}"),
                NotificationKind::Error,
            );
            settle(&loaded, false);
        };

        *slot = Some(self.service.subscribe(on_change, on_error).await);
        info!("Catalog controller initialized");
    }

    /// Waits until the first snapshot or subscription error has been handled.
    ///
    /// Returns `false` when the first delivery was an error.
    pub async fn loaded(&self) -> bool {
        let mut loaded = self.loaded.subscribe();
        // The sender lives in self, so the channel cannot close here.
        match loaded.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Changes the active category and re-renders.
    pub fn apply_filter(&self, filter: CategoryFilter) {
        debug!(category = %filter, "Applying filter");
        lock(&self.state).apply_filter(filter);
        render_state(&self.state, &self.render_gate, self.view.as_ref());
    }

    /// Rebuilds the grid from the currently visible entries.
    pub fn render(&self) {
        let _gate = self
            .render_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let grid = render_grid(lock(&self.state).filtered_entries());
        self.view.render_grid(&grid);
    }

    /// Adds a new entry from the add form.
    ///
    /// On success the form is cleared. Either way the outcome is notified and
    /// the submit control is released.
    ///
    /// # Errors
    ///
    /// Returns the [`CatalogError`] that was notified.
    pub async fn start_add(&self, form: EntryForm) -> Result<EntryId, CatalogError> {
        let _busy = BusyGuard::new(self.view.clone(), Control::Submit);

        let result = match form.into_entry(None) {
            Ok(entry) => self.service.add(&entry).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(id) => {
                self.view.reset_add_form();
                self.notify("Entry added successfully!", NotificationKind::Success);
                Ok(id)
            }
            Err(e) => {
                self.notify(format!("Error: {e}"), NotificationKind::Error);
                Err(e)
            }
        }
    }

    /// Selects `entry` for editing and opens the pre-filled edit surface.
    pub fn start_edit(&self, entry: Entry) {
        let form = EntryForm::from_entry(&entry);
        debug!(id = ?entry.id, "Editing entry");
        lock(&self.state).begin_edit(entry);
        self.view.open_edit(&form);
    }

    /// Looks up an entry in the last snapshot and starts editing it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the last snapshot has no such entry.
    pub fn start_edit_by_id(&self, id: &EntryId) -> Result<(), CatalogError> {
        let entry = lock(&self.state).find(id).cloned();
        match entry {
            Some(entry) => {
                self.start_edit(entry);
                Ok(())
            }
            None => {
                let err = CatalogError::not_found(id.as_str());
                self.notify(format!("Error: {err}"), NotificationKind::Error);
                Err(err)
            }
        }
    }

    /// Saves the edit form over the entry selected with [`Self::start_edit`].
    ///
    /// The entry keeps its id and creation time. On success the edit surface
    /// closes; on failure it stays open. The save control is always released.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoEditTarget`] if nothing is being edited,
    /// otherwise the [`CatalogError`] that was notified.
    pub async fn confirm_edit(&self, form: EntryForm) -> Result<(), CatalogError> {
        let target = lock(&self.state).entry_being_edited().cloned();
        let Some((target, id)) = target.and_then(|t| t.id.clone().map(|id| (t, id))) else {
            warn!("Edit confirmed without a selected entry");
            let err = CatalogError::NoEditTarget;
            self.notify(format!("Error updating: {err}"), NotificationKind::Error);
            return Err(err);
        };

        let _busy = BusyGuard::new(self.view.clone(), Control::Save);

        let result = match form.into_entry(Some(id.clone())) {
            Ok(entry) => {
                let entry = entry.preserving_identity_of(&target);
                self.service.update(&id, &entry).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                lock(&self.state).end_edit();
                self.view.close_edit();
                self.notify("Entry updated successfully!", NotificationKind::Success);
                Ok(())
            }
            Err(e) => {
                self.notify(format!("Error updating: {e}"), NotificationKind::Error);
                Err(e)
            }
        }
    }

    /// Abandons the current edit and closes the edit surface.
    pub fn cancel_edit(&self) {
        lock(&self.state).end_edit();
        self.view.close_edit();
    }

    /// Removes an entry after the user confirms.
    ///
    /// Returns `Ok(false)` if the user declined.
    ///
    /// # Errors
    ///
    /// Returns the [`CatalogError`] that was notified.
    pub async fn confirm_remove(&self, id: &EntryId) -> Result<bool, CatalogError> {
        if !self
            .view
            .confirm("Are you sure you want to remove this entry?")
        {
            debug!(id = %id, "Removal declined");
            return Ok(false);
        }

        match self.service.remove(id).await {
            Ok(()) => {
                self.notify("Entry removed successfully!", NotificationKind::Success);
                Ok(true)
            }
            Err(e) => {
                self.notify(format!("Error removing: {e}"), NotificationKind::Error);
                Err(e)
            }
        }
    }

    /// Shows a transient notification. Returns its id.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.notifier.notify(message, kind)
    }

    /// Detaches from the catalog. Later snapshots are ignored.
    pub async fn shutdown(&self) {
        if let Some(subscription) = self.subscription.lock().await.take() {
            subscription.unsubscribe();
            info!("Catalog controller shut down");
        }
    }

    /// A copy of the current view state.
    pub fn state(&self) -> ViewState {
        lock(&self.state).clone()
    }
}
