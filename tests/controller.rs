mod common;

use common::{RecordingView, ViewEvent, coin, create_test_state, form_for, silver_dollar};

use coin_catalog::domain::entities::EntryId;
use coin_catalog::error::CatalogError;
use coin_catalog::state::AppState;
use coin_catalog::ui::{CatalogController, Control, EntryForm, NotificationKind};
use std::sync::Arc;
use std::time::Duration;

fn controller(state: &AppState, view: &Arc<RecordingView>) -> CatalogController<RecordingView> {
    CatalogController::new(state.catalog_service.clone(), view.clone())
}

fn busy_events(view: &RecordingView) -> Vec<(Control, bool)> {
    view.events()
        .into_iter()
        .filter_map(|e| match e {
            ViewEvent::Busy(control, busy) => Some((control, busy)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_initialize_renders_first_snapshot() {
    let (state, _) = create_test_state();
    common::seed(&state, vec![coin("Eagle", "gold"), coin("Morgan", "silver")]).await;
    let view = RecordingView::new();
    let controller = controller(&state, &view);

    controller.initialize().await;
    controller.loaded().await;

    let events = view.events();
    assert_eq!(events.first(), Some(&ViewEvent::Loading(true)));
    assert!(events.contains(&ViewEvent::Loading(false)));
    assert_eq!(view.last_grid().unwrap(), vec!["Eagle", "Morgan"]);
    assert!(events.contains(&ViewEvent::Filters(vec![
        ("all".to_string(), true),
        ("gold".to_string(), false),
        ("silver".to_string(), false),
    ])));
}

#[tokio::test]
async fn test_initialize_twice_subscribes_once() {
    let (state, _) = create_test_state();
    let view = RecordingView::new();
    let controller = controller(&state, &view);

    controller.initialize().await;
    controller.initialize().await;
    view.wait_for_grids(1).await;

    state.catalog_service.add(&silver_dollar()).await.unwrap();
    view.wait_for_grids(2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(view.grid_count(), 2);
}

#[tokio::test]
async fn test_filter_survives_live_updates() {
    let (state, _) = create_test_state();
    common::seed(&state, vec![coin("Eagle", "gold"), coin("Morgan", "silver")]).await;
    let view = RecordingView::new();
    let controller = controller(&state, &view);
    controller.initialize().await;
    controller.loaded().await;

    controller.apply_filter("silver".into());
    assert_eq!(view.last_grid().unwrap(), vec!["Morgan"]);

    let before = view.grid_count();
    state.catalog_service.add(&coin("Peace", "silver")).await.unwrap();
    view.wait_for_grids(before + 1).await;
    state.catalog_service.add(&coin("Sovereign", "gold")).await.unwrap();
    view.wait_for_grids(before + 2).await;

    assert_eq!(view.last_grid().unwrap(), vec!["Morgan", "Peace"]);
    assert_eq!(controller.state().active_category().as_str(), "silver");
    assert_eq!(controller.state().all_entries().len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_render_never_leaves_an_older_grid_on_screen() {
    let (state, _) = create_test_state();
    common::seed(&state, vec![coin("Morgan", "silver")]).await;
    let view = RecordingView::new();
    let controller = Arc::new(controller(&state, &view).with_filter("silver".into()));
    controller.initialize().await;
    controller.loaded().await;
    let before = view.grid_count();

    view.slow_next_grid(Duration::from_millis(300));
    let filtering = {
        let controller = controller.clone();
        tokio::task::spawn_blocking(move || controller.apply_filter("silver".into()))
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    state.catalog_service.add(&coin("Peace", "silver")).await.unwrap();

    filtering.await.unwrap();
    view.wait_for_grids(before + 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(controller.state().all_entries().len(), 2);
    assert_eq!(view.last_grid().unwrap(), vec!["Morgan", "Peace"]);
}

#[tokio::test]
async fn test_loaded_reports_whether_the_first_load_succeeded() {
    let (state, store) = create_test_state();
    let view = RecordingView::new();
    let online = controller(&state, &view);
    online.initialize().await;
    assert!(online.loaded().await);

    store.set_offline(true).await;
    let offline = controller(&state, &view);
    offline.initialize().await;
    assert!(!offline.loaded().await);

    // A later failure does not rewrite the first outcome.
    assert!(online.loaded().await);
}

#[tokio::test]
async fn test_start_add_success() {
    let (state, _) = create_test_state();
    let view = RecordingView::new();
    let controller = controller(&state, &view);

    let id = controller.start_add(form_for(&silver_dollar())).await.unwrap();

    assert_eq!(
        busy_events(&view),
        vec![(Control::Submit, true), (Control::Submit, false)]
    );
    assert!(view.events().contains(&ViewEvent::ResetAddForm));
    let shown = view.notifications();
    assert_eq!(shown[0].message, "Entry added successfully!");
    assert_eq!(shown[0].kind, NotificationKind::Success);

    let entries = state.catalog_service.fetch_once().await.unwrap();
    assert_eq!(entries[0].id.as_ref(), Some(&id));
}

#[tokio::test]
async fn test_start_add_invalid_never_reaches_store() {
    let (state, _) = create_test_state();
    let view = RecordingView::new();
    let controller = controller(&state, &view);
    let mut form = form_for(&silver_dollar());
    form.category = String::new();

    let err = controller.start_add(form).await.unwrap_err();

    assert!(matches!(err, CatalogError::Validation { .. }));
    assert!(!view.events().contains(&ViewEvent::ResetAddForm));
    assert_eq!(busy_events(&view).last(), Some(&(Control::Submit, false)));
    let shown = view.notifications();
    assert_eq!(shown[0].kind, NotificationKind::Error);
    assert!(shown[0].message.starts_with("Error: Invalid data"));
    assert!(state.catalog_service.fetch_once().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_start_add_with_unreachable_store_releases_submit() {
    let (state, store) = create_test_state();
    store.set_offline(true).await;
    let view = RecordingView::new();
    let controller = controller(&state, &view);

    let result = controller.start_add(form_for(&silver_dollar())).await;

    assert!(matches!(result, Err(CatalogError::Transport { .. })));
    assert_eq!(busy_events(&view).last(), Some(&(Control::Submit, false)));
    assert!(
        view.notifications()[0]
            .message
            .starts_with("Error: Error adding entry")
    );
}

#[tokio::test]
async fn test_confirm_edit_preserves_identity() {
    let (state, _) = create_test_state();
    let original = silver_dollar();
    let id = state.catalog_service.add(&original).await.unwrap();
    let view = RecordingView::new();
    let controller = controller(&state, &view);
    controller.initialize().await;
    controller.loaded().await;

    controller.start_edit_by_id(&id).unwrap();
    let mut form = form_for(&original);
    form.title = "Morgan Dollar".to_string();
    controller.confirm_edit(form).await.unwrap();

    let events = view.events();
    let closed = events.iter().position(|e| *e == ViewEvent::CloseEdit).unwrap();
    let shown = events
        .iter()
        .position(|e| matches!(e, ViewEvent::Shown(_)))
        .unwrap();
    assert!(closed < shown);
    assert!(events.iter().any(|e| matches!(e, ViewEvent::OpenEdit(f) if f.title == "Silver Dollar")));
    assert_eq!(view.notifications()[0].message, "Entry updated successfully!");
    assert!(controller.state().entry_being_edited().is_none());

    let entries = state.catalog_service.fetch_once().await.unwrap();
    assert_eq!(entries[0].title, "Morgan Dollar");
    assert_eq!(entries[0].id.as_ref(), Some(&id));
    assert_eq!(entries[0].created_at, original.created_at);
}

#[tokio::test]
async fn test_failed_edit_keeps_surface_open() {
    let (state, _) = create_test_state();
    let id = state.catalog_service.add(&silver_dollar()).await.unwrap();
    let view = RecordingView::new();
    let controller = controller(&state, &view);
    controller.initialize().await;
    controller.loaded().await;

    controller.start_edit_by_id(&id).unwrap();
    let form = EntryForm {
        weight: "heavy".to_string(),
        ..form_for(&silver_dollar())
    };
    let err = controller.confirm_edit(form).await.unwrap_err();

    assert!(matches!(err, CatalogError::Validation { .. }));
    assert!(!view.events().contains(&ViewEvent::CloseEdit));
    assert_eq!(
        busy_events(&view),
        vec![(Control::Save, true), (Control::Save, false)]
    );
    assert!(controller.state().entry_being_edited().is_some());
    assert!(view.notifications()[0].message.starts_with("Error updating:"));
}

#[tokio::test]
async fn test_confirm_edit_without_target() {
    let (state, _) = create_test_state();
    let view = RecordingView::new();
    let controller = controller(&state, &view);

    let err = controller
        .confirm_edit(form_for(&silver_dollar()))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::NoEditTarget));
    assert!(busy_events(&view).is_empty());
    assert!(state.catalog_service.fetch_once().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_start_edit_by_unknown_id() {
    let (state, _) = create_test_state();
    let view = RecordingView::new();
    let controller = controller(&state, &view);

    let err = controller
        .start_edit_by_id(&EntryId::new("missing"))
        .unwrap_err();

    assert!(matches!(err, CatalogError::NotFound { .. }));
    assert_eq!(view.notifications()[0].kind, NotificationKind::Error);
}

#[tokio::test]
async fn test_cancel_edit_clears_target() {
    let (state, _) = create_test_state();
    let view = RecordingView::new();
    let controller = controller(&state, &view);

    controller.start_edit(silver_dollar());
    controller.cancel_edit();

    assert!(controller.state().entry_being_edited().is_none());
    assert_eq!(view.events().last(), Some(&ViewEvent::CloseEdit));
}

#[tokio::test]
async fn test_declined_removal_keeps_entry() {
    let (state, _) = create_test_state();
    let id = state.catalog_service.add(&silver_dollar()).await.unwrap();
    let view = RecordingView::new();
    view.answer_confirm(false);
    let controller = controller(&state, &view);

    let removed = controller.confirm_remove(&id).await.unwrap();

    assert!(!removed);
    assert!(view.events().contains(&ViewEvent::Confirm(
        "Are you sure you want to remove this entry?".to_string()
    )));
    assert!(view.notifications().is_empty());
    assert_eq!(state.catalog_service.fetch_once().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_confirmed_removal() {
    let (state, _) = create_test_state();
    let id = state.catalog_service.add(&silver_dollar()).await.unwrap();
    let view = RecordingView::new();
    let controller = controller(&state, &view);

    let removed = controller.confirm_remove(&id).await.unwrap();

    assert!(removed);
    assert_eq!(view.notifications()[0].message, "Entry removed successfully!");
    assert!(state.catalog_service.fetch_once().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lost_connection_is_notified() {
    let (state, store) = create_test_state();
    let view = RecordingView::new();
    let controller = controller(&state, &view);
    controller.initialize().await;
    controller.loaded().await;

    store.set_offline(true).await;
    tokio::time::timeout(common::DELIVERY_TIMEOUT, async {
        while view.notifications().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let shown = view.notifications();
    assert_eq!(shown[0].kind, NotificationKind::Error);
    assert!(
        shown[0]
            .message
            .starts_with("Error connecting to the database:")
    );
}

#[tokio::test]
async fn test_shutdown_stops_rendering() {
    let (state, _) = create_test_state();
    let view = RecordingView::new();
    let controller = controller(&state, &view);
    controller.initialize().await;
    controller.loaded().await;

    controller.shutdown().await;
    let rendered = view.grid_count();
    state.catalog_service.add(&silver_dollar()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(view.grid_count(), rendered);
}

#[tokio::test(start_paused = true)]
async fn test_only_latest_notification_is_dismissed_by_its_timer() {
    let (state, _) = create_test_state();
    let view = RecordingView::new();
    let controller = controller(&state, &view).with_dismiss_after(Duration::from_secs(4));

    let _first = controller.notify("first", NotificationKind::Success);
    tokio::time::sleep(Duration::from_secs(2)).await;
    let second = controller.notify("second", NotificationKind::Error);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(
        !view
            .events()
            .iter()
            .any(|e| matches!(e, ViewEvent::Dismissed(_)))
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    let dismissed: Vec<_> = view
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ViewEvent::Dismissed(id) => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(dismissed, vec![second]);
}
