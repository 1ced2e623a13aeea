//! Retention window behavior
//!
//! Works live for exactly 24 hours. The boundary is strict: a work is
//! evicted only once its age exceeds the window.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{mock_config, sample_source};
use relume_restoration::{RestorationMode, SubmitOutcome};
use relume_works::{retention, ExpiryScheduler, WorkGallery, WorkItem, WorkKind};

fn photo_created_at(created_at: chrono::DateTime<Utc>) -> WorkItem {
    WorkItem::new(
        WorkKind::Photo,
        "Restored Memory",
        "data:image/png;base64,AA",
        created_at,
    )
}

#[tokio::test]
async fn test_sweep_respects_the_24h_boundary() {
    let gallery = WorkGallery::new();
    let t0 = Utc::now();
    let id = {
        let item = photo_created_at(t0);
        let id = item.id;
        gallery.insert(item).unwrap();
        id
    };

    // Still present at 23h
    assert!(gallery
        .sweep_expired(t0 + chrono::Duration::hours(23), retention())
        .is_empty());
    assert_eq!(gallery.len(), 1);

    // Gone one second past 24h
    let swept = gallery.sweep_expired(
        t0 + chrono::Duration::hours(24) + chrono::Duration::seconds(1),
        retention(),
    );
    assert_eq!(swept, vec![id]);
    assert!(gallery.is_empty());

    // Sweeping again is a no-op
    assert!(gallery
        .sweep_expired(
            t0 + chrono::Duration::hours(24) + chrono::Duration::seconds(2),
            retention()
        )
        .is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_evicts_on_its_period() {
    let gallery = Arc::new(WorkGallery::new());
    gallery
        .insert(photo_created_at(Utc::now() - chrono::Duration::hours(25)))
        .unwrap();

    let scheduler = ExpiryScheduler::start(gallery.clone(), Duration::from_secs(60), retention());
    tokio::task::yield_now().await;

    tokio::time::advance(Duration::from_secs(61)).await;
    tokio::task::yield_now().await;
    assert!(gallery.is_empty());

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_full_app_sweeps_stale_works_in_the_background() {
    let app = relume_app::create_app(mock_config()).await.unwrap();

    // A fresh restoration plus a work that predates the window
    let outcome = app
        .flow
        .submit(sample_source(), RestorationMode::Photo)
        .await
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
    app.gallery
        .insert(photo_created_at(Utc::now() - chrono::Duration::hours(25)))
        .unwrap();
    assert_eq!(app.gallery.len(), 2);

    // Let the background sweep register its ticker before moving the clock
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(61)).await;
    tokio::task::yield_now().await;

    let items = app.gallery.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, WorkKind::Photo);
    assert!(items[0].created_at > Utc::now() - chrono::Duration::hours(1));

    app.shutdown().await;
}

#[tokio::test]
async fn test_user_bulk_delete_removes_selected_works() {
    let gallery = WorkGallery::new();
    let now = Utc::now();
    let keep = photo_created_at(now);
    let drop_a = photo_created_at(now);
    let drop_b = photo_created_at(now);
    let doomed = HashSet::from([drop_a.id, drop_b.id]);

    gallery.insert(keep.clone()).unwrap();
    gallery.insert(drop_a).unwrap();
    gallery.insert(drop_b).unwrap();

    assert_eq!(gallery.remove_many(&doomed), 2);
    let items = gallery.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, keep.id);
}
