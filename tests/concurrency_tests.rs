use async_trait::async_trait;
use chrono::{Duration, Utc};
use promarket::application::booking::BookingLifecycle;
use promarket::domain::booking::{Booking, BookingStatus};
use promarket::domain::payment::Money;
use promarket::domain::ports::MetricsHooks;
use promarket::error::{MarketError, Result};
use promarket::infrastructure::in_memory::InMemoryBookingStore;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

#[derive(Default)]
struct CountingHooks {
    completed: AtomicUsize,
}

#[async_trait]
impl MetricsHooks for CountingHooks {
    async fn on_booking_completed(&self, _professional_id: Uuid) -> Result<()> {
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn on_booking_cancelled(&self, _professional_id: Uuid) -> Result<()> {
        Ok(())
    }
}

fn booking(professional_id: Uuid) -> Booking {
    Booking::new(
        Uuid::new_v4(),
        professional_id,
        Uuid::new_v4(),
        Utc::now() + Duration::days(1),
        Money(dec!(100.00)),
        "EUR",
    )
}

#[tokio::test]
async fn test_interleaved_updates_across_bookings() {
    let hooks = Arc::new(CountingHooks::default());
    let lifecycle = Arc::new(BookingLifecycle::new(
        Box::new(InMemoryBookingStore::new()),
        hooks.clone(),
    ));

    // Bookings for distinct professionals complete concurrently without
    // crossing owners.
    let mut handles = Vec::new();
    for _ in 0..20 {
        let lifecycle = Arc::clone(&lifecycle);
        handles.push(tokio::spawn(async move {
            let professional_id = Uuid::new_v4();
            let created = lifecycle.create_booking(booking(professional_id)).await?;
            lifecycle
                .update_status(created.id, BookingStatus::Completed, professional_id)
                .await
        }));
    }

    for handle in handles {
        let completed = handle.await.unwrap().unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        assert!(completed.completion_date.is_some());
    }
    assert_eq!(hooks.completed.load(Ordering::SeqCst), 20);
}

#[tokio::test]
async fn test_racing_duplicate_updates_on_one_booking() {
    let lifecycle = Arc::new(BookingLifecycle::new(
        Box::new(InMemoryBookingStore::new()),
        Arc::new(CountingHooks::default()),
    ));
    let professional_id = Uuid::new_v4();
    let created = lifecycle
        .create_booking(booking(professional_id))
        .await
        .unwrap();

    // Duplicate confirm requests race on the same booking. Each either wins
    // or is rejected for an impossible transition; none may corrupt state.
    let mut handles = Vec::new();
    for _ in 0..10 {
        let lifecycle = Arc::clone(&lifecycle);
        let booking_id = created.id;
        handles.push(tokio::spawn(async move {
            lifecycle
                .update_status(booking_id, BookingStatus::Confirmed, professional_id)
                .await
        }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(updated) => {
                assert_eq!(updated.status, BookingStatus::Confirmed);
                wins += 1;
            }
            Err(MarketError::InvalidTransition(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert!(wins >= 1);

    let detail = lifecycle
        .booking_detail(created.id, professional_id)
        .await
        .unwrap();
    assert_eq!(detail.status, BookingStatus::Confirmed);
    assert!(detail.completion_date.is_none());
}
