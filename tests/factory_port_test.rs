use promarket::domain::ports::{
    BookingStoreBox, BookingStoreFactory, ProfileStoreBox, ProfileStoreFactory,
};
use promarket::domain::profile::ProfessionalProfile;
use promarket::infrastructure::in_memory::{InMemoryBookingStore, InMemoryProfileStore};
use uuid::Uuid;

#[tokio::test]
async fn test_factory_instantiation() {
    let factory: ProfileStoreFactory =
        Box::new(|| Box::new(InMemoryProfileStore::new()) as ProfileStoreBox);

    let store = factory();
    let profile = ProfessionalProfile::new(Uuid::new_v4(), "Lisbon");
    let profile_id = profile.id;

    // Verify it works
    store.put_profile(profile).await.unwrap();
    let retrieved = store.get_profile(profile_id).await.unwrap().unwrap();
    assert_eq!(retrieved.id, profile_id);
}

#[tokio::test]
async fn test_factory_in_task() {
    let factory: BookingStoreFactory =
        Box::new(|| Box::new(InMemoryBookingStore::new()) as BookingStoreBox);

    let handle = tokio::spawn(async move {
        let store = factory();
        // A fresh store from the factory starts empty.
        store.get(Uuid::new_v4()).await.unwrap()
    });

    assert!(handle.await.unwrap().is_none());
}
