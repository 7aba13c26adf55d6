use std::sync::Arc;

use flowstate::datastore::{DataEntry, DataStore, DataStoreExt, MemoryDataStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    visits: u32,
}

fn profile_entry() -> DataEntry<Profile> {
    DataEntry::new(
        "profile",
        Profile {
            name: "guest".to_string(),
            visits: 0,
        },
    )
}

#[tokio::test]
async fn typed_access_works_through_a_trait_object() {
    let store: Arc<dyn DataStore> = Arc::new(MemoryDataStore::new());
    let entry = profile_entry();

    assert_eq!(store.get(&entry).await, None);

    let profile = Profile {
        name: "zoe".to_string(),
        visits: 3,
    };
    store.set(&entry, profile.clone()).await.unwrap();
    assert_eq!(store.get(&entry).await, Some(profile));

    store.delete(&entry).await;
    assert_eq!(store.get(&entry).await, None);
}

#[tokio::test]
async fn observe_emits_default_until_a_value_is_set() {
    let store: Arc<dyn DataStore> = Arc::new(MemoryDataStore::new());
    let entry = DataEntry::new("visits", 0u32);

    let mut watch = store.observe(&entry);
    assert_eq!(watch.next().await, Some(0));

    store.set(&entry, 12).await.unwrap();
    assert_eq!(watch.next().await, Some(12));
}

#[tokio::test]
async fn observers_on_different_keys_are_isolated() {
    let store = MemoryDataStore::new();
    let visits = DataEntry::new("visits", 0u32);
    let name = DataEntry::new("name", "guest".to_string());

    let mut visits_watch = store.observe(&visits);
    assert_eq!(visits_watch.next().await, Some(0));

    store.set(&name, "zoe".to_string()).await.unwrap();
    store.set(&visits, 1).await.unwrap();

    // The visits observer never sees the name write.
    assert_eq!(visits_watch.next().await, Some(1));
}

#[tokio::test]
async fn stored_values_survive_multiple_readers() {
    let store = Arc::new(MemoryDataStore::new());
    let entry = DataEntry::new("visits", 0u32);
    store.set(&entry, 5).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = Arc::clone(&store);
        let entry = entry.clone();
        handles.push(tokio::spawn(async move { store.get(&entry).await }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(5));
    }
}
