//! Behaviour every `ConversationStore` backend must share.
//!
//! Each check is a plain async function over `impl ConversationStore`;
//! `store_contract!` instantiates the whole suite for one backend.

use std::sync::Arc;

use threadline_core::store::ConversationStore;
use threadline_types::error::StoreError;
use threadline_types::message::Message;

pub const BOT: &str = "bot";

fn msg(from: &str, text: &str, ts: &str, thread_ts: &str) -> Message {
    Message::new(from, text, ts, thread_ts, "c1")
}

pub async fn idempotent_insert(store: &impl ConversationStore) {
    let m = msg("u1", "<@bot> hi", "100.000001", "");
    assert_eq!(store.on_message(&m).await, Ok(true));
    assert_eq!(store.on_message(&m).await, Ok(false));

    let cv = store.get_conversation("100.000001").await.unwrap();
    assert_eq!(cv.len(), 1);
    assert_eq!(cv.messages()[0], m);
}

pub async fn unrelated_message_dropped(store: &impl ConversationStore) {
    let m = msg("u1", "anyone around?", "100.000001", "");
    assert_eq!(store.on_message(&m).await, Ok(false));
    assert_eq!(
        store.get_conversation("100.000001").await,
        Err(StoreError::NotFound("100.000001".to_string()))
    );
}

pub async fn mention_of_someone_else_dropped(store: &impl ConversationStore) {
    let m = msg("u1", "<@U999> hi", "100.000001", "");
    assert_eq!(store.on_message(&m).await, Ok(false));
    assert!(store.get_conversation("100.000001").await.is_err());
}

pub async fn thread_created_by_mention(store: &impl ConversationStore) {
    let m = msg("u1", "<@bot> hi", "100", "");
    assert_eq!(store.on_message(&m).await, Ok(true));

    let cv = store.get_conversation("100").await.unwrap();
    assert_eq!(cv.thread_id(), "100");
    assert_eq!(cv.channel(), "c1");
    assert_eq!(cv.initiator(), "u1");
}

pub async fn replies_join_existing_thread(store: &impl ConversationStore) {
    store.on_message(&msg("u1", "<@bot> hi", "100", "")).await.unwrap();
    assert_eq!(store.on_message(&msg("u2", "me too", "110", "100")).await, Ok(true));
    assert_eq!(store.on_message(&msg("u1", "more", "120", "100")).await, Ok(true));

    let cv = store.get_conversation("100").await.unwrap();
    assert_eq!(cv.len(), 3);
    assert_eq!(cv.initiator(), "u1");
    assert!(!cv.is_from_initiator(&cv.messages()[1]));
}

pub async fn ordered_by_created_at(store: &impl ConversationStore) {
    store
        .on_message(&msg("u1", "<@bot> hi", "1685790080.100000", ""))
        .await
        .unwrap();
    // Delivered out of order.
    for ts in ["1685790093.000000", "1685790081.000000", "1685790085.500000"] {
        assert_eq!(
            store.on_message(&msg("u1", ts, ts, "1685790080.100000")).await,
            Ok(true)
        );
    }

    let cv = store.get_conversation("1685790080.100000").await.unwrap();
    let ts: Vec<&str> = cv.messages().iter().map(|m| m.timestamp()).collect();
    assert_eq!(
        ts,
        vec![
            "1685790080.100000",
            "1685790081.000000",
            "1685790085.500000",
            "1685790093.000000",
        ]
    );
}

pub async fn concurrent_duplicates_added_once<S>(store: Arc<S>)
where
    S: ConversationStore + 'static,
{
    store.on_message(&msg("u1", "<@bot> hi", "100", "")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            // Half the deliveries carry the same timestamp, half are distinct.
            let ts = if i % 2 == 0 { "110".to_string() } else { format!("{}", 120 + i) };
            store.on_message(&msg("u1", "followup", &ts, "100")).await.unwrap()
        }));
    }
    let mut added = 0;
    for h in handles {
        if h.await.unwrap() {
            added += 1;
        }
    }
    assert_eq!(added, 5);

    let cv = store.get_conversation("100").await.unwrap();
    assert_eq!(cv.len(), 6);
    let mut ts: Vec<&str> = cv.messages().iter().map(|m| m.timestamp()).collect();
    ts.dedup();
    assert_eq!(ts.len(), 6);
}

pub async fn concurrent_thread_creation_added_once<S>(store: Arc<S>)
where
    S: ConversationStore + 'static,
{
    // Webhook retries redeliver the thread-opening mention.
    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.on_message(&msg("u1", "<@bot> hi", "100", "")).await.unwrap()
        }));
    }
    let mut added = 0;
    for h in handles {
        if h.await.unwrap() {
            added += 1;
        }
    }
    assert_eq!(added, 1);

    let cv = store.get_conversation("100").await.unwrap();
    assert_eq!(cv.len(), 1);
    assert_eq!(cv.initiator(), "u1");
}

/// Instantiate the contract suite for one backend.
///
/// `$make` is an async block evaluating to `(store, guard)`; the guard keeps
/// any temporary directory alive for the duration of the test.
macro_rules! store_contract {
    ($name:ident, $make:expr) => {
        mod $name {
            use super::*;

            #[tokio::test]
            async fn idempotent_insert() {
                let (store, _guard) = $make.await;
                contract::idempotent_insert(&store).await;
            }

            #[tokio::test]
            async fn unrelated_message_dropped() {
                let (store, _guard) = $make.await;
                contract::unrelated_message_dropped(&store).await;
            }

            #[tokio::test]
            async fn mention_of_someone_else_dropped() {
                let (store, _guard) = $make.await;
                contract::mention_of_someone_else_dropped(&store).await;
            }

            #[tokio::test]
            async fn thread_created_by_mention() {
                let (store, _guard) = $make.await;
                contract::thread_created_by_mention(&store).await;
            }

            #[tokio::test]
            async fn replies_join_existing_thread() {
                let (store, _guard) = $make.await;
                contract::replies_join_existing_thread(&store).await;
            }

            #[tokio::test]
            async fn ordered_by_created_at() {
                let (store, _guard) = $make.await;
                contract::ordered_by_created_at(&store).await;
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn concurrent_duplicates_added_once() {
                let (store, _guard) = $make.await;
                contract::concurrent_duplicates_added_once(std::sync::Arc::new(store)).await;
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn concurrent_thread_creation_added_once() {
                let (store, _guard) = $make.await;
                contract::concurrent_thread_creation_added_once(std::sync::Arc::new(store))
                    .await;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract;
    use crate::document::DocumentConversationStore;
    use crate::memory::MemoryConversationStore;
    use crate::sqlite::{DatabasePool, SqliteConversationStore};
    use threadline_core::store::BoxConversationStore;

    store_contract!(memory, async { (MemoryConversationStore::new(BOT), ()) });

    store_contract!(sqlite, async {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("contract.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (SqliteConversationStore::new(pool, BOT), dir)
    });

    store_contract!(document, async {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentConversationStore::open(dir.path().join("conversations"), BOT)
            .await
            .unwrap();
        (store, dir)
    });

    store_contract!(boxed, async {
        (BoxConversationStore::new(MemoryConversationStore::new(BOT)), ())
    });
}
