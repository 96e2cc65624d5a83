//! Registry behaviour under concurrent callers

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use supportdesk_conversations::{Conversation, ConversationRegistry, Role};

use common::TestApp;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_get_or_create_builds_once() {
    let app = TestApp::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let providers = app.providers.clone();
    let registry = Arc::new(ConversationRegistry::new(Box::new(
        move |id, name, description| {
            counter.fetch_add(1, Ordering::SeqCst);
            Conversation::new(id, name, description, providers.clone())
        },
    )));

    let mut handles = Vec::new();
    for n in 0..32 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            let name = format!("caller-{}", n);
            registry.get_or_create("shared", Some(&name), None)
        }));
    }

    let mut conversations = Vec::new();
    for handle in handles {
        conversations.push(handle.await.unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(registry.count(), 1);
    let first = &conversations[0];
    assert!(conversations.iter().all(|c| Arc::ptr_eq(c, first)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_are_all_kept() {
    let app = TestApp::new();
    let registry = Arc::clone(&app.registry);

    let mut handles = Vec::new();
    for worker in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            for n in 0..50 {
                let conv = registry.get_or_create("busy", None, None);
                let mut conv = conv.lock();
                let id = format!("w{}-m{}", worker, n);
                if n % 2 == 0 {
                    conv.add_customer_message(id, format!("cust-{}", worker), "hi", Some(1));
                } else {
                    conv.add_robot_message(id, "robot", "note", Some(1));
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let conv = registry.get_by_id("busy").unwrap();
    let conv = conv.lock();
    assert_eq!(conv.len(), 400);
    assert_eq!(conv.get_customer_visible_messages().len(), 200);
    assert_eq!(conv.get_conversation_for_role(Role::Agent).len(), 400);

    // Per-worker order is preserved inside the shared sequence
    for worker in 0..8 {
        let prefix = format!("w{}-", worker);
        let mine: Vec<String> = conv
            .messages()
            .filter(|m| m.id.starts_with(&prefix))
            .map(|m| m.id.clone())
            .collect();
        let expected: Vec<String> = (0..50).map(|n| format!("w{}-m{}", worker, n)).collect();
        assert_eq!(mine, expected);
    }
}

#[tokio::test]
async fn test_many_conversations_do_not_crash() {
    let app = TestApp::new();
    for n in 0..1_000 {
        let conv = app.registry.get_or_create(&format!("c{}", n), None, None);
        conv.lock().add_customer_message("m1", "cust", "Hello", None);
    }
    assert_eq!(app.registry.count(), 1_000);

    app.registry.clear();
    assert_eq!(app.registry.count(), 0);
    assert!(app.registry.all_ids().is_empty());
}
