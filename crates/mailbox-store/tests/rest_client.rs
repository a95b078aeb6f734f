//! Integration tests for the REST store client.
//!
//! These tests run the client against a small document tree served over
//! local HTTP, which answers the same verbs and paths as the hosted store.

#![allow(clippy::unwrap_used, clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{Map, Value, json};

use mailbox_store::{
    Error, Folder, MailStore, NewMessage, PartitionKey, StoreClient, StoreConfig,
};

#[derive(Default)]
struct Tree {
    folders: HashMap<String, Value>,
    auth_seen: Vec<String>,
    next_key: u32,
}

type Shared = Arc<Mutex<Tree>>;

async fn handle(
    State(tree): State<Shared>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> (StatusCode, Json<Value>) {
    let mut tree = tree.lock().unwrap();
    if let Some(token) = query.get("auth") {
        tree.auth_seen.push(token.clone());
    }

    let Some(path) = path.strip_suffix(".json") else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "missing .json"})));
    };
    let segments: Vec<&str> = path.split('/').collect();
    if segments.get(1) == Some(&"broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"})));
    }

    match (segments.as_slice(), method.as_str()) {
        ([_, user, folder], "GET") => {
            let key = format!("{user}/{folder}");
            let value = tree.folders.get(&key).cloned().unwrap_or(Value::Null);
            (StatusCode::OK, Json(value))
        }
        ([_, user, folder], "POST") => {
            let name = format!("-K{:04}", tree.next_key);
            tree.next_key += 1;
            let record: Value = serde_json::from_str(&body).unwrap();
            let entry = tree
                .folders
                .entry(format!("{user}/{folder}"))
                .or_insert_with(|| Value::Object(Map::new()));
            entry.as_object_mut().unwrap().insert(name.clone(), record);
            (StatusCode::OK, Json(json!({ "name": name })))
        }
        ([_, user, folder, id], "PATCH") => {
            let patch: Map<String, Value> = serde_json::from_str(&body).unwrap();
            let entry = tree
                .folders
                .entry(format!("{user}/{folder}"))
                .or_insert_with(|| Value::Object(Map::new()));
            let record = entry
                .as_object_mut()
                .unwrap()
                .entry((*id).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            record.as_object_mut().unwrap().extend(patch.clone());
            (StatusCode::OK, Json(Value::Object(patch)))
        }
        ([_, user, folder, id], "DELETE") => {
            if let Some(entries) = tree
                .folders
                .get_mut(&format!("{user}/{folder}"))
                .and_then(Value::as_object_mut)
            {
                entries.remove(*id);
            }
            (StatusCode::OK, Json(Value::Null))
        }
        _ => (StatusCode::METHOD_NOT_ALLOWED, Json(Value::Null)),
    }
}

async fn spawn_store() -> (StoreConfig, Shared) {
    let tree = Shared::default();
    let app = Router::new()
        .route("/*path", any(handle))
        .with_state(tree.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (StoreConfig::new(format!("http://{addr}")).unwrap(), tree)
}

fn alice() -> PartitionKey {
    PartitionKey::from_email("alice@example.com")
}

#[tokio::test]
async fn test_list_absent_folder_is_empty() {
    let (config, _tree) = spawn_store().await;
    let client = StoreClient::new(config);

    let records = client.list(&alice(), Folder::Inbox).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_create_returns_generated_key() {
    let (config, tree) = spawn_store().await;
    let client = StoreClient::new(config);
    let message = NewMessage::now("bob@example.com", "alice@example.com", "Hi", "<p>hello</p>");

    let id = client.create(&alice(), Folder::Inbox, &message).await.unwrap();
    assert_eq!(id, "-K0000");

    let stored = tree.lock().unwrap().folders["alice@example_com/inbox"].clone();
    assert_eq!(stored[&id]["subject"], "Hi");
    assert_eq!(stored[&id]["read"], false);

    let records = client.list(&alice(), Folder::Inbox).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].from, "bob@example.com");
    assert!(!records[0].read);
}

#[tokio::test]
async fn test_list_sequence_shape() {
    let (config, tree) = spawn_store().await;
    tree.lock().unwrap().folders.insert(
        "alice@example_com/sent".to_string(),
        json!([null, {"subject": "legacy", "to": "bob@example.com"}]),
    );
    let client = StoreClient::new(config);

    let records = client.list(&alice(), Folder::Sent).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "1");
    assert!(records[0].read, "sent records default to read");
}

#[tokio::test]
async fn test_set_read_patches_only_the_flag() {
    let (config, tree) = spawn_store().await;
    tree.lock().unwrap().folders.insert(
        "alice@example_com/inbox".to_string(),
        json!({"k1": {"subject": "one", "read": false}}),
    );
    let client = StoreClient::new(config);

    client.set_read(&alice(), Folder::Inbox, "k1", true).await.unwrap();

    let records = client.list(&alice(), Folder::Inbox).await.unwrap();
    assert!(records[0].read);
    assert_eq!(records[0].subject, "one");
}

#[tokio::test]
async fn test_delete_removes_record() {
    let (config, tree) = spawn_store().await;
    tree.lock().unwrap().folders.insert(
        "alice@example_com/inbox".to_string(),
        json!({"k1": {"subject": "one"}, "k2": {"subject": "two"}}),
    );
    let client = StoreClient::new(config);

    client.delete(&alice(), Folder::Inbox, "k1").await.unwrap();

    let records = client.list(&alice(), Folder::Inbox).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "k2");
}

#[tokio::test]
async fn test_non_success_is_an_error() {
    let (config, _tree) = spawn_store().await;
    let client = StoreClient::new(config);
    let broken = PartitionKey::from_email("broken");

    let result = client.list(&broken, Folder::Inbox).await;
    assert!(matches!(result, Err(Error::Status { status: 500, .. })));

    let message = NewMessage::now("a@x.com", "broken", "s", "m");
    let result = client.create(&broken, Folder::Inbox, &message).await;
    assert!(matches!(result, Err(Error::Status { status: 500, .. })));

    let result = client.delete(&broken, Folder::Inbox, "k1").await;
    assert!(matches!(result, Err(Error::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_auth_token_sent_with_every_request() {
    let (config, tree) = spawn_store().await;
    let client = StoreClient::new(config).with_auth_token("id-token");

    client.list(&alice(), Folder::Inbox).await.unwrap();
    client.delete(&alice(), Folder::Inbox, "missing").await.unwrap();

    assert_eq!(tree.lock().unwrap().auth_seen, vec!["id-token", "id-token"]);
}
