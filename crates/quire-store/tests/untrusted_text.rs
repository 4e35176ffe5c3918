//! Untrusted titles and bodies must land in the store verbatim.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use quire_core::{Category, NodeContent, PostRecord, ROOT_PARENT_ID};
use quire_store::{LibsqlExecutor, RemoteStore, TableNames};
use rstest::rstest;

async fn store() -> RemoteStore<LibsqlExecutor> {
    let executor = Arc::new(LibsqlExecutor::open_in_memory().await.unwrap());
    let store = RemoteStore::new(
        executor,
        "quire-it",
        TableNames::default(),
        Duration::from_secs(5),
    );
    store.ensure_schema(Category::Blog).await.unwrap();
    store.ensure_schema(Category::Wiki).await.unwrap();
    store
}

#[rstest]
#[case("It's a title")]
#[case("'); DROP TABLE posts; --")]
#[case("''''")]
#[case("back\\slash \"double\" `tick`")]
#[case("多语言 ‘curly’ quotes")]
#[tokio::test]
async fn hostile_post_titles_round_trip(#[case] title: &str) {
    let store = store().await;
    let record = PostRecord {
        title: title.to_string(),
        category: "o'clock".into(),
        post_type: String::new(),
        language: String::new(),
        is_open_source: true,
        project_name: "a'b".into(),
        thumbnail_url: "t.jpg".into(),
        body: format!("body with {title}\nand a second line"),
        published_at: None,
    };
    store.upsert_post(&record).await.unwrap();
    store.upsert_post(&record).await.unwrap();

    assert_eq!(store.post_titles().await.unwrap(), vec![title.to_string()]);
}

#[tokio::test]
async fn hostile_node_titles_resolve_to_one_row() {
    let store = store().await;
    let title = "Bob's 'notes'";
    let first = store.ensure_node(title, ROOT_PARENT_ID, true).await.unwrap();
    let second = store.ensure_node(title, ROOT_PARENT_ID, true).await.unwrap();
    assert_eq!(first, second);

    store
        .upsert_content(&NodeContent {
            node_id: first,
            body: "it's ''fine''".into(),
        })
        .await
        .unwrap();

    let nodes = store.list_nodes().await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].title, title);
}
