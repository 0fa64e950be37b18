//! WebSocket Chat Flow Tests

use futures::SinkExt;
use serde_json::json;

use crate::common::{connect, next_json, next_of_type, send_json, spawn_app};

#[tokio::test]
async fn test_welcome_is_first_frame() {
    let addr = spawn_app().await;
    let mut alice = connect(addr, "alice").await;

    let welcome = next_json(&mut alice).await.expect("welcome frame");
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["content"], "hello: alice ,welcome to the chatroom!");
    assert_eq!(welcome["from_user"]["name"], "alice");
}

#[tokio::test]
async fn test_chat_reaches_others_but_not_author() {
    let addr = spawn_app().await;
    let mut alice = connect(addr, "alice").await;
    next_of_type(&mut alice, "welcome").await;
    let mut bob = connect(addr, "bob").await;
    next_of_type(&mut bob, "welcome").await;

    let joined = next_of_type(&mut alice, "user_joined").await;
    assert_eq!(joined["content"], "bob has entered the chatroom!");

    send_json(&mut alice, json!({"type": "chat", "content": "hello @bob"})).await;

    let chat = next_of_type(&mut bob, "normal").await;
    assert_eq!(chat["content"], "hello @bob");
    assert_eq!(chat["from_user"]["name"], "alice");
    assert_eq!(chat["mentions"], json!(["bob"]));

    // Alice's next frame is her own listing, not an echo of her chat.
    send_json(&mut alice, json!({"type": "list_users"})).await;
    let next = next_json(&mut alice).await.expect("listing frame");
    assert_eq!(next["type"], "user_listing");
    let content = next["content"].as_str().unwrap();
    assert!(content.starts_with("Current users: "));
    assert!(content.contains("alice") && content.contains("bob"));
}

#[tokio::test]
async fn test_plain_text_frames_are_chat() {
    let addr = spawn_app().await;
    let mut alice = connect(addr, "alice").await;
    next_of_type(&mut alice, "welcome").await;
    let mut bob = connect(addr, "bob").await;
    next_of_type(&mut bob, "welcome").await;

    alice
        .send(tokio_tungstenite::tungstenite::Message::Text("just text".into()))
        .await
        .unwrap();

    let chat = next_of_type(&mut bob, "normal").await;
    assert_eq!(chat["content"], "just text");
}

#[tokio::test]
async fn test_duplicate_name_is_rejected() {
    let addr = spawn_app().await;
    let mut first = connect(addr, "alice").await;
    next_of_type(&mut first, "welcome").await;

    let mut second = connect(addr, "alice").await;
    let error = next_json(&mut second).await.expect("error frame");
    assert_eq!(error["type"], "error");
    assert_eq!(error["content"], "duplicate login");
    assert!(next_json(&mut second).await.is_none());
}

#[tokio::test]
async fn test_invalid_name_is_rejected() {
    let addr = spawn_app().await;
    let mut client = connect(addr, "u").await;

    let error = next_json(&mut client).await.expect("error frame");
    assert_eq!(error["type"], "error");
    assert_eq!(error["content"], "invalid user input");
    assert!(next_json(&mut client).await.is_none());
}

#[tokio::test]
async fn test_disconnect_announces_leave_and_frees_name() {
    let addr = spawn_app().await;
    let mut alice = connect(addr, "alice").await;
    next_of_type(&mut alice, "welcome").await;
    let mut bob = connect(addr, "bob").await;
    next_of_type(&mut bob, "welcome").await;

    bob.close(None).await.unwrap();

    let left = next_of_type(&mut alice, "user_left").await;
    assert_eq!(left["content"], "bob has exited the chatroom!");

    let mut bob_again = connect(addr, "bob").await;
    let welcome = next_json(&mut bob_again).await.expect("welcome frame");
    assert_eq!(welcome["type"], "welcome");
}

#[tokio::test]
async fn test_new_user_receives_history_in_order() {
    let addr = spawn_app().await;
    let mut alice = connect(addr, "alice").await;
    next_of_type(&mut alice, "welcome").await;
    let mut bob = connect(addr, "bob").await;
    next_of_type(&mut bob, "welcome").await;

    for i in 0..3 {
        send_json(&mut alice, json!({"type": "chat", "content": format!("msg {i}")})).await;
    }
    for _ in 0..3 {
        next_of_type(&mut bob, "normal").await;
    }

    let mut carol = connect(addr, "carol").await;
    let welcome = next_json(&mut carol).await.expect("welcome frame");
    assert_eq!(welcome["type"], "welcome");
    for i in 0..3 {
        let replayed = next_json(&mut carol).await.expect("history frame");
        assert_eq!(replayed["type"], "normal");
        assert_eq!(replayed["content"], format!("msg {i}"));
    }
}
