//! User Listing API Tests

use serde_json::Value;

use chatroom::domain::User;

use crate::common::TestApp;

#[tokio::test]
async fn test_users_empty_room() {
    let app = TestApp::new();

    let response = app.server.get("/users").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), serde_json::json!([]));
}

#[tokio::test]
async fn test_users_lists_logged_in_members() {
    let app = TestApp::new();
    let (bob, _bob_rx) = User::new("bob", "10.0.0.2:4000", 8);
    let (alice, _alice_rx) = User::new("alice", "10.0.0.1:4000", 8);
    app.state.hub.login(bob).await.unwrap();
    app.state.hub.login(alice).await.unwrap();

    for path in ["/users", "/user_list"] {
        let response = app.server.get(path).await;
        response.assert_status_ok();

        let users: Vec<Value> = response.json();
        let names: Vec<&str> = users.iter().map(|u| u["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(users[0]["address"], "10.0.0.1:4000");
        assert!(users[0].get("outbox").is_none());
    }
}
