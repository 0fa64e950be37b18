mod health_tests;
mod users_tests;
mod websocket_tests;
