// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod event_stream;
pub mod firebase_repository;
pub mod http_response;
pub mod identity_toolkit;
pub mod realtime_tree;
