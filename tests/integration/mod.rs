//! Integration tests for the TimeVouch registration client

mod client_http;
mod composition_layout;
mod determinism;
mod test_server;
