//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use maxemail::{Client, Credentials, Logger};
use maxemail_client::LogContext;
use tracing::Level;
use wiremock::MockServer;

/// One captured log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub level: Level,
    pub message: String,
    pub context: Vec<(String, String)>,
}

/// Logger that keeps every call for later assertions.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<Entry>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message)
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str, context: LogContext<'_>) {
        self.entries.lock().unwrap().push(Entry {
            level,
            message: message.to_string(),
            context: context
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }
}

/// Token-authenticated client pointed at the mock server.
pub fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .credentials(Credentials::token("apitoken"))
        .uri(server.uri())
        .build()
        .unwrap()
}
