//! Shared test helpers.
//!
//! Each test module only uses a subset, so dead_code warnings are expected
//! and suppressed.

#![allow(dead_code)]

pub mod accounts;

use std::io;
use std::sync::{Arc, Mutex};

use anchor_lang::prelude::Pubkey;
use directory_client::{normalize, Identifier, IdentifierDigest};

/// Install a tracing subscriber once; honours RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` under a subscriber capped at `max_level`, returning its output and the log text
pub fn capture_logs<T>(max_level: tracing::Level, f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let output = tracing::subscriber::with_default(subscriber, f);
    (output, logs.contents())
}

/// Program id used by every test (independent of the deployed `ID`)
pub fn test_program_id() -> Pubkey {
    Pubkey::new_from_array([7u8; 32])
}

pub fn phone(raw: &str) -> (Identifier, IdentifierDigest) {
    let identifier = normalize(raw);
    let digest = identifier.digest().expect("test identifier must be valid");
    (identifier, digest)
}
