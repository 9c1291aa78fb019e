//! Common utilities shared across examples.

#![allow(dead_code)]

use std::path::PathBuf;

/// Directory holding the example fixtures.
#[must_use]
pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Initializes logging for examples.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

/// Renders settings for one initiator session with a data dictionary.
#[must_use]
pub fn client_settings(dictionary: &std::path::Path) -> String {
    format!(
        "\
[DEFAULT]
ConnectionType=initiator
HeartBtInt=30

[SESSION]
BeginString=FIX.4.4
SenderCompID=CLIENT
TargetCompID=SERVER
DataDictionary={}
",
        dictionary.display()
    )
}
