//! Log output for demos and the viewer app

use env_logger::{Builder, Env};

/// Installs an `env_logger` backend filtered by `RUST_LOG`, defaulting to
/// `info`. Returns false if a logger was already installed.
pub fn init_logging() -> bool {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        assert!(!init_logging());
    }
}
