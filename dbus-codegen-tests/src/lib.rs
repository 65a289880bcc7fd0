//! Nothing lives here besides what `build.rs` generates into `OUT_DIR`;
//! the integration tests under `tests/` pull that code in directly with
//! `include!`.
