//! FFI bridge crate for the dashboard UI.
//! Exposes `annolab_core` use-cases as flutter_rust_bridge functions.

pub mod api;
