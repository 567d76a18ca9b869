//! Test helper modules for pgw-gateway integration tests
//!
//! - fakes: in-process doubles for the asset store and classification services
//! - test_app: router wired to those doubles, plus request/response helpers

#![allow(dead_code)]

pub mod fakes;
pub mod test_app;

pub use fakes::{FakeClassifier, FakeImmich, PageRequest};
pub use test_app::{extract_json, request, unreachable_immich_router, TestApp};
