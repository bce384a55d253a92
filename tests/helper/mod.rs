//! Shared integration test utilities

#![allow(dead_code)]

pub mod index;

pub use index::{FakeIndex, create_test_engine, fixed_now};
