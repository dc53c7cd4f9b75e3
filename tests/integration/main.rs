//! Integration tests for trade-journal

mod session_test;
mod store_test;
