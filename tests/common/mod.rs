pub use parbuild_test_utils::init_tracing;
