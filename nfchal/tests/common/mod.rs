// Shared helpers for the integration suites.

pub mod fixtures;

// The crate ships its mock-seeding helpers in `test_support`; alias them so
// tests read as `common::helpers::shared_mock_hal()`.
pub use nfchal::test_support as helpers;
