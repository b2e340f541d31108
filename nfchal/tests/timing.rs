// Aggregator for timing integration tests in `tests/timing/`.

#[path = "timing/ceiling_test.rs"]
mod ceiling_test;

#[path = "timing/wait_chain_test.rs"]
mod wait_chain_test;
