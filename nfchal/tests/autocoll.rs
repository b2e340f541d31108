// Aggregator for autocoll integration tests in `tests/autocoll/`.

#[path = "autocoll/type_b_quirk_test.rs"]
mod type_b_quirk_test;

#[path = "autocoll/short_frame_test.rs"]
mod short_frame_test;

#[path = "autocoll/activation_flow_test.rs"]
mod activation_flow_test;
