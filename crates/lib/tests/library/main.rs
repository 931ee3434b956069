mod common;
mod plan_tests;
mod resolve_tests;
