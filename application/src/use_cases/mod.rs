//! Use cases (application services)

pub mod run_adapter_loop;
