mod common;
mod merge_scenarios;
mod span_properties;
