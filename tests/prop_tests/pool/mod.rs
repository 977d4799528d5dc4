#[path = "prop_capacity.rs"]
mod prop_capacity;
