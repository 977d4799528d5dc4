#[path = "prop_expiry.rs"]
mod prop_expiry;
