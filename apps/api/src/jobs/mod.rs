pub mod filter;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod pg;
pub mod query;
pub mod store;
