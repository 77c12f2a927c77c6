pub mod bridge;
pub mod store;
