pub mod connection;
pub mod filter;
pub mod rowset;
pub mod schema;
