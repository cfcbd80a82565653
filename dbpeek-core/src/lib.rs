pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod viewer;

pub use viewer::{Grid, Viewer};
