pub mod lenient;
mod models;

pub use models::*;
