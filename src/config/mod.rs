mod server;

pub use server::{DEFAULT_POS_BASE_URL, FileConfig, ServerConfig};
