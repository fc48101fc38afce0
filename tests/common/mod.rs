#![allow(dead_code)]

mod mock_pos;
mod test_server;

pub use mock_pos::MockPos;
pub use test_server::{TestServer, image_part};
