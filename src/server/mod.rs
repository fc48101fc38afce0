mod account;
mod booking;
pub mod dto;
mod menu;
mod multipart;
pub mod response;
mod router;
mod site;
pub mod validation;

pub use router::{AppState, create_router};
