pub mod error;

pub mod client;
pub mod encode;
pub mod request;
pub mod sign;
pub mod time;
