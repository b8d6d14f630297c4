pub mod accounts;
pub mod board;
pub mod client;
pub mod feed;
mod record;
pub mod seed;
