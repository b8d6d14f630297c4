pub mod board;
pub mod feed;
pub mod model;
pub mod outcome;
pub mod reaction;
pub mod snowflake;
