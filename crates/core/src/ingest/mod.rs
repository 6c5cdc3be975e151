pub mod feed;
pub mod seed;
pub mod types;
