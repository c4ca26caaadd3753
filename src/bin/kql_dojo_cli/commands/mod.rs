pub mod connect;
pub mod query;
pub mod tables;
pub mod generate;
