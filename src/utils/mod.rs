pub mod macros;
pub mod response;
pub mod security;
pub mod snowflake;
pub mod state;
pub mod storage;
pub mod validate;
