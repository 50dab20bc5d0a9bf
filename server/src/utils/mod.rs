pub mod error;
pub mod pagination;
pub mod path;
pub mod payload;
pub mod response;
