pub mod script;
pub mod summary;
