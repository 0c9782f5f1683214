pub mod backend;
pub mod driver;
pub mod protocol;
