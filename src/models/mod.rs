pub mod analyzer;
pub mod connection;
pub mod enums;
pub mod result;
pub mod sample;
pub mod template;
pub mod test_definition;

pub use analyzer::*;
pub use connection::*;
pub use result::*;
pub use sample::*;
pub use template::*;
pub use test_definition::*;
