//! Repository layer: entity-scoped database operations.
//!
//! Plain functions over a borrowed `Connection`; callers decide the
//! connection's lifetime and any surrounding transaction.

mod analyzer;
mod connection_settings;
mod result;
mod sample;
mod template;
mod test_definition;

pub use analyzer::*;
pub use connection_settings::*;
pub use result::*;
pub use sample::*;
pub use template::*;
pub use test_definition::*;
