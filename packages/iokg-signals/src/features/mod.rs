//! Feature modules

pub mod parsing;
pub mod signals;
