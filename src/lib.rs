//! Skein - text buffer core for a native code editor

pub mod buffer;
pub mod bytecounts;
pub mod codec;
pub mod error;
pub mod history;
pub mod marks;
pub mod position;
pub mod shared;
