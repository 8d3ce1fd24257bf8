// Utility functions

pub mod logger;
pub mod privacy;
pub mod text;

pub use logger::*;
pub use privacy::*;
pub use text::*;
