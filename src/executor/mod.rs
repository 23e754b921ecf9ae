mod core;
mod ops;

pub use self::core::{Core, Outcome};
