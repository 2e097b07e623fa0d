pub mod calculator;
pub mod format;
pub mod history;
pub mod interest;

pub use calculator::{evaluate, CalcError};
