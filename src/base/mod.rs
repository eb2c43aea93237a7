pub mod base;
pub mod bounds;
pub mod midpoint;
pub mod statement;
