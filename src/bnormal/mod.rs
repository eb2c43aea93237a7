pub mod bnormal;
pub mod owen;
pub mod phi;
