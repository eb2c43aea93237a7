pub mod influence;
pub mod tornado;
pub mod weights;
