pub mod dmc;
