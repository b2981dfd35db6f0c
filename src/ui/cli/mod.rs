pub mod args;
pub mod drivers;
