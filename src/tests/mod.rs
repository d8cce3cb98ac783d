// Test modules

pub mod common;
