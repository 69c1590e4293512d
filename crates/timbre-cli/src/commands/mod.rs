pub mod aggregate;
pub mod compare;
pub mod config;
pub mod features;
pub mod matrix;
pub mod neighbors;
pub mod project;
pub mod trends;
