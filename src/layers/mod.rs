pub mod base;
pub mod image;
pub mod manager;
pub mod vector;
