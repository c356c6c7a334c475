//! 2d points and the distances the engines are built on.

pub mod point;

pub use point::*;
