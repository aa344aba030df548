//! Client-side input and character control.

pub mod controller;
pub mod input;
