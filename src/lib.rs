//! Mossblade: a small third-person action prototype.
//!
//! A player character runs over procedurally generated terrain covered in
//! streamed, wind-animated grass, and trades melee blows with a handful of
//! raiders. The interesting machinery lives in `gfx::grass` (patch streaming
//! with two LODs) and `core::combat` (attack state machines and hitboxes).

pub mod client;
pub mod core;
pub mod gfx;
pub mod platform_winit;
