//! Game-core logic: entities, combat resolution, enemy AI, zone data.

pub mod ai;
pub mod combat;
pub mod data;
pub mod entity;
