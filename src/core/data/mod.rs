//! Authoring data: zone manifests and their loaders.

pub mod zone;
