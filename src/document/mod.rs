//! Scene documents: a JSON description of a tree and an animation schedule.

/// Building a document into a live scene and stepping it frame by frame.
pub mod build;
/// Serde model and validation.
pub mod model;

pub use build::{FrameReport, PlacedEntity, Scene};
pub use model::SceneDocument;
