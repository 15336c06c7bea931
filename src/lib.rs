//! Trellis is a retained-mode scene-graph compositor.
//!
//! A tree of [`RenderNode`]s renders to a nested [`Spec`] every frame. That tree is resolved
//! into absolute [`Placement`]s which are committed onto registered visual targets such as
//! [`Surface`]. Modifier properties animate through queued, time-based transitions:
//!
//! - Build a tree under a [`Context`] (or load one from a [`SceneDocument`])
//! - Drive properties through [`Transitionable`] / [`TransitionableTransform`]
//! - Call [`Context::update`] once per frame
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Curves, transition engines and animated state.
pub mod animation;
/// JSON scene documents and the frame runner built on them.
pub mod document;
/// Entity registry, element pool and the built-in surface target.
pub mod entity;
/// Render tree, modifiers, spec resolution and commit.
pub mod scene;
/// 4x4 affine matrix algebra and decomposition.
pub mod transform;

pub use crate::foundation::callback::{Callback, after};
pub use crate::foundation::clock::{Clock, ManualClock, SystemClock};
pub use crate::foundation::core::{Affine, Components, FromValue, SizeSpec, Value, Xy};
pub use crate::foundation::error::{TrellisError, TrellisResult};

pub use crate::animation::{Ease, Transition, Transitionable, TransitionableTransform};
pub use crate::document::{FrameReport, Scene, SceneDocument};
pub use crate::entity::{EntityId, Surface};
pub use crate::scene::{
    BranchSpec, Context, Modifier, NodeContext, Placement, RenderNode, Runtime, Spec,
};
pub use crate::transform::decompose::{Decomposition, normalize_rotation};
pub use crate::transform::matrix::Matrix;
