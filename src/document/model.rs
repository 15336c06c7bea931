use std::{collections::BTreeSet, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    animation::{
        engine::{CurveRef, MethodRef, Transition},
        tween::TweenOptions,
    },
    foundation::{
        core::{SizeSpec, Xy},
        error::{TrellisError, TrellisResult},
    },
    transform::decompose::Decomposition,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SceneDef {
    pub(crate) size: [f64; 2],
    #[serde(default = "default_fps")]
    pub(crate) fps: f64,
    pub(crate) frames: u64,
    #[serde(default)]
    pub(crate) perspective: Option<f64>,
    #[serde(default)]
    pub(crate) tween: Option<TweenOptions>,
    #[serde(default)]
    pub(crate) nodes: Vec<NodeDef>,
    #[serde(default)]
    pub(crate) animations: Vec<AnimationDef>,
}

fn default_fps() -> f64 {
    60.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum NodeDef {
    Surface(SurfaceDef),
    Modifier(ModifierDef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SurfaceDef {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default = "default_kind")]
    pub(crate) kind: String,
    #[serde(default)]
    pub(crate) size: Option<SizeSpec>,
    #[serde(default)]
    pub(crate) content: String,
}

fn default_kind() -> String {
    "div".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ModifierDef {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) transform: Option<Decomposition>,
    #[serde(default)]
    pub(crate) opacity: Option<f64>,
    #[serde(default)]
    pub(crate) origin: Option<Xy>,
    #[serde(default)]
    pub(crate) align: Option<Xy>,
    #[serde(default)]
    pub(crate) size: Option<SizeSpec>,
    #[serde(default)]
    pub(crate) children: Vec<NodeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AnimationDef {
    /// Start time in milliseconds.
    pub(crate) at: f64,
    /// Name of the modifier to animate; unused for context properties.
    #[serde(default)]
    pub(crate) target: Option<String>,
    pub(crate) set: PropertyDef,
    #[serde(default)]
    pub(crate) transition: Option<TransitionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PropertyDef {
    Transform(Decomposition),
    Opacity(f64),
    Origin(Xy),
    Align(Xy),
    Size(SizeSpec),
    Perspective(f64),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TransitionDef {
    #[serde(default)]
    pub(crate) duration: Option<f64>,
    #[serde(default)]
    pub(crate) curve: Option<String>,
    #[serde(default)]
    pub(crate) speed: Option<f64>,
    #[serde(default)]
    pub(crate) method: Option<String>,
}

impl TransitionDef {
    pub(crate) fn to_transition(&self) -> Transition {
        Transition {
            duration: self.duration,
            curve: self.curve.clone().map(CurveRef::Named),
            speed: self.speed,
            method: self.method.clone().map(MethodRef::Named),
        }
    }
}

/// A scene described in JSON: ambient size, a tree of surfaces and modifiers, and a
/// schedule of animations.
#[derive(Debug, Clone)]
pub struct SceneDocument {
    def: SceneDef,
}

impl SceneDocument {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TrellisResult<Self> {
        let def: SceneDef = serde_json::from_reader(r)
            .map_err(|e| TrellisError::validation(format!("parse scene JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a scene from a JSON string.
    pub fn from_json(s: &str) -> TrellisResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TrellisResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TrellisError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Checks values and cross-references that serde cannot.
    pub fn validate(&self) -> TrellisResult<()> {
        let def = &self.def;
        if !(def.fps.is_finite() && def.fps > 0.0) {
            return Err(TrellisError::validation("fps must be > 0"));
        }
        if def.size.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(TrellisError::validation(
                "size must be finite and non-negative",
            ));
        }
        if let Some(tween) = &def.tween
            && !(tween.duration.is_finite() && tween.duration >= 0.0)
        {
            return Err(TrellisError::validation(
                "tween duration must be finite and >= 0",
            ));
        }

        let mut names = Names::default();
        for node in &def.nodes {
            names.collect(node)?;
        }

        for (i, anim) in def.animations.iter().enumerate() {
            if !(anim.at.is_finite() && anim.at >= 0.0) {
                return Err(TrellisError::validation(format!(
                    "animation #{i} has invalid start time {}",
                    anim.at
                )));
            }
            if let PropertyDef::Opacity(v) = anim.set
                && !v.is_finite()
            {
                return Err(TrellisError::validation(format!(
                    "animation #{i} has non-finite opacity"
                )));
            }
            if !matches!(anim.set, PropertyDef::Perspective(_)) {
                let Some(target) = &anim.target else {
                    return Err(TrellisError::scene(format!(
                        "animation #{i} does not name a target modifier"
                    )));
                };
                if !names.modifiers.contains(target) {
                    let what = if names.surfaces.contains(target) {
                        "a surface; only modifiers can be animated"
                    } else {
                        "not defined"
                    };
                    return Err(TrellisError::scene(format!(
                        "animation #{i} targets '{target}', which is {what}"
                    )));
                }
            }
            if let Some(transition) = &anim.transition {
                if transition.duration.is_some_and(|d| !d.is_finite() || d < 0.0) {
                    return Err(TrellisError::validation(format!(
                        "animation #{i} has an invalid duration"
                    )));
                }
                if transition.speed.is_some_and(|s| !s.is_finite() || s < 0.0) {
                    return Err(TrellisError::validation(format!(
                        "animation #{i} has an invalid speed"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of frames to run.
    pub fn frames(&self) -> u64 {
        self.def.frames
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.def.fps
    }

    pub(crate) fn def(&self) -> &SceneDef {
        &self.def
    }
}

#[derive(Default)]
struct Names {
    surfaces: BTreeSet<String>,
    modifiers: BTreeSet<String>,
}

impl Names {
    fn collect(&mut self, node: &NodeDef) -> TrellisResult<()> {
        match node {
            NodeDef::Surface(surface) => {
                if let Some(name) = &surface.name {
                    self.insert(name, true)?;
                }
            }
            NodeDef::Modifier(modifier) => {
                if let Some(name) = &modifier.name {
                    self.insert(name, false)?;
                }
                for child in &modifier.children {
                    self.collect(child)?;
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, name: &str, surface: bool) -> TrellisResult<()> {
        if name.trim().is_empty() {
            return Err(TrellisError::validation("node names must be non-empty"));
        }
        if self.surfaces.contains(name) || self.modifiers.contains(name) {
            return Err(TrellisError::validation(format!(
                "node name '{name}' is used more than once"
            )));
        }
        let set = if surface {
            &mut self.surfaces
        } else {
            &mut self.modifiers
        };
        set.insert(name.to_owned());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
