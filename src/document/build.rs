use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use crate::{
    document::model::{AnimationDef, ModifierDef, NodeDef, PropertyDef, SceneDocument},
    entity::{registry::EntityId, surface::Surface},
    foundation::{
        clock::{Clock, ManualClock},
        error::{TrellisError, TrellisResult},
    },
    scene::{
        context::Context, modifier::Modifier, node::RenderNode, runtime::Runtime,
        spec::Placement,
    },
    transform::matrix::Matrix,
};

/// One committed entity in a [`FrameReport`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlacedEntity {
    /// Registry id.
    pub id: EntityId,
    /// Document name of the surface, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resolved placement.
    pub placement: Placement,
}

/// Everything committed for one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameReport {
    /// Frame index.
    pub frame: u64,
    /// Scene time in milliseconds.
    pub time_ms: f64,
    /// Committed entities in id order.
    pub entities: Vec<PlacedEntity>,
}

/// A built scene driven by its own manual clock.
pub struct Scene {
    clock: Rc<ManualClock>,
    context: Context,
    surfaces: BTreeMap<String, Rc<RefCell<Surface>>>,
    modifiers: BTreeMap<String, Rc<RefCell<Modifier>>>,
    names: BTreeMap<EntityId, String>,
    schedule: Vec<AnimationDef>,
    next_animation: usize,
    fps: f64,
    frames: u64,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("fps", &self.fps)
            .field("frames", &self.frames)
            .field("surfaces", &self.surfaces.keys().collect::<Vec<_>>())
            .field("modifiers", &self.modifiers.keys().collect::<Vec<_>>())
            .field("pending_animations", &(self.schedule.len() - self.next_animation))
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Validates `doc` and builds its tree on a fresh runtime.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(doc: &SceneDocument) -> TrellisResult<Self> {
        doc.validate()?;
        let def = doc.def();

        let clock = Rc::new(ManualClock::new(0.0));
        let runtime = Runtime::with_clock(clock.clone());
        if let Some(tween) = def.tween {
            runtime.set_tween_defaults(tween);
        }

        for (i, anim) in def.animations.iter().enumerate() {
            let Some(transition) = &anim.transition else {
                continue;
            };
            transition
                .to_transition()
                .resolve(&runtime)
                .map_err(|e| TrellisError::configuration(format!("animation #{i}: {e}")))?;
        }

        let mut scene = Self {
            clock,
            context: Context::new(&runtime, def.size),
            surfaces: BTreeMap::new(),
            modifiers: BTreeMap::new(),
            names: BTreeMap::new(),
            schedule: Vec::new(),
            next_animation: 0,
            fps: def.fps,
            frames: def.frames,
        };
        if let Some(perspective) = def.perspective {
            scene.context.set_perspective(perspective, None, None)?;
        }

        let mut root = RenderNode::new();
        for node in &def.nodes {
            let child = scene.build_node(&runtime, node)?;
            root.add(child);
        }
        *scene.context.root() = root;

        let mut schedule = def.animations.clone();
        schedule.sort_by(|a, b| a.at.total_cmp(&b.at));
        scene.schedule = schedule;

        tracing::debug!(
            surfaces = scene.surfaces.len(),
            modifiers = scene.modifiers.len(),
            animations = scene.schedule.len(),
            "scene built"
        );
        Ok(scene)
    }

    fn build_node(&mut self, runtime: &Runtime, def: &NodeDef) -> TrellisResult<RenderNode> {
        match def {
            NodeDef::Surface(surface_def) => {
                let surface = Surface::create_with(runtime, &surface_def.kind, surface_def.size);
                surface.borrow_mut().set_content(&surface_def.content);
                if let Some(name) = &surface_def.name {
                    self.names.insert(surface.borrow().id(), name.clone());
                    self.surfaces.insert(name.clone(), surface.clone());
                }
                Ok(RenderNode::from(surface))
            }
            NodeDef::Modifier(modifier_def) => {
                let modifier = build_modifier(runtime, modifier_def).shared();
                if let Some(name) = &modifier_def.name {
                    self.modifiers.insert(name.clone(), modifier.clone());
                }
                let mut node = RenderNode::from(modifier);
                for child in &modifier_def.children {
                    let child = self.build_node(runtime, child)?;
                    node.add(child);
                }
                Ok(node)
            }
        }
    }

    /// Scene time of `frame` in milliseconds.
    pub fn frame_time(&self, frame: u64) -> f64 {
        frame as f64 * 1000.0 / self.fps
    }

    /// Number of frames declared by the document.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Starts due animations at their scheduled times, moves the clock to `frame` and
    /// commits one pass.
    ///
    /// Frames are expected in increasing order; the clock never moves backwards. An
    /// animation whose start falls between two frames begins at its own `at`, so the next
    /// frame already shows it partway through.
    pub fn step(&mut self, frame: u64) -> TrellisResult<FrameReport> {
        let time_ms = self.frame_time(frame);

        while let Some(anim) = self.schedule.get(self.next_animation) {
            if anim.at > time_ms {
                break;
            }
            let anim = anim.clone();
            self.next_animation += 1;
            self.clock.set(anim.at.max(self.clock.now()));
            self.start_animation(&anim)?;
        }
        self.clock.set(time_ms);

        self.context.update(None);
        let entities = self
            .context
            .committed()
            .map(|(id, placement)| PlacedEntity {
                id,
                name: self.names.get(&id).cloned(),
                placement: placement.clone(),
            })
            .collect();
        Ok(FrameReport {
            frame,
            time_ms,
            entities,
        })
    }

    /// Runs every declared frame from zero.
    pub fn run(&mut self) -> TrellisResult<Vec<FrameReport>> {
        (0..self.frames).map(|frame| self.step(frame)).collect()
    }

    fn start_animation(&mut self, anim: &AnimationDef) -> TrellisResult<()> {
        let transition = anim.transition.as_ref().map(|t| t.to_transition());
        tracing::debug!(at = anim.at, target = ?anim.target, "animation started");

        if let PropertyDef::Perspective(value) = anim.set {
            return self.context.set_perspective(value, transition, None);
        }

        let modifier = anim
            .target
            .as_ref()
            .and_then(|name| self.modifiers.get(name))
            .ok_or_else(|| {
                TrellisError::scene(format!("animation target {:?} is not a modifier", anim.target))
            })?;
        let mut modifier = modifier.borrow_mut();
        match anim.set {
            PropertyDef::Transform(parts) => {
                modifier.set_transform(Matrix::build(&parts), transition, None)?;
            }
            PropertyDef::Opacity(v) => {
                modifier.set_opacity(v, transition, None)?;
            }
            PropertyDef::Origin(v) => {
                modifier.set_origin(v, transition, None)?;
            }
            PropertyDef::Align(v) => {
                modifier.set_align(v, transition, None)?;
            }
            PropertyDef::Size(v) => {
                modifier.set_size(v, transition, None)?;
            }
            PropertyDef::Perspective(_) => {}
        }
        Ok(())
    }

    /// The context this scene commits through.
    pub fn context(&mut self) -> &mut Context {
        &mut self.context
    }

    /// A named surface.
    pub fn surface(&self, name: &str) -> Option<Rc<RefCell<Surface>>> {
        self.surfaces.get(name).cloned()
    }

    /// A named modifier.
    pub fn modifier(&self, name: &str) -> Option<Rc<RefCell<Modifier>>> {
        self.modifiers.get(name).cloned()
    }
}

fn build_modifier(runtime: &Runtime, def: &ModifierDef) -> Modifier {
    let mut modifier = Modifier::new(runtime);
    if let Some(parts) = &def.transform {
        modifier.transform_from(Matrix::build(parts));
    }
    if let Some(opacity) = def.opacity {
        modifier.opacity_from(opacity);
    }
    if let Some(origin) = def.origin {
        modifier.origin_from(origin);
    }
    if let Some(align) = def.align {
        modifier.align_from(align);
    }
    if let Some(size) = def.size {
        modifier.size_from(size);
    }
    modifier
}

#[cfg(test)]
#[path = "../../tests/unit/document/build.rs"]
mod tests;
