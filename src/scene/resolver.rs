use std::collections::BTreeMap;

use crate::{
    entity::registry::EntityId,
    scene::spec::{NodeContext, Placement, Spec},
    transform::matrix::Matrix,
};

/// Flattens `spec` into one absolute placement per entity.
///
/// A repeated entity keeps the placement of its last occurrence.
#[tracing::instrument(level = "trace", skip_all)]
pub fn resolve(spec: &Spec, context: &NodeContext) -> BTreeMap<EntityId, Placement> {
    let mut out = BTreeMap::new();
    resolve_into(spec, context, &Matrix::IDENTITY, &mut out);
    out
}

fn resolve_into(
    spec: &Spec,
    parent: &NodeContext,
    size_context: &Matrix,
    out: &mut BTreeMap<EntityId, Placement>,
) {
    match spec {
        Spec::Empty => {}
        Spec::Entity(id) => {
            let align = parent.align.or(parent.origin);
            let mut transform = parent.transform;
            if let (Some(size), Some(_), Some(align)) = (parent.size, parent.origin, align) {
                let offset = [align[0] * size[0], align[1] * size[1], 0.0];
                transform = transform.then_move(Matrix::vec_in_context(offset, size_context));
            }
            out.insert(
                *id,
                Placement {
                    transform,
                    opacity: parent.opacity,
                    origin: parent.origin.unwrap_or([0.0, 0.0]),
                    align: align.unwrap_or([0.0, 0.0]),
                    size: parent.size,
                },
            );
        }
        Spec::List(items) => {
            for item in items {
                resolve_into(item, parent, size_context, out);
            }
        }
        Spec::Branch(branch) => {
            let mut next = parent.clone();
            let mut next_size_context = *size_context;

            if let Some(opacity) = branch.opacity {
                next.opacity = parent.opacity * opacity;
            }
            if let Some(transform) = &branch.transform {
                next.transform = parent.transform.multiply(transform);
            }
            if let Some(origin) = branch.origin {
                next.origin = Some(origin);
                next_size_context = parent.transform;
            }
            if let Some(align) = branch.align {
                next.align = Some(align);
            }
            if let Some(own) = branch.size {
                let parent_size = parent.size.unwrap_or([0.0, 0.0]);
                let size = [
                    own[0].unwrap_or(parent_size[0]),
                    own[1].unwrap_or(parent_size[1]),
                ];
                if let Some(parent_size) = parent.size {
                    if let Some(align) = next.align.or(next.origin) {
                        let offset = [align[0] * parent_size[0], align[1] * parent_size[1], 0.0];
                        next.transform = next
                            .transform
                            .then_move(Matrix::vec_in_context(offset, size_context));
                    }
                    if let Some(origin) = next.origin {
                        next.transform = Matrix::move_then(
                            [-origin[0] * size[0], -origin[1] * size[1], 0.0],
                            &next.transform,
                        );
                    }
                }
                next.size = Some(size);
                next.origin = None;
                next.align = None;
                next_size_context = parent.transform;
            }

            resolve_into(&branch.target, &next, &next_size_context, out);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/resolver.rs"]
mod tests;
