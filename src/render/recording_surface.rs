use indexmap::IndexMap;

use crate::core::Viewport;
use crate::core::reconcile::Mutation;
use crate::error::{ChartError, ChartResult};
use crate::render::{Element, ElementKey, SceneMutation, SceneNode, SceneTree, Surface};

/// In-memory surface used by tests and headless usage.
///
/// It keeps the retained element tree exactly as a real backend would and
/// validates every element it receives, so invalid geometry or out-of-order
/// mutations surface as errors before a real backend is involved.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    containers: IndexMap<String, Viewport>,
    mounted: Option<String>,
    tree: SceneTree,
    journal: Vec<SceneMutation>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a container that `mount` can resolve.
    #[must_use]
    pub fn with_container(mut self, selector: impl Into<String>, viewport: Viewport) -> Self {
        self.containers.insert(selector.into(), viewport);
        self
    }

    /// Simulates a host resize; picked up by the next update.
    pub fn resize(&mut self, selector: &str, viewport: Viewport) -> ChartResult<()> {
        match self.containers.get_mut(selector) {
            Some(size) => {
                *size = viewport;
                Ok(())
            }
            None => Err(ChartError::ContainerNotFound(selector.to_owned())),
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    #[must_use]
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    #[must_use]
    pub fn node(&self, path: &[ElementKey]) -> Option<&SceneNode> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.tree.get(first)?, |node, key| node.children.get(key))
    }

    #[must_use]
    pub fn element(&self, path: &[ElementKey]) -> Option<&Element> {
        self.node(path).map(|node| &node.element)
    }

    /// Number of retained elements, layers included.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.tree.values().map(SceneNode::node_count).sum()
    }

    /// Every mutation applied since the last `clear_journal`.
    #[must_use]
    pub fn journal(&self) -> &[SceneMutation] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    fn children_mut(&mut self, parent: &[ElementKey]) -> Option<&mut IndexMap<ElementKey, SceneNode>> {
        let mut children = &mut self.tree;
        for key in parent {
            children = &mut children.get_mut(key)?.children;
        }
        Some(children)
    }

    fn selector(&self) -> ChartResult<&str> {
        self.mounted
            .as_deref()
            .ok_or_else(|| ChartError::InvalidConfig("surface is not mounted".to_owned()))
    }
}

impl Surface for RecordingSurface {
    fn mount(&mut self, selector: &str) -> ChartResult<Viewport> {
        let viewport = *self
            .containers
            .get(selector)
            .ok_or_else(|| ChartError::ContainerNotFound(selector.to_owned()))?;
        self.mounted = Some(selector.to_owned());
        Ok(viewport)
    }

    fn container_size(&self) -> ChartResult<Viewport> {
        let selector = self.selector()?;
        self.containers
            .get(selector)
            .copied()
            .ok_or_else(|| ChartError::ContainerNotFound(selector.to_owned()))
    }

    fn apply(&mut self, mutation: &SceneMutation) -> ChartResult<()> {
        self.selector()?;
        let path = mutation.path();
        let Some((key, parent)) = path.split_last() else {
            return Err(ChartError::InvalidData("mutation path is empty".to_owned()));
        };
        let missing = || ChartError::InvalidData(format!("no element at {path:?}"));

        match mutation {
            Mutation::Insert { element, .. } => {
                element.validate()?;
                let siblings = self.children_mut(parent).ok_or_else(missing)?;
                if siblings.contains_key(key) {
                    return Err(ChartError::InvalidData(format!(
                        "element at {path:?} already exists"
                    )));
                }
                siblings.insert(key.clone(), SceneNode::leaf(element.clone()));
            }
            Mutation::Update { element, .. } => {
                element.validate()?;
                let node = self
                    .children_mut(parent)
                    .and_then(|siblings| siblings.get_mut(key))
                    .ok_or_else(missing)?;
                node.element = element.clone();
            }
            Mutation::Remove { .. } => {
                self.children_mut(parent)
                    .and_then(|siblings| siblings.shift_remove(key))
                    .ok_or_else(missing)?;
            }
        }

        self.journal.push(mutation.clone());
        Ok(())
    }

    fn unmount(&mut self) -> ChartResult<()> {
        self.selector()?;
        self.tree.clear();
        self.mounted = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::RecordingSurface;
    use crate::core::Viewport;
    use crate::core::reconcile::Mutation;
    use crate::error::ChartError;
    use crate::render::{Element, ElementKey, Layer, Surface};

    fn mounted() -> RecordingSurface {
        let mut surface = RecordingSurface::new().with_container("#chart", Viewport::new(400, 300));
        surface.mount("#chart").expect("mount");
        surface
    }

    #[test]
    fn unknown_selector_fails_to_mount() {
        let mut surface = RecordingSurface::new();
        assert!(matches!(
            surface.mount("#missing"),
            Err(ChartError::ContainerNotFound(selector)) if selector == "#missing"
        ));
    }

    #[test]
    fn insert_requires_existing_parent() {
        let mut surface = mounted();
        let orphan = Mutation::Insert {
            path: smallvec![ElementKey::Layer(Layer::Columns), ElementKey::Series("a".to_owned())],
            element: Element::group(0.0, 0.0),
        };
        assert!(surface.apply(&orphan).is_err());
    }

    #[test]
    fn removing_a_group_drops_its_subtree() {
        let mut surface = mounted();
        let layer = ElementKey::Layer(Layer::Columns);
        let series = ElementKey::Series("a".to_owned());
        surface
            .apply(&Mutation::Insert {
                path: smallvec![layer.clone()],
                element: Element::group(0.0, 0.0),
            })
            .expect("layer");
        surface
            .apply(&Mutation::Insert {
                path: smallvec![layer.clone(), series.clone()],
                element: Element::group(0.0, 0.0),
            })
            .expect("series");
        assert_eq!(surface.element_count(), 2);

        surface
            .apply(&Mutation::Remove {
                path: smallvec![layer.clone()],
            })
            .expect("remove");
        assert_eq!(surface.element_count(), 0);
        assert_eq!(surface.journal().len(), 3);
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let mut surface = mounted();
        let result = surface.apply(&Mutation::Insert {
            path: smallvec![ElementKey::Layer(Layer::Overlay)],
            element: Element::group(f64::NAN, 0.0),
        });
        assert!(matches!(result, Err(ChartError::InvalidData(_))));
    }
}
