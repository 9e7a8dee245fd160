// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The shadow caster list and its cached world-space bounds.

use penumbra_core::math::Aabb;
use penumbra_core::scene::{descendant_meshes, HookId, MeshId, Scene};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

/// An ordered list of caster handles plus the union of their bounds.
///
/// The list keeps duplicates: adding a mesh twice requires removing it twice.
#[derive(Debug, Clone, Default)]
pub struct ShadowCasterSet {
    casters: Vec<MeshId>,
    bounds: Aabb,
}

impl ShadowCasterSet {
    /// Appends `mesh`, followed by all its descendants when requested.
    pub fn add(&mut self, scene: &dyn Scene, mesh: MeshId, include_descendants: bool) {
        self.casters.push(mesh);
        if include_descendants {
            self.casters.extend(descendant_meshes(scene, mesh));
        }
    }

    /// Removes the first entry of `mesh`, then the first entry of each
    /// descendant when requested. Returns `true` if `mesh` itself was found.
    pub fn remove(&mut self, scene: &dyn Scene, mesh: MeshId, include_descendants: bool) -> bool {
        let found = self.remove_first(mesh);
        if include_descendants {
            for child in descendant_meshes(scene, mesh) {
                self.remove_first(child);
            }
        }
        found
    }

    fn remove_first(&mut self, mesh: MeshId) -> bool {
        match self.casters.iter().position(|m| *m == mesh) {
            Some(index) => {
                self.casters.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `mesh` is in the list.
    pub fn contains(&self, mesh: MeshId) -> bool {
        self.casters.contains(&mesh)
    }

    /// The casters in insertion order.
    pub fn as_slice(&self) -> &[MeshId] {
        &self.casters
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.casters.len()
    }

    /// Returns `true` if there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.casters.is_empty()
    }

    /// Empties the list and resets the bounds.
    pub fn clear(&mut self) {
        self.casters.clear();
        self.bounds = Aabb::INVALID;
    }

    /// The cached bounds. [`Aabb::INVALID`] until first computed.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Recomputes the cached bounds from the scene. Unresolvable meshes are skipped.
    pub fn recompute_bounds(&mut self, scene: &dyn Scene) -> Aabb {
        self.bounds = self
            .casters
            .iter()
            .filter_map(|mesh| scene.world_bounds(*mesh))
            .fold(Aabb::INVALID, |acc, b| acc.merge(&b));
        self.bounds
    }
}

/// Owns a [`ShadowCasterSet`] and keeps its bounds fresh through a
/// before-render hook, unless frozen.
///
/// The hook holds a weak reference, so it turns into a no-op if the tracker
/// is dropped without being detached. It stays registered with the scene
/// until [`detach`](Self::detach) runs, which owners do from `dispose`.
///
/// While frozen, adding or removing casters recomputes the bounds once.
#[derive(Debug)]
pub(crate) struct CasterTracker {
    set: Rc<RefCell<ShadowCasterSet>>,
    hook: Option<HookId>,
    frozen: bool,
}

impl CasterTracker {
    pub(crate) fn new(scene: &mut dyn Scene, frozen: bool) -> Self {
        let mut tracker = Self {
            set: Rc::new(RefCell::new(ShadowCasterSet::default())),
            hook: None,
            frozen,
        };
        if frozen {
            tracker.set.borrow_mut().recompute_bounds(scene);
        } else {
            tracker.attach(scene);
        }
        tracker
    }

    pub(crate) fn add(&self, scene: &dyn Scene, mesh: MeshId, include_descendants: bool) {
        let mut set = self.set.borrow_mut();
        set.add(scene, mesh, include_descendants);
        if self.frozen {
            set.recompute_bounds(scene);
        }
    }

    pub(crate) fn remove(&self, scene: &dyn Scene, mesh: MeshId, include_descendants: bool) -> bool {
        let mut set = self.set.borrow_mut();
        let found = set.remove(scene, mesh, include_descendants);
        if self.frozen {
            set.recompute_bounds(scene);
        }
        found
    }

    fn attach(&mut self, scene: &mut dyn Scene) {
        let weak: Weak<RefCell<ShadowCasterSet>> = Rc::downgrade(&self.set);
        let id = scene.add_before_render_hook(Box::new(move |scene: &dyn Scene| {
            if let Some(set) = weak.upgrade() {
                if let Ok(mut set) = set.try_borrow_mut() {
                    set.recompute_bounds(scene);
                }
            }
        }));
        self.hook = Some(id);
    }

    /// Removes the per-frame hook, if registered.
    pub(crate) fn detach(&mut self, scene: &mut dyn Scene) {
        if let Some(id) = self.hook.take() {
            if !scene.remove_before_render_hook(id) {
                log::warn!("CasterTracker: before-render hook {id:?} was already gone");
            }
        }
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freezing captures the bounds once and drops the hook; unfreezing
    /// registers it again so the next frame refreshes the bounds.
    pub(crate) fn set_frozen(&mut self, scene: &mut dyn Scene, frozen: bool) {
        if frozen == self.frozen {
            return;
        }
        self.frozen = frozen;
        if frozen {
            self.set.borrow_mut().recompute_bounds(scene);
            self.detach(scene);
        } else {
            self.attach(scene);
        }
    }

    #[cfg(test)]
    pub(crate) fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    pub(crate) fn casters(&self) -> Ref<'_, ShadowCasterSet> {
        self.set.borrow()
    }

    pub(crate) fn casters_mut(&self) -> RefMut<'_, ShadowCasterSet> {
        self.set.borrow_mut()
    }
}
