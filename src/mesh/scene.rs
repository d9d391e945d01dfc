//! Scene: the meshes and light handed to a renderer

use super::{Light, Mesh};

/// Handle to a mesh added to a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u32);

/// Meshes plus at most one light
///
/// Renderers walk the meshes from the most recently added to the first.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    meshes: Vec<(MeshId, Mesh)>,
    light: Option<Light>,
    next_id: u32,
}

impl Scene {
    /// Create an empty scene without a light
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and return its handle
    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        self.meshes.push((id, mesh));
        id
    }

    /// Remove a mesh, returning it if it was present
    pub fn remove(&mut self, id: MeshId) -> Option<Mesh> {
        let index = self.meshes.iter().position(|(mesh_id, _)| *mesh_id == id)?;
        Some(self.meshes.remove(index).1)
    }

    /// Get a mesh by handle
    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes
            .iter()
            .find(|(mesh_id, _)| *mesh_id == id)
            .map(|(_, mesh)| mesh)
    }

    /// Get a mutable mesh by handle
    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes
            .iter_mut()
            .find(|(mesh_id, _)| *mesh_id == id)
            .map(|(_, mesh)| mesh)
    }

    /// Meshes in drawing order (last added first)
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter().rev().map(|(_, mesh)| mesh)
    }

    /// Mutable meshes in drawing order
    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut Mesh> {
        self.meshes.iter_mut().rev().map(|(_, mesh)| mesh)
    }

    /// Number of meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// The active light
    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }

    /// Replace the active light
    pub fn set_light(&mut self, light: Light) {
        self.light = Some(light);
    }

    /// Remove the light
    pub fn clear_light(&mut self) -> Option<Light> {
        self.light.take()
    }

    /// Refresh every visible mesh under the current light, see [`Mesh::update`]
    pub fn update_meshes(&mut self, calculate: bool) {
        let light = self.light.as_ref();
        for (_, mesh) in self.meshes.iter_mut().rev() {
            if mesh.visible {
                mesh.update(light, calculate);
            }
        }
    }
}
