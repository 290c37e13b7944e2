//! The scene graph.
//!
//! Nodes live in a flat arena and refer to their parent by index, so the
//! graph can be re-parented in place while animation groups keep stable
//! target ids. Everything here is CPU-side; the render backend mirrors it.

use crate::{
    animation::AnimationGroup,
    data_structures::{instance::Instance, material::Material, mesh::MeshData},
    error::SceneError,
};

pub type NodeId = usize;
pub type MaterialId = usize;

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub local: Instance,
    world: Instance,
    pub mesh: Option<MeshData>,
    pub material: Option<MaterialId>,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            local: Instance::new(),
            world: Instance::new(),
            mesh: None,
            material: None,
        }
    }

    pub fn with_mesh(mut self, mesh: MeshData) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_transform(mut self, local: Instance) -> Self {
        self.local = local;
        self.world = local;
        self
    }

    pub fn world(&self) -> &Instance {
        &self.world
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    materials: Vec<Material>,
    animation_groups: Vec<AnimationGroup>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node and returns its id. The world transform is refreshed so
    /// lookups right after insertion already see the composed position.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.update_world_transform(id);
        id
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_animation_group(&mut self, group: AnimationGroup) {
        self.animation_groups.push(group);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn animation_groups(&self) -> &[AnimationGroup] {
        &self.animation_groups
    }

    /// First node called `name`.
    pub fn mesh_by_name(&self, name: &str) -> Result<NodeId, SceneError> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .ok_or_else(|| SceneError::missing_mesh(name))
    }

    pub fn animation_group_by_name(&self, name: &str) -> Result<&AnimationGroup, SceneError> {
        self.animation_groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| SceneError::missing_animation_group(name))
    }

    pub fn animation_group_by_name_mut(
        &mut self,
        name: &str,
    ) -> Result<&mut AnimationGroup, SceneError> {
        self.animation_groups
            .iter_mut()
            .find(|g| g.name == name)
            .ok_or_else(|| SceneError::missing_animation_group(name))
    }

    pub fn stop_all_animations(&mut self) {
        self.animation_groups.iter_mut().for_each(AnimationGroup::stop);
    }

    /// Attaches `child` to `parent` keeping the child's world transform.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        let child_world = *self.world(child)?;
        let local = match parent {
            Some(parent) => {
                if self.is_ancestor(child, parent) {
                    log::warn!(
                        "Refusing to parent node {} under its own descendant {}",
                        child,
                        parent
                    );
                    return Ok(());
                }
                child_world.relative_to(self.world(parent)?)
            }
            None => child_world,
        };
        let node = &mut self.nodes[child];
        node.parent = parent;
        node.local = local;
        self.update_world_transform(child);
        Ok(())
    }

    /// Places `id` at `position` in world space, keeping its parent.
    pub fn set_world_position(
        &mut self,
        id: NodeId,
        position: cgmath::Vector3<f32>,
    ) -> Result<(), SceneError> {
        let mut world = *self.world(id)?;
        world.position = position;
        let local = match self.nodes[id].parent {
            Some(parent) => world.relative_to(&self.nodes[parent].world),
            None => world,
        };
        self.nodes[id].local = local;
        self.update_world_transform(id);
        Ok(())
    }

    pub fn world(&self, id: NodeId) -> Result<&Instance, SceneError> {
        self.nodes
            .get(id)
            .map(Node::world)
            .ok_or_else(|| SceneError::missing_mesh(&format!("#{}", id)))
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn update_world_transform(&mut self, id: NodeId) {
        let world = match self.nodes[id].parent {
            Some(parent) => &self.nodes[parent].world * &self.nodes[id].local,
            None => self.nodes[id].local,
        };
        self.nodes[id].world = world;
        let children: Vec<NodeId> = (0..self.nodes.len())
            .filter(|&n| self.nodes[n].parent == Some(id))
            .collect();
        for child in children {
            self.update_world_transform(child);
        }
    }

    /// Recomputes every world transform from the roots down.
    pub fn update_world_transforms(&mut self) {
        let roots: Vec<NodeId> = (0..self.nodes.len())
            .filter(|&n| self.nodes[n].parent.is_none())
            .collect();
        for root in roots {
            self.update_world_transform(root);
        }
    }

    /// Advances all playing groups by `dt` seconds, writes their samples into
    /// node transforms and returns the names of groups that ended this frame.
    pub fn advance_animations(&mut self, dt: f32) -> Vec<String> {
        let mut ended = Vec::new();
        for group in self.animation_groups.iter_mut() {
            if !group.is_playing() {
                continue;
            }
            if group.advance(dt) {
                ended.push(group.name.clone());
            }
            for (channel, time) in group.samples() {
                match self.nodes.get_mut(channel.target) {
                    Some(node) => channel.apply(time, &mut node.local),
                    None => log::warn!(
                        "Animation {} targets missing node {}",
                        group.name,
                        channel.target
                    ),
                }
            }
        }
        self.update_world_transforms();
        ended
    }
}
