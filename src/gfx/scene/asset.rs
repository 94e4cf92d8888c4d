//! Loaded asset hierarchy
//!
//! An [`Asset`] is a flat arena of [`Node`]s addressed by [`NodeId`]. Node ids
//! of a decoded glTF document match the document's node indices so animation
//! channels can target them directly; nodes created while splitting
//! multi-primitive meshes are appended after them.

use cgmath::{Matrix4, Quaternion, SquareMatrix, Vector3};

use crate::gfx::{
    color::Color,
    resources::material::Material,
    scene::{bounds::Aabb, vertex::Vertex3D},
};

pub type NodeId = usize;

/// Translation / rotation / scale of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Build matrix = T * R * S
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Indexed triangle geometry with its object-space bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    bounds: Aabb,
}

impl Geometry {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::from_points(vertices.iter().map(|v| &v.position));
        Self {
            vertices,
            indices,
            bounds,
        }
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }
}

/// Geometry plus the material it is drawn with
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    pub geometry: Geometry,
    pub material: Material,
}

/// What a node can do beyond carrying a transform
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(MeshNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn group(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
            kind: NodeKind::Group,
        }
    }

    pub fn mesh(name: impl Into<String>, transform: Transform, mesh: MeshNode) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
            kind: NodeKind::Mesh(mesh),
        }
    }

    pub fn with_children(mut self, children: Vec<NodeId>) -> Self {
        self.children = children;
        self
    }

    /// Whether this node carries geometry with a recolorable material
    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    pub fn as_mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(&mut mesh.material),
            NodeKind::Group => None,
        }
    }
}

/// A loaded 3D model
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// URL the asset was loaded from
    pub url: String,
    pub nodes: Vec<Node>,
    pub roots: Vec<NodeId>,
}

impl Asset {
    pub fn new(url: impl Into<String>, nodes: Vec<Node>, roots: Vec<NodeId>) -> Self {
        Self {
            url: url.into(),
            nodes,
            roots,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Visits every node reachable from the roots, parents before children.
    pub fn traverse(&self, mut visit: impl FnMut(NodeId, &Node, &Matrix4<f32>)) {
        let mut stack: Vec<(NodeId, Matrix4<f32>)> = self
            .roots
            .iter()
            .rev()
            .map(|&root| (root, Matrix4::identity()))
            .collect();

        let mut visited = vec![false; self.nodes.len()];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            // Malformed documents may share or cycle nodes
            if std::mem::replace(&mut visited[id], true) {
                continue;
            }

            let world = parent_world * node.transform.matrix();
            visit(id, node, &world);
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    /// World matrix of every node, indexed by [`NodeId`]. Nodes unreachable
    /// from the roots keep the identity.
    pub fn world_matrices(&self) -> Vec<Matrix4<f32>> {
        let mut worlds = vec![Matrix4::identity(); self.nodes.len()];
        self.traverse(|id, _, world| worlds[id] = *world);
        worlds
    }

    /// Ids of reachable nodes with the mesh capability
    pub fn mesh_nodes(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.traverse(|id, node, _| {
            if node.is_mesh() {
                ids.push(id);
            }
        });
        ids
    }

    /// Overwrites the base color of every reachable mesh material.
    /// Returns how many materials were changed.
    pub fn recolor(&mut self, color: Color) -> usize {
        let targets = self.mesh_nodes();
        for &id in &targets {
            if let Some(material) = self.nodes[id].material_mut() {
                material.set_color(color);
            }
        }
        targets.len()
    }

    /// World-space bounding box of all reachable geometry
    pub fn bounding_box(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        self.traverse(|_, node, world| {
            if let Some(mesh) = node.as_mesh() {
                aabb.union(&mesh.geometry.bounds().transformed(world));
            }
        });
        aabb
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Unit cube centered on the origin, 8 shared vertices.
    pub(crate) fn cube_geometry() -> Geometry {
        let mut vertices = Vec::new();
        for i in 0..8 {
            let p = [
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            ];
            vertices.push(Vertex3D::new(p, [0.0, 1.0, 0.0]));
        }
        let indices = vec![0, 1, 3, 0, 3, 2, 4, 6, 7, 4, 7, 5];
        Geometry::new(vertices, indices)
    }

    /// A group root with one cube child translated by `offset`.
    pub(crate) fn cube_asset(url: &str, offset: Vector3<f32>) -> Asset {
        let mesh = MeshNode {
            geometry: cube_geometry(),
            material: Material::default(),
        };
        let root = Node::group("root", Transform::from_translation(offset)).with_children(vec![1]);
        let cube = Node::mesh("cube", Transform::identity(), mesh);
        Asset::new(url, vec![root, cube], vec![0])
    }

    #[test]
    fn test_world_matrices_compose_parent_transforms() {
        let mut asset = cube_asset("a.glb", Vector3::new(1.0, 0.0, 0.0));
        asset.nodes[1].transform = Transform::from_translation(Vector3::new(0.0, 2.0, 0.0));

        let worlds = asset.world_matrices();
        assert_eq!(worlds[1].w.truncate(), Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_bounding_box_in_world_space() {
        let asset = cube_asset("a.glb", Vector3::new(4.0, 0.0, 0.0));
        let aabb = asset.bounding_box();
        assert_eq!(aabb.center(), Vector3::new(4.0, 0.0, 0.0));
        assert_eq!(aabb.size(), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_recolor_touches_only_mesh_nodes() {
        let mut asset = cube_asset("a.glb", Vector3::new(0.0, 0.0, 0.0));
        let changed = asset.recolor(Color::new(0.0, 0.0, 1.0));

        assert_eq!(changed, 1);
        assert!(asset.nodes[0].material_mut().is_none());
        let material = &asset.nodes[1].as_mesh().unwrap().material;
        assert_eq!(material.base_color, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_traverse_survives_cycles() {
        let mut asset = cube_asset("a.glb", Vector3::new(0.0, 0.0, 0.0));
        asset.nodes[1].children.push(0);
        assert_eq!(asset.mesh_nodes(), vec![1]);
    }
}
