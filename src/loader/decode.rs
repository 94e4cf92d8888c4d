//! glTF / GLB decoding into the viewer's [`Asset`] model
//!
//! Document nodes keep their glTF indices as [`NodeId`]s. A mesh with a
//! single triangle primitive turns its node into a mesh node; a mesh with
//! several primitives leaves the node a group and appends one mesh child per
//! primitive after the document nodes.

use std::{collections::HashMap, path::Path};

use cgmath::{Quaternion, Vector3};
use gltf::{animation::util::ReadOutputs, mesh::Mode};

use crate::{
    animation::{AnimationClip, AnimationSet, Channel, ChannelProperty, Interpolation, Keyframes},
    error::{ViewerError, ViewerResult},
    gfx::{
        resources::material::Material,
        scene::{
            asset::{Asset, Geometry, MeshNode, Node, NodeId, NodeKind, Transform},
            vertex::{compute_vertex_normals, Vertex3D},
        },
    },
};

/// A decoded asset and the clips it carries
#[derive(Debug, Clone)]
pub struct AssetData {
    pub asset: Asset,
    pub animations: AnimationSet,
}

/// Decodes a `.glb` or `.gltf` document.
///
/// `base` is the directory external buffers are resolved against; embedded
/// (GLB blob or data URI) buffers need none.
pub fn decode_gltf(bytes: &[u8], base: Option<&Path>, url: &str) -> ViewerResult<AssetData> {
    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(bytes).map_err(|err| ViewerError::Decode(err.to_string()))?;
    let buffers = gltf::import_buffers(&document, base, blob)
        .map_err(|err| ViewerError::Decode(err.to_string()))?;

    let materials: Vec<Material> = document.materials().map(|m| convert_material(&m)).collect();

    let mut nodes: Vec<Node> = document
        .nodes()
        .map(|node| {
            let name = node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("node_{}", node.index()));
            let children = node.children().map(|child| child.index()).collect();
            Node::group(name, convert_transform(node.transform())).with_children(children)
        })
        .collect();

    // Meshes can be instanced by several nodes; decode each once.
    let mut decoded_meshes: HashMap<usize, Vec<MeshNode>> = HashMap::new();
    for node in document.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let primitives = decoded_meshes
            .entry(mesh.index())
            .or_insert_with(|| decode_mesh(&mesh, &buffers, &materials, url))
            .clone();

        let id = node.index();
        match primitives.len() {
            0 => {}
            1 => {
                if let Some(primitive) = primitives.into_iter().next() {
                    nodes[id].kind = NodeKind::Mesh(primitive);
                }
            }
            _ => {
                for (i, primitive) in primitives.into_iter().enumerate() {
                    let child_id = nodes.len();
                    let name = format!("{}_primitive_{}", nodes[id].name, i);
                    nodes.push(Node::mesh(name, Transform::identity(), primitive));
                    nodes[id].children.push(child_id);
                }
            }
        }
    }

    let scene = document.default_scene().or_else(|| document.scenes().next());
    let roots: Vec<NodeId> = match scene {
        Some(scene) => scene.nodes().map(|node| node.index()).collect(),
        None => {
            // No scene: every node nobody claims as a child is a root
            let mut claimed = vec![false; document.nodes().len()];
            for node in document.nodes() {
                for child in node.children() {
                    claimed[child.index()] = true;
                }
            }
            (0..claimed.len()).filter(|&i| !claimed[i]).collect()
        }
    };

    let clips = document
        .animations()
        .enumerate()
        .map(|(i, animation)| {
            let name = animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("animation_{}", i));
            let channels = animation
                .channels()
                .filter_map(|channel| decode_channel(&channel, &buffers))
                .collect();
            AnimationClip::new(name, channels)
        })
        .collect();

    let asset = Asset::new(url, nodes, roots);
    log::debug!(
        "Decoded {}: {} nodes, {} mesh nodes",
        url,
        asset.nodes.len(),
        asset.mesh_nodes().len()
    );

    Ok(AssetData {
        asset,
        animations: AnimationSet::new(clips),
    })
}

fn convert_transform(transform: gltf::scene::Transform) -> Transform {
    let (translation, rotation, scale) = transform.decomposed();
    Transform {
        translation: Vector3::from(translation),
        // glTF stores quaternions as [x, y, z, w]
        rotation: Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
        scale: Vector3::from(scale),
    }
}

fn convert_material(material: &gltf::Material<'_>) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("material_{}", material.index().unwrap_or(0)));
    Material::new(
        &name,
        pbr.base_color_factor(),
        pbr.metallic_factor(),
        pbr.roughness_factor(),
    )
}

fn decode_mesh(
    mesh: &gltf::Mesh<'_>,
    buffers: &[gltf::buffer::Data],
    materials: &[Material],
    url: &str,
) -> Vec<MeshNode> {
    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            log::warn!(
                "{}: skipping {:?} primitive of mesh {}; only triangles are drawn",
                url,
                primitive.mode(),
                mesh.index()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            log::warn!("{}: mesh {} has a primitive without positions", url, mesh.index());
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        if indices.iter().any(|&i| i as usize >= positions.len()) {
            log::warn!("{}: mesh {} has out of range indices", url, mesh.index());
            continue;
        }

        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => compute_vertex_normals(&positions, &indices),
        };

        let vertices = positions
            .iter()
            .zip(normals.iter().chain(std::iter::repeat(&[0.0, 1.0, 0.0])))
            .map(|(position, normal)| Vertex3D::new(*position, *normal))
            .collect();

        let material = primitive
            .material()
            .index()
            .and_then(|index| materials.get(index))
            .cloned()
            .unwrap_or_default();

        primitives.push(MeshNode {
            geometry: Geometry::new(vertices, indices),
            material,
        });
    }
    primitives
}

fn decode_channel(
    channel: &gltf::animation::Channel<'_>,
    buffers: &[gltf::buffer::Data],
) -> Option<Channel> {
    let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
    let times: Vec<f32> = reader.read_inputs()?.collect();

    let (property, keyframes) = match reader.read_outputs()? {
        ReadOutputs::Translations(values) => (
            ChannelProperty::Translation,
            Keyframes::Vectors(values.map(Vector3::from).collect()),
        ),
        ReadOutputs::Scales(values) => (
            ChannelProperty::Scale,
            Keyframes::Vectors(values.map(Vector3::from).collect()),
        ),
        ReadOutputs::Rotations(values) => (
            ChannelProperty::Rotation,
            Keyframes::Rotations(
                values
                    .into_f32()
                    .map(|q| Quaternion::new(q[3], q[0], q[1], q[2]))
                    .collect(),
            ),
        ),
        ReadOutputs::MorphTargetWeights(_) => {
            log::debug!("Skipping morph target animation channel");
            return None;
        }
    };

    let interpolation = match channel.sampler().interpolation() {
        gltf::animation::Interpolation::Step => Interpolation::Step,
        gltf::animation::Interpolation::Linear => Interpolation::Linear,
        gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
    };

    Some(Channel {
        target: channel.target().node().index(),
        property,
        interpolation,
        times,
        keyframes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Sample;

    /// One triangle, a two-key translation track and a grey material, all in
    /// a base64 data URI buffer.
    const BUFFER_URI: &str = "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAAAAAAAAQAAAAAA=";

    fn document(primitives: &str) -> Vec<u8> {
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "root", "children": [1], "translation": [0.0, 0.0, -2.0] }},
    {{ "name": "tri", "mesh": 0 }}
  ],
  "meshes": [{{ "primitives": [{primitives}] }}],
  "materials": [{{ "pbrMetallicRoughness": {{ "baseColorFactor": [0.5, 0.5, 0.5, 1.0] }} }}],
  "animations": [{{
    "channels": [{{ "sampler": 0, "target": {{ "node": 1, "path": "translation" }} }}],
    "samplers": [{{ "input": 1, "output": 2 }}]
  }}],
  "buffers": [{{ "byteLength": 68, "uri": "{BUFFER_URI}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 8 }},
    {{ "buffer": 0, "byteOffset": 44, "byteLength": 24 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5126, "count": 2, "type": "SCALAR",
       "min": [0.0], "max": [1.0] }},
    {{ "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC3" }}
  ]
}}"#
        )
        .into_bytes()
    }

    const TRIANGLE: &str = r#"{ "attributes": { "POSITION": 0 }, "material": 0 }"#;

    #[test]
    fn test_decode_single_primitive_document() {
        let data = decode_gltf(&document(TRIANGLE), None, "tri.gltf").unwrap();
        let asset = &data.asset;

        assert_eq!(asset.url, "tri.gltf");
        assert_eq!(asset.roots, vec![0]);
        assert_eq!(asset.nodes.len(), 2);
        assert!(!asset.nodes[0].is_mesh());

        let mesh = asset.nodes[1].as_mesh().unwrap();
        assert_eq!(mesh.geometry.vertices.len(), 3);
        assert_eq!(mesh.geometry.indices, vec![0, 1, 2]);
        // No normals in the file: computed from the face
        assert_eq!(mesh.geometry.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.material.base_color, [0.5, 0.5, 0.5, 1.0]);

        let bounds = asset.bounding_box();
        assert_eq!(bounds.center(), Vector3::new(0.5, 0.5, -2.0));
    }

    #[test]
    fn test_decode_animation_channels() {
        let data = decode_gltf(&document(TRIANGLE), None, "tri.gltf").unwrap();

        assert_eq!(data.animations.names(), vec!["animation_0".to_string()]);
        let clip = data.animations.get(0).unwrap();
        assert_eq!(clip.duration(), 1.0);

        let channel = &clip.channels[0];
        assert_eq!(channel.target, 1);
        assert_eq!(channel.property, ChannelProperty::Translation);
        assert_eq!(channel.interpolation, Interpolation::Linear);
        assert_eq!(channel.sample(0.5), Some(Sample::Vector(Vector3::new(0.0, 1.0, 0.0))));
    }

    #[test]
    fn test_multi_primitive_mesh_becomes_group_with_children() {
        let primitives = format!("{TRIANGLE}, {TRIANGLE}");
        let data = decode_gltf(&document(&primitives), None, "pair.gltf").unwrap();
        let asset = &data.asset;

        assert_eq!(asset.nodes.len(), 4);
        assert!(!asset.nodes[1].is_mesh());
        assert_eq!(asset.nodes[1].children, vec![2, 3]);
        assert_eq!(asset.mesh_nodes(), vec![2, 3]);
    }

    #[test]
    fn test_non_triangle_primitives_are_skipped() {
        let points = r#"{ "attributes": { "POSITION": 0 }, "mode": 0 }"#;
        let data = decode_gltf(&document(points), None, "points.gltf").unwrap();
        assert!(data.asset.mesh_nodes().is_empty());
        assert!(data.asset.bounding_box().is_empty());
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let result = decode_gltf(b"not a model", None, "junk.glb");
        assert!(matches!(result, Err(ViewerError::Decode(_))));
    }
}
