// --- File: model.rs ---
use crate::assets::{Indices, ModelData, TextureNames, VertexAttribute};
use crate::error::{AquariumError, Result};
use crate::pipelines::MESH_STREAMS;
use wgpu::util::DeviceExt;

pub fn attribute_format(num_components: u32) -> Option<wgpu::VertexFormat> {
    match num_components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

/// Picks the attributes the model shaders read, in vertex buffer slot order.
///
/// Extra attributes are left out. A missing stream, a stream with the wrong
/// component count, or streams of unequal length make the model unusable.
pub fn mesh_streams<'a>(label: &str, data: &'a ModelData) -> Result<[&'a VertexAttribute; 3]> {
    let malformed = |reason: String| AquariumError::MalformedAsset {
        path: label.to_string(),
        reason,
    };
    let mut picked = Vec::with_capacity(MESH_STREAMS.len());
    for (semantic, format) in MESH_STREAMS {
        let attribute = data
            .attributes
            .iter()
            .find(|a| a.semantic == semantic)
            .ok_or_else(|| malformed(format!("model has no {semantic:?} stream")))?;
        if attribute_format(attribute.num_components) != Some(format) {
            return Err(malformed(format!(
                "{semantic:?} has {} components, expected {format:?}",
                attribute.num_components
            )));
        }
        picked.push(attribute);
    }

    let vertices = data.vertex_count() as usize;
    for attribute in &picked {
        let count = attribute.data.len() / attribute.num_components as usize;
        if count != vertices {
            return Err(malformed(format!(
                "{:?} has {count} vertices, position has {vertices}",
                attribute.semantic
            )));
        }
    }
    Ok([picked[0], picked[1], picked[2]])
}

/// Geometry uploaded to the GPU: one vertex buffer per mesh stream, bound at
/// the slot of its semantic, plus an optional index buffer.
pub struct GpuModel {
    streams: [wgpu::Buffer; 3],
    index: Option<(wgpu::Buffer, wgpu::IndexFormat)>,
    element_count: u32,
    pub textures: TextureNames,
}

impl GpuModel {
    pub fn upload(device: &wgpu::Device, label: &str, data: &ModelData) -> Result<Self> {
        let streams = mesh_streams(label, data)?.map(|attribute| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&attribute.data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let (index, element_count) = match &data.indices {
            Some(indices) => {
                let (contents, format): (&[u8], _) = match indices {
                    Indices::U16(v) => (bytemuck::cast_slice(v), wgpu::IndexFormat::Uint16),
                    Indices::U32(v) => (bytemuck::cast_slice(v), wgpu::IndexFormat::Uint32),
                };
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage: wgpu::BufferUsages::INDEX,
                });
                (Some((buffer, format)), indices.len() as u32)
            }
            None => (None, data.vertex_count()),
        };

        Ok(Self {
            streams,
            index,
            element_count,
            textures: data.textures.clone(),
        })
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        for ((semantic, _), buffer) in MESH_STREAMS.iter().zip(&self.streams) {
            pass.set_vertex_buffer(semantic.shader_location(), buffer.slice(..));
        }
        if let Some((buffer, format)) = &self.index {
            pass.set_index_buffer(buffer.slice(..), *format);
        }
    }

    /// Issues the draw after [`GpuModel::bind`].
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: u32) {
        if self.index.is_some() {
            pass.draw_indexed(0..self.element_count, 0, 0..instances);
        } else {
            pass.draw(0..self.element_count, 0..instances);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AttributeSemantic;

    fn attribute(semantic: AttributeSemantic, num_components: u32, vertices: usize) -> VertexAttribute {
        VertexAttribute {
            semantic,
            num_components,
            data: vec![0.5; num_components as usize * vertices],
        }
    }

    fn model(attributes: Vec<VertexAttribute>) -> ModelData {
        ModelData {
            attributes,
            indices: None,
            textures: TextureNames::default(),
        }
    }

    #[test]
    fn component_counts_map_to_float_formats() {
        assert_eq!(attribute_format(2), Some(wgpu::VertexFormat::Float32x2));
        assert_eq!(attribute_format(3).map(|f| f.size()), Some(12));
        assert_eq!(attribute_format(0), None);
        assert_eq!(attribute_format(5), None);
    }

    #[test]
    fn streams_come_back_in_slot_order_without_extras() {
        let data = model(vec![
            attribute(AttributeSemantic::Position, 3, 4),
            attribute(AttributeSemantic::Normal, 3, 4),
            attribute(AttributeSemantic::Texcoord, 2, 4),
            attribute(AttributeSemantic::Tangent, 3, 4),
            attribute(AttributeSemantic::Binormal, 3, 4),
        ]);
        let streams = mesh_streams("BigFishA", &data).unwrap();
        let semantics: Vec<_> = streams.iter().map(|a| a.semantic).collect();
        assert_eq!(
            semantics,
            vec![
                AttributeSemantic::Position,
                AttributeSemantic::Normal,
                AttributeSemantic::Texcoord
            ]
        );
    }

    #[test]
    fn model_without_normals_is_malformed() {
        let data = model(vec![
            attribute(AttributeSemantic::Position, 3, 3),
            attribute(AttributeSemantic::Texcoord, 2, 3),
        ]);
        let err = mesh_streams("RockB", &data).err().unwrap();
        match err {
            AquariumError::MalformedAsset { path, reason } => {
                assert_eq!(path, "RockB");
                assert!(reason.contains("Normal"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn wrong_component_count_is_malformed() {
        let data = model(vec![
            attribute(AttributeSemantic::Position, 3, 3),
            attribute(AttributeSemantic::Normal, 3, 3),
            attribute(AttributeSemantic::Texcoord, 3, 3),
        ]);
        assert!(matches!(
            mesh_streams("Seaweed", &data),
            Err(AquariumError::MalformedAsset { .. })
        ));
    }

    #[test]
    fn short_stream_is_malformed() {
        let data = model(vec![
            attribute(AttributeSemantic::Position, 3, 4),
            attribute(AttributeSemantic::Normal, 3, 4),
            attribute(AttributeSemantic::Texcoord, 2, 3),
        ]);
        assert!(matches!(
            mesh_streams("Globe", &data),
            Err(AquariumError::MalformedAsset { .. })
        ));
    }
}
// --- End of File: model.rs ---
