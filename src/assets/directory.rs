// --- File: assets/directory.rs ---
use super::{
    AssetSource, AttributeSemantic, Indices, ModelData, Placement, SceneData, SceneDefinition,
    TextureNames, VertexAttribute,
};
use crate::error::{AquariumError, Result};
use glam::Mat4;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const PLACEMENT_FILE: &str = "assets/PropPlacement.js";

// --- On-disk JSON shapes ---

#[derive(Debug, Deserialize)]
struct RawScene {
    models: Vec<RawModel>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    fields: BTreeMap<String, RawField>,
    #[serde(default)]
    textures: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    #[serde(rename = "numComponents")]
    num_components: u32,
    #[serde(rename = "type")]
    kind: String,
    data: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPlacements {
    objects: Vec<RawPlacement>,
}

#[derive(Debug, Deserialize)]
struct RawPlacement {
    name: String,
    #[serde(rename = "worldMatrix")]
    world_matrix: Vec<f32>,
}

/// Reads scenes, placements and textures from an aquarium asset folder.
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_text(&self, path: &str) -> Result<String> {
        fs::read_to_string(self.root.join(path)).map_err(|source| AquariumError::AssetRead {
            path: path.to_string(),
            source,
        })
    }
}

impl AssetSource for DirectoryAssets {
    fn load_scene(&self, definition: &SceneDefinition) -> Result<SceneData> {
        let path = format!("assets/{}.js", definition.name);
        let text = self.read_text(&path)?;
        let models = parse_scene(&path, &text)?;
        log::debug!("Scene {} has {} model(s)", definition.name, models.len());
        Ok(SceneData {
            definition: *definition,
            models,
        })
    }

    fn load_placements(&self) -> Result<Vec<Placement>> {
        let text = self.read_text(PLACEMENT_FILE)?;
        parse_placements(PLACEMENT_FILE, &text)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        fs::read(self.root.join(path)).map_err(|source| AquariumError::AssetRead {
            path: path.to_string(),
            source,
        })
    }
}

fn malformed(path: &str, reason: impl Into<String>) -> AquariumError {
    AquariumError::MalformedAsset {
        path: path.to_string(),
        reason: reason.into(),
    }
}

/// Converts JSON numbers to indices, rejecting anything that is not a whole
/// number in range for `T`.
fn index_values<T: TryFrom<u64>>(path: &str, data: &[f64]) -> Result<Vec<T>> {
    data.iter()
        .map(|&v| {
            let whole = (v.fract() == 0.0 && v >= 0.0 && v <= u64::MAX as f64)
                .then_some(v as u64)
                .ok_or_else(|| malformed(path, format!("index {v} is not a whole number")))?;
            T::try_from(whole).map_err(|_| malformed(path, format!("index {v} is out of range")))
        })
        .collect()
}

pub fn parse_scene(path: &str, text: &str) -> Result<Vec<ModelData>> {
    let raw: RawScene = serde_json::from_str(text).map_err(|source| AquariumError::AssetParse {
        path: path.to_string(),
        source,
    })?;
    raw.models
        .into_iter()
        .map(|model| convert_model(path, model))
        .collect()
}

fn convert_model(path: &str, raw: RawModel) -> Result<ModelData> {
    let mut attributes = Vec::new();
    let mut indices = None;

    for (name, field) in raw.fields {
        if name == "indices" {
            indices = Some(match field.kind.as_str() {
                "Uint16Array" => Indices::U16(index_values(path, &field.data)?),
                "Uint32Array" => Indices::U32(index_values(path, &field.data)?),
                other => return Err(malformed(path, format!("unsupported index type {other}"))),
            });
            continue;
        }
        let Some(semantic) = AttributeSemantic::from_field_name(&name) else {
            log::debug!("{path}: ignoring vertex field {name}");
            continue;
        };
        if field.kind != "Float32Array" {
            return Err(malformed(path, format!("{name} has unsupported type {}", field.kind)));
        }
        if field.num_components == 0 || field.num_components > 4 {
            return Err(malformed(
                path,
                format!("{name} has {} components", field.num_components),
            ));
        }
        if field.data.len() % field.num_components as usize != 0 {
            return Err(malformed(
                path,
                format!("{name} length is not a multiple of its component count"),
            ));
        }
        attributes.push(VertexAttribute {
            semantic,
            num_components: field.num_components,
            data: field.data.iter().map(|&v| v as f32).collect(),
        });
    }

    if !attributes
        .iter()
        .any(|a| a.semantic == AttributeSemantic::Position)
    {
        return Err(malformed(path, "model has no position field"));
    }
    attributes.sort_by_key(|a| a.semantic);

    let mut textures = raw.textures;
    Ok(ModelData {
        attributes,
        indices,
        textures: TextureNames {
            diffuse: textures.remove("diffuse"),
            normal_map: textures.remove("normalMap"),
            reflection_map: textures.remove("reflectionMap"),
        },
    })
}

pub fn parse_placements(path: &str, text: &str) -> Result<Vec<Placement>> {
    let raw: RawPlacements =
        serde_json::from_str(text).map_err(|source| AquariumError::AssetParse {
            path: path.to_string(),
            source,
        })?;
    raw.objects
        .into_iter()
        .map(|object| {
            let matrix: [f32; 16] = object.world_matrix.as_slice().try_into().map_err(|_| {
                malformed(
                    path,
                    format!("{} world matrix has {} values", object.name, object.world_matrix.len()),
                )
            })?;
            Ok(Placement {
                scene: object.name,
                world: Mat4::from_cols_array(&matrix),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const ROCK: &str = r#"{
        "models": [{
            "fields": {
                "texCoord": { "numComponents": 2, "type": "Float32Array", "data": [0, 0, 1, 0, 0, 1] },
                "position": { "numComponents": 3, "type": "Float32Array", "data": [0, 0, 0, 1, 0, 0, 0, 1, 0] },
                "normal": { "numComponents": 3, "type": "Float32Array", "data": [0, 0, 1, 0, 0, 1, 0, 0, 1] },
                "indices": { "numComponents": 3, "type": "Uint16Array", "data": [0, 1, 2] }
            },
            "textures": { "diffuse": "Rock.png", "normalMap": "Rock_N.png" }
        }]
    }"#;

    #[test]
    fn scene_fields_are_sorted_by_location() {
        let models = parse_scene("assets/RockA.js", ROCK).unwrap();
        assert_eq!(models.len(), 1);
        let model = &models[0];
        let order: Vec<_> = model.attributes.iter().map(|a| a.semantic).collect();
        assert_eq!(
            order,
            vec![
                AttributeSemantic::Position,
                AttributeSemantic::Normal,
                AttributeSemantic::Texcoord
            ]
        );
        assert_eq!(model.indices, Some(Indices::U16(vec![0, 1, 2])));
        assert_eq!(model.textures.diffuse.as_deref(), Some("Rock.png"));
        assert_eq!(model.textures.normal_map.as_deref(), Some("Rock_N.png"));
        assert_eq!(model.textures.reflection_map, None);
        assert_eq!(model.vertex_count(), 3);
    }

    #[test]
    fn unsupported_index_type_is_rejected() {
        let text = r#"{ "models": [{ "fields": {
            "position": { "numComponents": 3, "type": "Float32Array", "data": [0, 0, 0] },
            "indices": { "numComponents": 3, "type": "Int8Array", "data": [0] }
        } }] }"#;
        let err = parse_scene("assets/Bad.js", text).unwrap_err();
        assert!(matches!(err, AquariumError::MalformedAsset { .. }));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let text = r#"{ "models": [{ "fields": {
            "position": { "numComponents": 3, "type": "Float32Array", "data": [0, 0, 0] },
            "indices": { "numComponents": 3, "type": "Uint16Array", "data": [0, 65536, 1] }
        } }] }"#;
        let err = parse_scene("assets/Big.js", text).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn fractional_and_negative_indices_are_rejected() {
        for data in ["[0, 1.5, 2]", "[0, -1, 2]"] {
            let text = format!(
                r#"{{ "models": [{{ "fields": {{
                    "position": {{ "numComponents": 3, "type": "Float32Array", "data": [0, 0, 0] }},
                    "indices": {{ "numComponents": 3, "type": "Uint32Array", "data": {data} }}
                }} }}] }}"#
            );
            let err = parse_scene("assets/Odd.js", &text).unwrap_err();
            assert!(matches!(err, AquariumError::MalformedAsset { .. }), "{data}");
        }
    }

    #[test]
    fn wide_indices_fit_u32() {
        let text = r#"{ "models": [{ "fields": {
            "position": { "numComponents": 3, "type": "Float32Array", "data": [0, 0, 0] },
            "indices": { "numComponents": 3, "type": "Uint32Array", "data": [0, 70000, 4294967295] }
        } }] }"#;
        let models = parse_scene("assets/Wide.js", text).unwrap();
        assert_eq!(models[0].indices, Some(Indices::U32(vec![0, 70000, u32::MAX])));
    }

    #[test]
    fn model_without_positions_is_rejected() {
        let text = r#"{ "models": [{ "fields": {
            "normal": { "numComponents": 3, "type": "Float32Array", "data": [0, 0, 1] }
        } }] }"#;
        assert!(parse_scene("assets/Bad.js", text).is_err());
    }

    #[test]
    fn invalid_json_reports_the_path() {
        let err = parse_scene("assets/Broken.js", "{ nope").unwrap_err();
        assert!(err.to_string().contains("assets/Broken.js"));
    }

    #[test]
    fn placements_read_column_major_matrices() {
        let text = r#"{ "objects": [
            { "name": "RockA", "worldMatrix": [1,0,0,0, 0,1,0,0, 0,0,1,0, 5,6,7,1] }
        ] }"#;
        let placements = parse_placements(PLACEMENT_FILE, text).unwrap();
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].scene, "RockA");
        assert_eq!(
            placements[0].world.transform_point3(Vec3::ZERO),
            Vec3::new(5.0, 6.0, 7.0)
        );
    }

    #[test]
    fn short_matrix_is_malformed() {
        let text = r#"{ "objects": [ { "name": "RockA", "worldMatrix": [1, 0] } ] }"#;
        assert!(matches!(
            parse_placements(PLACEMENT_FILE, text),
            Err(AquariumError::MalformedAsset { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let assets = DirectoryAssets::new("/definitely/not/here");
        assert!(matches!(
            assets.read("static_assets/bubble.png"),
            Err(AquariumError::AssetRead { .. })
        ));
    }
}
// --- End of File: assets/directory.rs ---
