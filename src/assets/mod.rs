// --- File: assets/mod.rs ---
pub mod directory;

use crate::error::Result;
use glam::Mat4;

/// Vertex attribute kinds the shaders know about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeSemantic {
    Position,
    Normal,
    Texcoord,
    Tangent,
    Binormal,
}

impl AttributeSemantic {
    /// `@location` used for this attribute in every model shader.
    pub fn shader_location(self) -> u32 {
        match self {
            AttributeSemantic::Position => 0,
            AttributeSemantic::Normal => 1,
            AttributeSemantic::Texcoord => 2,
            AttributeSemantic::Tangent => 3,
            AttributeSemantic::Binormal => 4,
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "position" => Some(AttributeSemantic::Position),
            "normal" => Some(AttributeSemantic::Normal),
            "texCoord" => Some(AttributeSemantic::Texcoord),
            "tangent" => Some(AttributeSemantic::Tangent),
            "binormal" => Some(AttributeSemantic::Binormal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub semantic: AttributeSemantic,
    pub num_components: u32,
    pub data: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    pub fn len(&self) -> usize {
        match self {
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
        }
    }
}

/// Texture names a model refers to, relative to the `assets/` folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureNames {
    pub diffuse: Option<String>,
    pub normal_map: Option<String>,
    pub reflection_map: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    /// Sorted by shader location.
    pub attributes: Vec<VertexAttribute>,
    pub indices: Option<Indices>,
    pub textures: TextureNames,
}

impl ModelData {
    /// Vertices drawn when the model has no index list.
    pub fn vertex_count(&self) -> u32 {
        self.attributes
            .iter()
            .find(|a| a.semantic == AttributeSemantic::Position)
            .map(|a| a.data.len() as u32 / a.num_components.max(1))
            .unwrap_or(0)
    }
}

/// A named scene from the registry with its technique tag.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneDefinition {
    pub name: &'static str,
    pub program: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneData {
    pub definition: SceneDefinition,
    pub models: Vec<ModelData>,
}

/// One prop placed in the tank.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub scene: String,
    pub world: Mat4,
}

pub trait AssetSource {
    fn load_scene(&self, definition: &SceneDefinition) -> Result<SceneData>;
    fn load_placements(&self) -> Result<Vec<Placement>>;
    /// Raw bytes of a file under the asset root, e.g. an encoded texture.
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Every scene the aquarium knows about.
pub const SCENE_DEFINITIONS: &[SceneDefinition] = &[
    SceneDefinition { name: "SmallFishA", program: "fishReflection" },
    SceneDefinition { name: "MediumFishA", program: "fishNormal" },
    SceneDefinition { name: "MediumFishB", program: "fishReflection" },
    SceneDefinition { name: "BigFishA", program: "fishNormal" },
    SceneDefinition { name: "BigFishB", program: "fishNormal" },
    SceneDefinition { name: "Arch", program: "diffuse" },
    SceneDefinition { name: "Coral", program: "diffuse" },
    SceneDefinition { name: "CoralStandup", program: "diffuse" },
    SceneDefinition { name: "EnvironmentBox", program: "diffuse" },
    SceneDefinition { name: "FloorBase_Baked", program: "diffuse" },
    SceneDefinition { name: "FloorCenter", program: "diffuse" },
    SceneDefinition { name: "GlobeBase", program: "diffuse" },
    SceneDefinition { name: "GlobeInner", program: "inner" },
    SceneDefinition { name: "GlobeOuter", program: "outer" },
    SceneDefinition { name: "RockA", program: "diffuse" },
    SceneDefinition { name: "RockB", program: "diffuse" },
    SceneDefinition { name: "RockC", program: "diffuse" },
    SceneDefinition { name: "RuinColumn", program: "diffuse" },
    SceneDefinition { name: "Stone", program: "diffuse" },
    SceneDefinition { name: "Stones", program: "diffuse" },
    SceneDefinition { name: "SunknShip", program: "diffuse" },
    SceneDefinition { name: "SunknSub", program: "diffuse" },
    SceneDefinition { name: "SupportBeams", program: "diffuse" },
    SceneDefinition { name: "SeaweedA", program: "seaweed" },
    SceneDefinition { name: "SeaweedB", program: "seaweed" },
    SceneDefinition { name: "TreasureChest", program: "diffuse" },
];

/// Everything loaded up front before the scene is composed.
#[derive(Debug, Clone)]
pub struct AquariumAssets {
    pub scenes: Vec<SceneData>,
    pub placements: Vec<Placement>,
}

impl AquariumAssets {
    /// Loads every registered scene plus the placement list. Any failure is fatal.
    pub fn load(source: &dyn AssetSource) -> Result<Self> {
        let scenes = SCENE_DEFINITIONS
            .iter()
            .map(|definition| source.load_scene(definition))
            .collect::<Result<Vec<_>>>()?;
        let placements = source.load_placements()?;
        log::info!(
            "Loaded {} scenes and {} placements",
            scenes.len(),
            placements.len()
        );
        Ok(Self { scenes, placements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_locations_are_fixed() {
        let names = ["position", "normal", "texCoord", "tangent", "binormal"];
        for (expected, name) in names.iter().enumerate() {
            let semantic = AttributeSemantic::from_field_name(name).unwrap();
            assert_eq!(semantic.shader_location(), expected as u32);
        }
        assert_eq!(AttributeSemantic::from_field_name("indices"), None);
    }

    #[test]
    fn vertex_count_comes_from_positions() {
        let model = ModelData {
            attributes: vec![VertexAttribute {
                semantic: AttributeSemantic::Position,
                num_components: 3,
                data: vec![0.0; 12],
            }],
            indices: None,
            textures: TextureNames::default(),
        };
        assert_eq!(model.vertex_count(), 4);
    }

    #[test]
    fn every_species_has_a_registered_scene() {
        for species in crate::species::default_species() {
            assert!(
                SCENE_DEFINITIONS.iter().any(|d| d.name == species.name),
                "{}",
                species.name
            );
        }
    }
}
// --- End of File: assets/mod.rs ---
