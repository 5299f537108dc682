// --- File: textures.rs ---
use crate::assets::AssetSource;
use crate::cache::ResourceCache;
use crate::error::{AquariumError, Result};
use std::sync::Arc;

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Which shared sampler a texture is meant to be read with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SamplerKind {
    Repeat,
    Clamp,
    Cube,
}

#[derive(Debug)]
pub struct TextureRecord {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: SamplerKind,
}

impl TextureRecord {
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

// --- Decoding ---

/// Decodes `bytes` to premultiplied RGBA8, optionally flipped so row 0 is the bottom.
pub fn decode_rgba(path: &str, bytes: &[u8], flip_vertical: bool) -> Result<DecodedImage> {
    let image = image::load_from_memory(bytes).map_err(|source| AquariumError::TextureDecode {
        path: path.to_string(),
        source,
    })?;
    let image = if flip_vertical { image.flipv() } else { image };
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixels = rgba.into_raw();
    premultiply_alpha(&mut pixels);
    Ok(DecodedImage {
        width,
        height,
        pixels,
    })
}

pub fn premultiply_alpha(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let alpha = px[3] as u32;
        if alpha == 255 {
            continue;
        }
        for channel in &mut px[..3] {
            *channel = ((*channel as u32 * alpha + 127) / 255) as u8;
        }
    }
}

pub fn cube_key(faces: &[&str]) -> String {
    format!("cube:{}", faces.join("|"))
}

/// All faces must match the first one's size.
pub fn check_cube_faces(paths: &[&str], faces: &[DecodedImage]) -> Result<(u32, u32)> {
    let (width, height) = faces
        .first()
        .map(|f| (f.width, f.height))
        .unwrap_or((0, 0));
    for (path, face) in paths.iter().zip(faces) {
        if face.width != width || face.height != height {
            return Err(AquariumError::CubeFaceMismatch {
                path: path.to_string(),
                width: face.width,
                height: face.height,
            });
        }
    }
    Ok((width, height))
}

// --- Texture Cache ---

/// Loads each texture path once and hands out shared records.
pub struct TextureCache {
    records: ResourceCache<String, TextureRecord>,
    repeat_sampler: wgpu::Sampler,
    clamp_sampler: wgpu::Sampler,
    cube_sampler: wgpu::Sampler,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device) -> Self {
        let repeat_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Repeat Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let clamp_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Clamp Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let cube_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Cube Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            records: ResourceCache::new(),
            repeat_sampler,
            clamp_sampler,
            cube_sampler,
        }
    }

    pub fn sampler(&self, kind: SamplerKind) -> &wgpu::Sampler {
        match kind {
            SamplerKind::Repeat => &self.repeat_sampler,
            SamplerKind::Clamp => &self.clamp_sampler,
            SamplerKind::Cube => &self.cube_sampler,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Loads a 2D texture by asset path; `clamp` selects the clamp sampler.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &dyn AssetSource,
        path: &str,
        clamp: bool,
    ) -> Result<Arc<TextureRecord>> {
        self.records.get_or_create(path.to_string(), |key| {
            let bytes = source.read(key)?;
            let image = decode_rgba(key, &bytes, true)?;
            log::debug!("Loaded texture {key} ({}x{})", image.width, image.height);
            let texture = create_texture(device, key, image.width, image.height, 1);
            upload_layer(queue, &texture, &image, 0);
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            Ok(TextureRecord {
                texture,
                view,
                sampler: if clamp {
                    SamplerKind::Clamp
                } else {
                    SamplerKind::Repeat
                },
            })
        })
    }

    /// Loads six faces (+X, -X, +Y, -Y, +Z, -Z) into one cube texture.
    pub fn load_cube(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &dyn AssetSource,
        faces: &[&str; 6],
    ) -> Result<Arc<TextureRecord>> {
        self.records.get_or_create(cube_key(faces), |key| {
            let decoded = faces
                .iter()
                .map(|path| decode_rgba(path, &source.read(path)?, false))
                .collect::<Result<Vec<_>>>()?;
            let (width, height) = check_cube_faces(faces, &decoded)?;
            let texture = create_texture(device, key, width, height, 6);
            for (layer, face) in decoded.iter().enumerate() {
                upload_layer(queue, &texture, face, layer as u32);
            }
            let view = texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("Skybox Cube View"),
                dimension: Some(wgpu::TextureViewDimension::Cube),
                ..Default::default()
            });
            Ok(TextureRecord {
                texture,
                view,
                sampler: SamplerKind::Cube,
            })
        })
    }
}

fn create_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    layers: u32,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn upload_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &DecodedImage, layer: u32) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, fill: impl Fn(u32, u32) -> Rgba<u8>) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, fill);
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn premultiply_scales_colour_by_alpha() {
        let mut pixels = vec![200, 100, 50, 128, 10, 20, 30, 255, 255, 255, 255, 0];
        premultiply_alpha(&mut pixels);
        assert_eq!(&pixels[..4], &[100, 50, 25, 128]);
        assert_eq!(&pixels[4..8], &[10, 20, 30, 255]);
        assert_eq!(&pixels[8..], &[0, 0, 0, 0]);
    }

    #[test]
    fn decode_flips_rows() {
        let bytes = png(1, 2, |_, y| {
            if y == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let flipped = decode_rgba("t.png", &bytes, true).unwrap();
        assert_eq!((flipped.width, flipped.height), (1, 2));
        assert_eq!(&flipped.pixels[..4], &[0, 0, 255, 255]);
        let upright = decode_rgba("t.png", &bytes, false).unwrap();
        assert_eq!(&upright.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_rgba("broken.png", b"not an image", true).unwrap_err();
        assert!(matches!(err, AquariumError::TextureDecode { .. }));
    }

    #[test]
    fn cube_faces_must_match() {
        let face = |w, h| DecodedImage {
            width: w,
            height: h,
            pixels: vec![0; (w * h * 4) as usize],
        };
        let paths = ["a", "b", "c"];
        assert_eq!(
            check_cube_faces(&paths, &[face(4, 4), face(4, 4), face(4, 4)]).unwrap(),
            (4, 4)
        );
        let err = check_cube_faces(&paths, &[face(4, 4), face(2, 4), face(4, 4)]).unwrap_err();
        assert!(matches!(err, AquariumError::CubeFaceMismatch { width: 2, .. }));
    }

    #[test]
    fn cube_key_joins_face_paths() {
        assert_eq!(cube_key(&["x+.jpg", "x-.jpg"]), "cube:x+.jpg|x-.jpg");
    }
}
// --- End of File: textures.rs ---
