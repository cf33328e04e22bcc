//! GPU texture wrappers: CPU-side decode, immutable upload, fallback set.

use std::path::{Path, PathBuf};

use spinel_scene::MeshPaths;

/// Errors from texture asset loading. Terminal for the asset, never fatal
/// for the process: callers fall back to a placeholder.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read texture {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Decoded RGBA8 pixel data, not yet on the GPU.
///
/// Decoding is separated from upload so asset failures surface as a typed
/// error before any device is touched.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Decode an image file to RGBA8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded =
            image::load_from_memory(&bytes).map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        let rgba = decoded.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }

    /// 1x1 solid-color image, used for fallback slots.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }
}

/// An immutable GPU 2D image (one mip level), held through its sampled view.
pub struct Texture {
    view: wgpu::TextureView,
}

impl Texture {
    /// Upload decoded pixels as an immutable sRGB texture.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { view }
    }

    /// 1x1 white placeholder for slots whose asset failed to load.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::upload(device, queue, &TextureImage::solid([255; 4]), "white_fallback")
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// The four texture slots a shading effect can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    Diffuse,
    Normal,
    Specular,
    Glossiness,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Diffuse,
        TextureSlot::Normal,
        TextureSlot::Specular,
        TextureSlot::Glossiness,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Diffuse => "diffuse",
            Self::Normal => "normal",
            Self::Specular => "specular",
            Self::Glossiness => "glossiness",
        }
    }
}

/// One texture per slot, with white placeholders where the asset was
/// absent or failed to load.
pub struct TextureSet {
    diffuse: Texture,
    normal: Texture,
    specular: Texture,
    gloss: Texture,
    provided: [bool; 4],
}

impl TextureSet {
    /// Load every slot named in `paths`. Failures log a warning and leave
    /// the slot on its placeholder; construction never aborts.
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, paths: &MeshPaths) -> Self {
        let mut provided = [false; 4];
        let mut slot = |path: &Option<PathBuf>, index: usize, label: &str| {
            let loaded = path.as_ref().and_then(|p| match TextureImage::load(p) {
                Ok(img) => Some(Texture::upload(device, queue, &img, label)),
                Err(e) => {
                    tracing::warn!("texture slot '{label}' unavailable: {e}");
                    None
                }
            });
            provided[index] = loaded.is_some();
            loaded.unwrap_or_else(|| Texture::white(device, queue))
        };

        let diffuse = slot(&paths.diffuse, 0, "diffuse");
        let normal = slot(&paths.normal, 1, "normal");
        let specular = slot(&paths.specular, 2, "specular");
        let gloss = slot(&paths.gloss, 3, "glossiness");

        Self {
            diffuse,
            normal,
            specular,
            gloss,
            provided,
        }
    }

    pub fn view(&self, slot: TextureSlot) -> &wgpu::TextureView {
        match slot {
            TextureSlot::Diffuse => self.diffuse.view(),
            TextureSlot::Normal => self.normal.view(),
            TextureSlot::Specular => self.specular.view(),
            TextureSlot::Glossiness => self.gloss.view(),
        }
    }

    /// Whether the slot was backed by a successfully loaded asset.
    pub fn is_provided(&self, slot: TextureSlot) -> bool {
        let index = TextureSlot::ALL.iter().position(|s| *s == slot).unwrap_or(0);
        self.provided[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_missing_file_is_a_typed_error() {
        let err = TextureImage::load("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, TextureError::Read { .. }));
    }

    #[test]
    fn load_garbage_is_a_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not an image at all").unwrap();
        let err = TextureImage::load(file.path()).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }

    #[test]
    fn solid_image_is_one_pixel() {
        let img = TextureImage::solid([255, 0, 255, 255]);
        assert_eq!((img.width, img.height), (1, 1));
        assert_eq!(img.pixels.len(), 4);
    }

    #[test]
    fn shipped_placeholder_textures_decode() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/textures");
        for name in ["crate_diffuse.png", "flame_diffuse.png"] {
            let img = TextureImage::load(dir.join(name)).unwrap();
            assert!(img.width > 0 && img.height > 0);
            assert_eq!(img.pixels.len(), (img.width * img.height * 4) as usize);
        }
    }

    #[test]
    fn slot_names_are_stable() {
        assert_eq!(TextureSlot::Diffuse.name(), "diffuse");
        assert_eq!(TextureSlot::Glossiness.name(), "glossiness");
    }
}
