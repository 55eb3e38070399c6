use std::path::Path;

use crate::error::{EquicubeError, EquicubeResult};

/// Pixel channel layout. Everything in this crate is 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    Rgb,
    Rgba,
}

impl Channels {
    /// Bytes per pixel.
    pub fn count(self) -> usize {
        match self {
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }
}

/// Immutable equirectangular source panorama.
///
/// Loaded once, read-only for the whole run. Invariants: `width >= 1`,
/// `height >= 1`, `data.len() == width * height * channels.count()`.
#[derive(Clone, Debug)]
pub struct SourceImage {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl SourceImage {
    /// Decodes a panorama from disk. Any codec the `image` crate supports is
    /// accepted as long as it decodes to 8-bit RGB or RGBA.
    pub fn open(path: impl AsRef<Path>) -> EquicubeResult<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|e| {
            EquicubeError::invalid_input(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_decoded(decoded)
    }

    /// Wraps an already-decoded image, rejecting unsupported pixel formats
    /// (grayscale, indexed, 16-bit, float) before any face buffer exists.
    pub fn from_decoded(decoded: image::DynamicImage) -> EquicubeResult<Self> {
        match decoded {
            image::DynamicImage::ImageRgb8(img) => {
                let (width, height) = img.dimensions();
                Self::from_raw(width, height, Channels::Rgb, img.into_raw())
            }
            image::DynamicImage::ImageRgba8(img) => {
                let (width, height) = img.dimensions();
                Self::from_raw(width, height, Channels::Rgba, img.into_raw())
            }
            other => Err(EquicubeError::invalid_input(format!(
                "source must be 8-bit RGB or RGBA, got {:?}",
                other.color()
            ))),
        }
    }

    /// Builds a source image from raw interleaved pixel bytes.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: Channels,
        data: Vec<u8>,
    ) -> EquicubeResult<Self> {
        if width == 0 || height == 0 {
            return Err(EquicubeError::invalid_input(format!(
                "source dimensions must be at least 1x1, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(EquicubeError::invalid_input(format!(
                "pixel buffer holds {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Raw interleaved pixel bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Channel bytes of the texel at `(x, y)`. Caller guarantees bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let bpp = self.channels.count();
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        &self.data[start..start + bpp]
    }
}

/// One square cube map face.
///
/// Created zeroed, fully written exactly once by a projector, then treated
/// as immutable by everyone downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceImage {
    pub size: u32,
    pub channels: Channels,
    pub data: Vec<u8>,
}

impl FaceImage {
    pub fn new(size: u32, channels: Channels) -> Self {
        Self {
            size,
            channels,
            data: vec![0; size as usize * size as usize * channels.count()],
        }
    }

    /// Writes the channel bytes of destination pixel `(i, j)`.
    pub fn put_pixel(&mut self, i: u32, j: u32, px: &[u8]) {
        let bpp = self.channels.count();
        let start = (j as usize * self.size as usize + i as usize) * bpp;
        self.data[start..start + bpp].copy_from_slice(px);
    }

    /// Channel bytes of destination pixel `(i, j)`.
    pub fn pixel(&self, i: u32, j: u32) -> &[u8] {
        let bpp = self.channels.count();
        let start = (j as usize * self.size as usize + i as usize) * bpp;
        &self.data[start..start + bpp]
    }
}
