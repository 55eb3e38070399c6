use crate::{
    error::EquicubeResult,
    face::Face,
    mapping::{face_uv, normalize, source_texel, spherical},
    projector::ProjectorBackend,
    raster::{FaceImage, SourceImage},
};

/// Scalar reference projector: one synchronous nested loop per face.
///
/// Pixels carry no cross-dependencies, so this is the correctness baseline
/// the parallel backend is compared against byte-for-byte.
#[derive(Debug, Default)]
pub struct CpuProjector;

impl CpuProjector {
    pub fn new() -> Self {
        Self
    }
}

impl ProjectorBackend for CpuProjector {
    fn project_face(
        &mut self,
        source: &SourceImage,
        face: Face,
        face_size: u32,
    ) -> EquicubeResult<FaceImage> {
        let (w, h) = (source.width(), source.height());
        let mut out = FaceImage::new(face_size, source.channels());

        for j in 0..face_size {
            for i in 0..face_size {
                let (u, v) = face_uv(i, j, face_size);
                let dir = normalize(face.raw_direction(u, v));
                let (lon, lat) = spherical(dir);
                let (sx, sy) = source_texel(lon, lat, w, h);
                out.put_pixel(i, j, source.pixel(sx, sy));
            }
        }

        Ok(out)
    }
}
