use crate::{
    error::{EquicubeError, EquicubeResult},
    face::Face,
    raster::{FaceImage, SourceImage},
};

/// One projection strategy.
///
/// Both implementations follow the identical clamped-truncation sampling
/// rule, so for the same `(source, face_size)` they pick the same source
/// texel for every destination pixel.
pub trait ProjectorBackend {
    /// Projects a single face into a fresh `face_size`×`face_size` buffer
    /// with the source's channel count.
    fn project_face(
        &mut self,
        source: &SourceImage,
        face: Face,
        face_size: u32,
    ) -> EquicubeResult<FaceImage>;
}

/// Which projector implementation to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectorKind {
    /// Single-threaded per-pixel reference implementation.
    Cpu,
    /// wgpu compute dispatch, one invocation per destination pixel.
    #[cfg(feature = "gpu")]
    Gpu,
}

/// Instantiates the selected backend. The gpu backend acquires its adapter,
/// device and pipeline here; failure surfaces as [`EquicubeError::Gpu`] and
/// is fatal for the run (the two backends are alternatives, not a retry
/// chain).
pub fn create_projector(kind: ProjectorKind) -> EquicubeResult<Box<dyn ProjectorBackend>> {
    match kind {
        ProjectorKind::Cpu => Ok(Box::new(crate::projector_cpu::CpuProjector::new())),
        #[cfg(feature = "gpu")]
        ProjectorKind::Gpu => Ok(Box::new(crate::projector_gpu::GpuProjector::new()?)),
    }
}

/// The six projected faces in canonical order (px, nx, py, ny, pz, nz).
#[derive(Clone, Debug)]
pub struct CubeFaces {
    faces: [FaceImage; 6],
}

impl CubeFaces {
    pub fn get(&self, face: Face) -> &FaceImage {
        &self.faces[face.index()]
    }

    /// Faces paired with their identity, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Face, &FaceImage)> {
        Face::ALL.iter().map(|&f| (f, &self.faces[f.index()]))
    }
}

/// Projects the panorama onto all six cube faces with the given backend.
///
/// Fails before touching the backend when `face_size` is zero. A failure on
/// any face aborts the whole run; no partial cubemap is ever returned.
#[tracing::instrument(skip(backend, source), fields(w = source.width(), h = source.height()))]
pub fn project_cubemap(
    backend: &mut dyn ProjectorBackend,
    source: &SourceImage,
    face_size: u32,
) -> EquicubeResult<CubeFaces> {
    if face_size == 0 {
        return Err(EquicubeError::invalid_config(
            "face_size must be at least 1",
        ));
    }

    let mut faces = Vec::with_capacity(6);
    for face in Face::ALL {
        tracing::debug!(%face, face_size, "projecting face");
        faces.push(backend.project_face(source, face, face_size)?);
    }
    let faces: [FaceImage; 6] = faces
        .try_into()
        .map_err(|_| anyhow::anyhow!("projector produced a wrong face count (bug)"))?;
    Ok(CubeFaces { faces })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Channels;

    struct CountingBackend {
        calls: Vec<Face>,
    }

    impl ProjectorBackend for CountingBackend {
        fn project_face(
            &mut self,
            source: &SourceImage,
            face: Face,
            face_size: u32,
        ) -> EquicubeResult<FaceImage> {
            self.calls.push(face);
            Ok(FaceImage::new(face_size, source.channels()))
        }
    }

    fn tiny_source() -> SourceImage {
        SourceImage::from_raw(2, 1, Channels::Rgb, vec![0; 6]).unwrap()
    }

    #[test]
    fn faces_are_projected_in_canonical_order() {
        let mut backend = CountingBackend { calls: vec![] };
        let cube = project_cubemap(&mut backend, &tiny_source(), 4).unwrap();
        assert_eq!(backend.calls, Face::ALL);
        let order: Vec<Face> = cube.iter().map(|(f, _)| f).collect();
        assert_eq!(order, Face::ALL);
    }

    #[test]
    fn zero_face_size_fails_before_projection() {
        let mut backend = CountingBackend { calls: vec![] };
        let err = project_cubemap(&mut backend, &tiny_source(), 0).unwrap_err();
        assert!(matches!(err, EquicubeError::InvalidConfig(_)));
        assert!(backend.calls.is_empty());
    }
}
