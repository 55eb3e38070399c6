/// One of the six axis-aligned cube map faces.
///
/// The declaration order is the canonical output order (px, nx, py, ny, pz,
/// nz); [`Face::ALL`] and output file naming both follow it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    Px,
    Nx,
    Py,
    Ny,
    Pz,
    Nz,
}

impl Face {
    /// All six faces in canonical order.
    pub const ALL: [Face; 6] = [Face::Px, Face::Nx, Face::Py, Face::Ny, Face::Pz, Face::Nz];

    /// Stable lowercase code used in output file names.
    pub fn code(self) -> &'static str {
        match self {
            Face::Px => "px",
            Face::Nx => "nx",
            Face::Py => "py",
            Face::Ny => "ny",
            Face::Pz => "pz",
            Face::Nz => "nz",
        }
    }

    /// Index of this face within [`Face::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Raw (unnormalized) view direction for a normalized face coordinate
    /// `(u, v)` in `[-1, 1]²`.
    ///
    /// The six formulas encode the shared "up"/"right" convention across
    /// faces; the caller must normalize the result. The norm is always
    /// positive since one component is ±1.
    pub fn raw_direction(self, u: f32, v: f32) -> [f32; 3] {
        match self {
            Face::Px => [1.0, -v, -u],
            Face::Nx => [-1.0, -v, u],
            Face::Py => [u, 1.0, v],
            Face::Ny => [u, -1.0, -v],
            Face::Pz => [u, -v, 1.0],
            Face::Nz => [-u, -v, -1.0],
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
