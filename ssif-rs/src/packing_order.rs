use crate::error::SsifError;

/// The nested-loop order in which the planes of an SSIF file were written.
///
/// The name lists the axes from the fastest varying (innermost) to the slowest varying
/// (outermost), so in a `ZTC` file consecutive planes step through Z first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PackingOrder {
    Ztc = 0,
    Zct = 1,
    Tzc = 2,
    Tcz = 3,
    Czt = 4,
    Ctz = 5,
}

impl TryFrom<u32> for PackingOrder {
    type Error = SsifError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PackingOrder::Ztc),
            1 => Ok(PackingOrder::Zct),
            2 => Ok(PackingOrder::Tzc),
            3 => Ok(PackingOrder::Tcz),
            4 => Ok(PackingOrder::Czt),
            5 => Ok(PackingOrder::Ctz),
            other => Err(SsifError::Format(format!(
                "Unknown packing order index {other}"
            ))),
        }
    }
}

impl std::fmt::Display for PackingOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PackingOrder::Ztc => "ZTC",
            PackingOrder::Zct => "ZCT",
            PackingOrder::Tzc => "TZC",
            PackingOrder::Tcz => "TCZ",
            PackingOrder::Czt => "CZT",
            PackingOrder::Ctz => "CTZ",
        };
        f.write_str(name)
    }
}

/// Sizes of the three stacked axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackShape {
    pub depth: usize,
    pub timepoints: usize,
    pub channels: usize,
}

impl StackShape {
    /// Number of planes stored in the file.
    pub fn plane_count(&self) -> Result<usize, SsifError> {
        self.depth
            .checked_mul(self.timepoints)
            .and_then(|n| n.checked_mul(self.channels))
            .ok_or_else(|| {
                SsifError::Format(format!(
                    "Plane count {}x{}x{} overflows",
                    self.depth, self.timepoints, self.channels
                ))
            })
    }
}

/// `first * n1 + second * n2 + third`
#[inline]
fn linear_index(first: usize, second: usize, third: usize, n1: usize, n2: usize) -> usize {
    first * n1 + second * n2 + third
}

impl PackingOrder {
    /// All packing orders, in header index order.
    pub const ALL: [PackingOrder; 6] = [
        PackingOrder::Ztc,
        PackingOrder::Zct,
        PackingOrder::Tzc,
        PackingOrder::Tcz,
        PackingOrder::Czt,
        PackingOrder::Ctz,
    ];

    /// The value stored in the header for this order.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Maps a logical `(z, t, c)` coordinate to its position in file-write order.
    ///
    /// Bounds are not checked here; see [`PackingOrder::resolve`].
    pub fn physical_index(self, shape: &StackShape, z: usize, t: usize, c: usize) -> usize {
        let StackShape {
            depth: nz,
            timepoints: nt,
            channels: nc,
        } = *shape;
        match self {
            PackingOrder::Ztc => linear_index(c, t, z, nz * nt, nz),
            PackingOrder::Zct => linear_index(t, c, z, nz * nc, nz),
            PackingOrder::Tzc => linear_index(c, z, t, nz * nt, nt),
            PackingOrder::Tcz => linear_index(z, c, t, nt * nc, nt),
            PackingOrder::Czt => linear_index(t, z, c, nz * nc, nc),
            PackingOrder::Ctz => linear_index(z, t, c, nt * nc, nc),
        }
    }

    /// Resolves the cross product of `z`, `t` and `c` into physical plane indices.
    ///
    /// The result is ordered z-outer, t-middle, c-inner regardless of the packing order,
    /// and every index is checked against its axis size first.
    pub fn resolve(
        self,
        shape: &StackShape,
        z: &[usize],
        t: &[usize],
        c: &[usize],
    ) -> Result<Vec<usize>, SsifError> {
        check_axis("z", z, shape.depth)?;
        check_axis("t", t, shape.timepoints)?;
        check_axis("c", c, shape.channels)?;

        let mut indices = Vec::with_capacity(z.len() * t.len() * c.len());
        for &zi in z {
            for &ti in t {
                for &ci in c {
                    indices.push(self.physical_index(shape, zi, ti, ci));
                }
            }
        }
        Ok(indices)
    }
}

fn check_axis(axis: &'static str, indices: &[usize], size: usize) -> Result<(), SsifError> {
    match indices.iter().find(|&&index| index >= size) {
        Some(&index) => Err(SsifError::IndexOutOfRange { axis, index, size }),
        None => Ok(()),
    }
}
