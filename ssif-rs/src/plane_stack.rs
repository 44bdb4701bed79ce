use byteorder::{ByteOrder, LittleEndian};
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, ShapeError, Zip};
use std::io;

/// Unsigned pixel types an SSIF plane can hold.
pub trait Pixel: Copy + Default + Into<f64> + 'static {
    /// Number of bytes per pixel on disk.
    const BYTES: usize;

    /// Decodes little-endian pixels from `src` into `dst`.
    fn decode_le(src: &[u8], dst: &mut [Self]);
}

impl Pixel for u8 {
    const BYTES: usize = 1;

    fn decode_le(src: &[u8], dst: &mut [Self]) {
        dst.copy_from_slice(src);
    }
}

impl Pixel for u16 {
    const BYTES: usize = 2;

    fn decode_le(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_u16_into(src, dst);
    }
}

impl Pixel for u32 {
    const BYTES: usize = 4;

    fn decode_le(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_u32_into(src, dst);
    }
}

/// How floating point output is scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Normalisation {
    /// Values are converted without scaling.
    #[default]
    None,
    /// Values are divided by the largest value the pixel type can hold.
    FullRange,
    /// Values are rescaled so the stack's own minimum maps to 0 and its maximum to 1.
    MinMax01,
}

/// The element type of an [`Image`](crate::ssif_reader::Image).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputKind {
    /// Pixels in their stored integer type.
    #[default]
    Raw,
    /// Pixels as `f64`, optionally normalised.
    Float(Normalisation),
}

/// A stack of planes of shape `(width, height, planes)` in the file's pixel type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaneStack {
    U8(Array3<u8>),
    U16(Array3<u16>),
    U32(Array3<u32>),
}

impl PlaneStack {
    /// Number of planes in the stack.
    pub fn len(&self) -> usize {
        self.shape()[2]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `[width, height, planes]`
    pub fn shape(&self) -> [usize; 3] {
        let shape = match self {
            PlaneStack::U8(a) => a.shape(),
            PlaneStack::U16(a) => a.shape(),
            PlaneStack::U32(a) => a.shape(),
        };
        [shape[0], shape[1], shape[2]]
    }

    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PlaneStack::U8(_) => u8::BYTES,
            PlaneStack::U16(_) => u16::BYTES,
            PlaneStack::U32(_) => u32::BYTES,
        }
    }

    /// Returns plane `k` widened to `u32`.
    ///
    /// # Panics
    /// Panics if `k` is not smaller than [`PlaneStack::len`].
    pub fn plane(&self, k: usize) -> Array2<u32> {
        match self {
            PlaneStack::U8(a) => a.slice(s![.., .., k]).mapv(u32::from),
            PlaneStack::U16(a) => a.slice(s![.., .., k]).mapv(u32::from),
            PlaneStack::U32(a) => a.slice(s![.., .., k]).to_owned(),
        }
    }

    /// Converts the stack to `f64`, scaled as requested.
    ///
    /// `MinMax01` uses the minimum and maximum over the whole stack, not per plane. A stack
    /// holding a single value maps to all zeros.
    pub fn to_float(&self, normalisation: Normalisation) -> Array3<f64> {
        let mut image = match self {
            PlaneStack::U8(a) => a.mapv(f64::from),
            PlaneStack::U16(a) => a.mapv(f64::from),
            PlaneStack::U32(a) => a.mapv(f64::from),
        };
        match normalisation {
            Normalisation::None => {}
            Normalisation::FullRange => {
                let max = full_range(self.bytes_per_pixel());
                image.mapv_inplace(|v| v / max);
            }
            Normalisation::MinMax01 => normalise_min_max(&mut image),
        }
        image
    }
}

/// `2^(8 * bytes_per_pixel) - 1`
pub(crate) fn full_range(bytes_per_pixel: usize) -> f64 {
    2f64.powi(8 * bytes_per_pixel as i32) - 1.0
}

pub(crate) fn normalise_min_max(image: &mut Array3<f64>) {
    let (min, max) = min_max(image.view());
    let range = max - min;
    if range > 0.0 {
        image.mapv_inplace(|v| (v - min) / range);
    } else {
        image.fill(0.0);
    }
}

fn min_max(image: ArrayView3<'_, f64>) -> (f64, f64) {
    image.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
        (min.min(v), max.max(v))
    })
}

/// Decodes one decompressed plane of exactly `width * height * T::BYTES` bytes.
///
/// The plane is stored row-major over `(width, height)`.
pub(crate) fn decode_plane<T: Pixel>(
    bytes: &[u8],
    width: usize,
    height: usize,
) -> Result<Array2<T>, ShapeError> {
    let mut pixels = vec![T::default(); bytes.len() / T::BYTES];
    T::decode_le(bytes, &mut pixels);
    Array2::from_shape_vec((width, height), pixels)
}

/// Allocates a zeroed `(width, height, planes)` stack, failing instead of aborting when the
/// request cannot be satisfied.
pub(crate) fn try_stack<T: Pixel>(
    width: usize,
    height: usize,
    planes: usize,
) -> io::Result<Array3<T>> {
    let too_large = || io::Error::new(io::ErrorKind::OutOfMemory, "plane stack is too large");
    let length = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(planes))
        .filter(|&n| n <= isize::MAX as usize / T::BYTES)
        .ok_or_else(too_large)?;

    let mut data: Vec<T> = Vec::new();
    data.try_reserve_exact(length)
        .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
    data.resize(length, T::default());

    Array3::from_shape_vec((width, height, planes), data).map_err(|_| too_large())
}

pub(crate) fn assign_plane<T: Pixel>(stack: &mut Array3<T>, k: usize, plane: ArrayView2<'_, T>) {
    Zip::from(stack.slice_mut(s![.., .., k]))
        .and(&plane)
        .for_each(|dst, &src| *dst = src);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    #[test]
    fn full_range_of_max_values_is_one() {
        let stack = PlaneStack::U16(Array::from_elem((3, 2, 2), u16::MAX));
        let image = stack.to_float(Normalisation::FullRange);
        assert!(image.iter().all(|&v| v == 1.0));

        let stack = PlaneStack::U8(Array::from_elem((1, 1, 1), u8::MAX));
        assert_eq!(stack.to_float(Normalisation::FullRange)[[0, 0, 0]], 1.0);

        let stack = PlaneStack::U32(Array::from_elem((2, 2, 1), u32::MAX));
        assert!(stack
            .to_float(Normalisation::FullRange)
            .iter()
            .all(|&v| v == 1.0));
    }

    #[test]
    fn min_max_spans_the_whole_stack() {
        let mut a = Array3::<u16>::from_elem((2, 2, 2), 50);
        a[[0, 0, 0]] = 10;
        a[[1, 1, 1]] = 90;
        let image = PlaneStack::U16(a).to_float(Normalisation::MinMax01);
        assert_eq!(image[[0, 0, 0]], 0.0);
        assert_eq!(image[[1, 1, 1]], 1.0);
        assert_eq!(image[[0, 1, 0]], 0.5);
        // Plane 0 has no 90 and plane 1 has no 10: neither is rescaled on its own.
        assert_eq!(image[[1, 1, 0]], 0.5);
        assert_eq!(image[[0, 0, 1]], 0.5);
    }

    #[test]
    fn constant_stack_normalises_to_zero() {
        let image = PlaneStack::U8(Array3::from_elem((2, 2, 1), 7)).to_float(Normalisation::MinMax01);
        assert!(image.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn no_normalisation_keeps_values() {
        let image = PlaneStack::U32(Array3::from_elem((1, 2, 1), 70_000)).to_float(Normalisation::None);
        assert_eq!(image[[0, 1, 0]], 70_000.0);
    }

    #[test]
    fn oversized_stack_is_an_error() {
        let err = try_stack::<u32>(usize::MAX, 2, 1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::OutOfMemory);
        let stack = try_stack::<u16>(3, 4, 0).unwrap();
        assert_eq!(stack.shape(), &[3, 4, 0]);
    }

    #[test]
    fn decode_plane_is_row_major_over_width_then_height() {
        let bytes: Vec<u8> = [1u16, 2, 3, 4, 5, 6]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let plane = decode_plane::<u16>(&bytes, 2, 3).unwrap();
        assert_eq!(plane.shape(), &[2, 3]);
        assert_eq!(plane[[0, 2]], 3);
        assert_eq!(plane[[1, 0]], 4);
    }
}
