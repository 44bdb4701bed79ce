use crate::{
    error::SsifError,
    ext::io_ext::{ArrayReadExt, SeekExt},
    packing_order::PackingOrder,
    plane_directory::PlaneDirectory,
    plane_stack::{
        assign_plane, decode_plane, try_stack, Normalisation, OutputKind, Pixel, PlaneStack,
    },
    selection::{ChannelSelection, Selection},
    ssif_header::SsifHeader,
};
use flate2::read::ZlibDecoder;
use log::{debug, trace};
use ndarray::Array3;
use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

/// The result of [`SsifReader::get_image`].
#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    /// Pixels in the file's own integer type.
    Raw(PlaneStack),
    /// Pixels converted to `f64`.
    Float(Array3<f64>),
}

impl Image {
    /// `[width, height, planes]`
    pub fn shape(&self) -> [usize; 3] {
        match self {
            Image::Raw(stack) => stack.shape(),
            Image::Float(a) => [a.shape()[0], a.shape()[1], a.shape()[2]],
        }
    }

    pub fn into_raw(self) -> Option<PlaneStack> {
        match self {
            Image::Raw(stack) => Some(stack),
            Image::Float(_) => None,
        }
    }

    pub fn into_float(self) -> Option<Array3<f64>> {
        match self {
            Image::Float(a) => Some(a),
            Image::Raw(_) => None,
        }
    }
}

/// An open SSIF file.
///
/// `SsifReader` is the main entry point of the crate. Opening parses the header, the
/// channel name table and the plane directory in a single forward pass; payloads are only
/// read and decompressed when planes are requested.
///
/// ```no_run
/// use ssif_rs::{Normalisation, OutputKind, SsifReader};
///
/// let mut reader = SsifReader::open("stack.ssif").unwrap();
/// println!("{} ({}x{})", reader.name(), reader.width(), reader.height());
///
/// // Z slices 0 and 1 at timepoint 2 for the channel named "red".
/// let planes = reader.read_planes(vec![0usize, 1], 2usize, "red").unwrap();
/// assert_eq!(planes.len(), 2);
///
/// let image = reader
///     .get_image(0usize, 0usize, 0usize, OutputKind::Float(Normalisation::FullRange))
///     .unwrap();
/// ```
///
/// # Thread Safety
///
/// Every fetch seeks the underlying stream, so fetching takes `&mut self`. To read planes
/// from several threads, open one reader per thread.
#[derive(Debug)]
pub struct SsifReader<R> {
    /// The underlying stream.
    reader: R,
    /// Parsed header.
    header: SsifHeader,
    /// Channel names, indexed by channel.
    channel_names: Vec<String>,
    /// Plane byte ranges, indexed by physical plane index.
    directory: PlaneDirectory,
}

impl SsifReader<BufReader<File>> {
    /// Opens the SSIF file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SsifError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> SsifReader<R> {
    /// Parses the header, channel name table and plane directory from `reader`.
    pub fn new(mut reader: R) -> Result<Self, SsifError> {
        reader.seek(SeekFrom::Start(0))?;
        let header = SsifHeader::read(&mut reader)?;
        let channel_names = header.read_channel_names(&mut reader)?;
        let directory = PlaneDirectory::read(&mut reader, header.plane_count())?;

        debug!(
            "opened SSIF '{}': {}x{} px, Z={} T={} C={}, {} byte(s)/px, packing {}, {} planes",
            header.name,
            header.width,
            header.height,
            header.depth,
            header.timepoints,
            header.channels,
            header.bytes_per_pixel,
            header.packing_order,
            directory.len()
        );

        Ok(SsifReader {
            reader,
            header,
            channel_names,
            directory,
        })
    }

    pub fn header(&self) -> &SsifHeader {
        &self.header
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn width(&self) -> usize {
        self.header.width as usize
    }

    pub fn height(&self) -> usize {
        self.header.height as usize
    }

    pub fn depth(&self) -> usize {
        self.header.depth as usize
    }

    pub fn timepoints(&self) -> usize {
        self.header.timepoints as usize
    }

    pub fn channels(&self) -> usize {
        self.header.channels as usize
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.header.bytes_per_pixel as usize
    }

    pub fn packing_order(&self) -> PackingOrder {
        self.header.packing_order
    }

    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    pub fn directory(&self) -> &PlaneDirectory {
        &self.directory
    }

    pub fn plane_count(&self) -> usize {
        self.directory.len()
    }

    /// Returns the position of `name` in the channel name table. Names are matched exactly.
    pub fn channel_index(&self, name: &str) -> Result<usize, SsifError> {
        self.channel_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| SsifError::NameNotFound(name.to_string()))
    }

    /// Resolves a z/t/c selection into physical plane indices, z-outer, t-middle, c-inner.
    pub fn resolve(
        &self,
        z: impl Into<Selection>,
        t: impl Into<Selection>,
        c: impl Into<ChannelSelection>,
    ) -> Result<Vec<usize>, SsifError> {
        let (z, t) = (z.into(), t.into());
        let c = match c.into() {
            ChannelSelection::Index(selection) => selection.as_slice().to_vec(),
            ChannelSelection::Names(names) => names
                .iter()
                .map(|name| self.channel_index(name))
                .collect::<Result<Vec<_>, _>>()?,
        };
        self.header
            .packing_order
            .resolve(&self.header.shape(), z.as_slice(), t.as_slice(), &c)
    }

    /// Fetches the cross product of `z`, `t` and `c` as raw pixels.
    ///
    /// Plane `k` of the result is the `k`-th combination with z varying slowest and c
    /// fastest. The first plane that fails to read or decompress aborts the whole request.
    pub fn read_planes(
        &mut self,
        z: impl Into<Selection>,
        t: impl Into<Selection>,
        c: impl Into<ChannelSelection>,
    ) -> Result<PlaneStack, SsifError> {
        let indices = self.resolve(z, t, c)?;
        Ok(match self.header.bytes_per_pixel {
            1 => PlaneStack::U8(self.read_stack(&indices)?),
            2 => PlaneStack::U16(self.read_stack(&indices)?),
            _ => PlaneStack::U32(self.read_stack(&indices)?),
        })
    }

    /// Fetches the cross product of `z`, `t` and `c`, converted as `kind` asks.
    pub fn get_image(
        &mut self,
        z: impl Into<Selection>,
        t: impl Into<Selection>,
        c: impl Into<ChannelSelection>,
        kind: OutputKind,
    ) -> Result<Image, SsifError> {
        let stack = self.read_planes(z, t, c)?;
        Ok(match kind {
            OutputKind::Raw => Image::Raw(stack),
            OutputKind::Float(normalisation) => Image::Float(stack.to_float(normalisation)),
        })
    }

    /// Shorthand for [`SsifReader::get_image`] with `OutputKind::Float`.
    pub fn get_float_image(
        &mut self,
        z: impl Into<Selection>,
        t: impl Into<Selection>,
        c: impl Into<ChannelSelection>,
        normalisation: Normalisation,
    ) -> Result<Array3<f64>, SsifError> {
        Ok(self.read_planes(z, t, c)?.to_float(normalisation))
    }

    /// Reads and decompresses the plane at a physical index.
    ///
    /// Returns exactly `width * height * bytes_per_pixel` bytes.
    pub fn read_plane_bytes(&mut self, index: usize) -> Result<Vec<u8>, SsifError> {
        let entry = *self
            .directory
            .get(index)
            .ok_or(SsifError::IndexOutOfRange {
                axis: "plane",
                index,
                size: self.directory.len(),
            })?;
        trace!(
            "reading plane {index}: offset {} length {}",
            entry.offset,
            entry.length
        );

        let stream_len = self.reader.stream_length()?;
        if entry.end() > stream_len {
            return Err(SsifError::TruncatedFile(format!(
                "payload of plane {index} ends at {} past end of file at {stream_len}",
                entry.end()
            )));
        }

        self.reader.seek(SeekFrom::Start(entry.offset))?;
        let compressed = self
            .reader
            .read_array(entry.length as usize)
            .map_err(|e| SsifError::from_read(e, &format!("payload of plane {index}")))?;

        let expected = self.header.plane_size();
        let mut plane = Vec::new();
        ZlibDecoder::new(&compressed[..])
            .take(expected as u64 + 1)
            .read_to_end(&mut plane)
            .map_err(|e| SsifError::Decompression(format!("plane {index}: {e}")))?;
        if plane.len() != expected {
            return Err(SsifError::Decompression(format!(
                "plane {index} decompressed to {} bytes, expected {expected}",
                plane.len()
            )));
        }
        Ok(plane)
    }

    fn read_stack<T: Pixel>(&mut self, indices: &[usize]) -> Result<Array3<T>, SsifError> {
        let (width, height) = (self.width(), self.height());
        // Allocated once the first plane has decompressed to its declared size.
        let mut stack: Option<Array3<T>> = None;
        for (k, &index) in indices.iter().enumerate() {
            let bytes = self.read_plane_bytes(index)?;
            let plane = decode_plane::<T>(&bytes, width, height)
                .map_err(|e| SsifError::Decompression(format!("plane {index}: {e}")))?;
            if stack.is_none() {
                stack = Some(try_stack(width, height, indices.len())?);
            }
            if let Some(stack) = stack.as_mut() {
                assign_plane(stack, k, plane.view());
            }
        }
        match stack {
            Some(stack) => Ok(stack),
            None => Ok(try_stack(width, height, 0)?),
        }
    }

    /// Releases the underlying stream.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
