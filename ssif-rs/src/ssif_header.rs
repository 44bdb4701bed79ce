use crate::{
    error::SsifError,
    ext::io_ext::ArrayReadExt,
    packing_order::{PackingOrder, StackShape},
};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

/// Width of the name field at the start of the file.
pub const NAME_LENGTH: usize = 64;
/// Width of each record in the channel name table.
pub const CHANNEL_NAME_LENGTH: usize = 32;
/// Size of the fixed header: the name field followed by seven `u32` values.
pub const HEADER_SIZE: u64 = NAME_LENGTH as u64 + 7 * 4;

/// The fixed-layout header at the start of every SSIF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsifHeader {
    /// Human-readable label of the stack.
    pub name: String,
    /// Width in pixels of every plane.
    pub width: u32,
    /// Height in pixels of every plane.
    pub height: u32,
    /// Number of Z slices.
    pub depth: u32,
    /// Number of timepoints.
    pub timepoints: u32,
    /// Number of channels.
    pub channels: u32,
    /// Bytes per pixel: 1, 2 or 4.
    pub bytes_per_pixel: u32,
    /// The order the planes were written in.
    pub packing_order: PackingOrder,
    /// `depth * timepoints * channels`, checked at read time.
    plane_count: usize,
    /// `width * height * bytes_per_pixel`, checked at read time.
    plane_size: usize,
}

impl SsifHeader {
    /// Reads and validates the header from the start of `reader`.
    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<Self, SsifError> {
        let name = reader
            .read_record::<NAME_LENGTH>()
            .map_err(|e| SsifError::from_read(e, "header name"))?;
        let name = string_from_record(&name)?;

        let mut fields = [0u32; 7];
        reader
            .read_u32_into::<LittleEndian>(&mut fields)
            .map_err(|e| SsifError::from_read(e, "header fields"))?;
        let [width, height, depth, timepoints, channels, bytes_per_pixel, packing_order] = fields;

        for (field, value) in [
            ("width", width),
            ("height", height),
            ("depth", depth),
            ("timepoints", timepoints),
            ("channels", channels),
        ] {
            if value == 0 {
                return Err(SsifError::Format(format!("Header {field} is zero")));
            }
        }
        if !matches!(bytes_per_pixel, 1 | 2 | 4) {
            return Err(SsifError::Format(format!(
                "Unsupported bytes per pixel {bytes_per_pixel}"
            )));
        }
        let packing_order = PackingOrder::try_from(packing_order)?;

        let plane_count = StackShape {
            depth: depth as usize,
            timepoints: timepoints as usize,
            channels: channels as usize,
        }
        .plane_count()?;
        let plane_size = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(bytes_per_pixel as usize))
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or_else(|| {
                SsifError::Format(format!(
                    "Plane size {width}x{height}x{bytes_per_pixel} is too large"
                ))
            })?;

        Ok(SsifHeader {
            name,
            width,
            height,
            depth,
            timepoints,
            channels,
            bytes_per_pixel,
            packing_order,
            plane_count,
            plane_size,
        })
    }

    /// Sizes of the Z, T and C axes.
    pub fn shape(&self) -> StackShape {
        StackShape {
            depth: self.depth as usize,
            timepoints: self.timepoints as usize,
            channels: self.channels as usize,
        }
    }

    /// Number of planes stored in the file.
    pub fn plane_count(&self) -> usize {
        self.plane_count
    }

    /// Size in bytes of one decompressed plane.
    pub fn plane_size(&self) -> usize {
        self.plane_size
    }

    /// Reads the channel name table that directly follows the header.
    ///
    /// The table grows as records are read, so a short file fails at its end rather than
    /// reserving room for every declared channel up front.
    pub(crate) fn read_channel_names<R: Read>(
        &self,
        reader: &mut R,
    ) -> Result<Vec<String>, SsifError> {
        let mut names = Vec::new();
        for _ in 0..self.channels {
            let record = reader
                .read_record::<CHANNEL_NAME_LENGTH>()
                .map_err(|e| SsifError::from_read(e, "channel name table"))?;
            names.push(string_from_record(&record)?);
        }
        Ok(names)
    }
}

/// Decodes a null-terminated, padded UTF-8 record and trims surrounding whitespace.
pub(crate) fn string_from_record(record: &[u8]) -> Result<String, SsifError> {
    let end = record.iter().position(|&b| b == 0).unwrap_or(record.len());
    let text = std::str::from_utf8(&record[..end])
        .map_err(|e| SsifError::Format(format!("Invalid UTF-8 in name record: {e}")))?;
    Ok(text.trim().to_string())
}
