use crate::{error::SsifError, ext::io_ext::SeekExt};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{trace, warn};
use std::io::{Read, Seek};

/// Location of one compressed plane within the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneEntry {
    /// Absolute position of the first payload byte (just past the length prefix).
    pub offset: u64,
    /// Compressed payload size in bytes.
    pub length: u32,
}

impl PlaneEntry {
    /// Position one past the last payload byte.
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }
}

/// Per-plane byte ranges, indexed by physical (file-write) plane index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaneDirectory {
    entries: Vec<PlaneEntry>,
}

impl PlaneDirectory {
    /// Builds the directory from `reader`, which must be positioned at the first
    /// length prefix.
    ///
    /// Payloads are skipped, never read. The cursor is left just past the length prefix
    /// of the final entry.
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut R,
        plane_count: usize,
    ) -> Result<Self, SsifError> {
        let stream_len = reader.stream_length()?;
        let remaining = stream_len.saturating_sub(reader.stream_position()?);
        // Every entry needs at least its 4-byte length prefix.
        if (plane_count as u64).saturating_mul(4) > remaining {
            return Err(SsifError::TruncatedFile(format!(
                "{plane_count} planes declared but only {remaining} bytes follow the header"
            )));
        }
        let mut entries = Vec::with_capacity(plane_count);

        for index in 0..plane_count {
            let length = reader.read_u32::<LittleEndian>().map_err(|e| {
                SsifError::from_read(e, &format!("length prefix of plane {index}"))
            })?;
            let entry = PlaneEntry {
                offset: reader.stream_position()?,
                length,
            };
            trace!(
                "plane {index}: offset {} length {}",
                entry.offset,
                entry.length
            );

            if entry.end() > stream_len {
                if index + 1 < plane_count {
                    return Err(SsifError::TruncatedFile(format!(
                        "plane {index} ends at {} past end of file at {stream_len}",
                        entry.end()
                    )));
                }
                warn!(
                    "final plane {index} ends at {} past end of file at {stream_len}",
                    entry.end()
                );
            }
            if index + 1 < plane_count {
                reader.skip(entry.length)?;
            }
            entries.push(entry);
        }

        Ok(PlaneDirectory { entries })
    }

    /// Returns the entry for a physical plane index.
    pub fn get(&self, index: usize) -> Option<&PlaneEntry> {
        self.entries.get(index)
    }

    /// Number of entries, equal to the file's plane count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlaneEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[PlaneEntry] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a PlaneDirectory {
    type Item = &'a PlaneEntry;
    type IntoIter = std::slice::Iter<'a, PlaneEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn blocks(payloads: &[&[u8]]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for payload in payloads {
            bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            bytes.extend_from_slice(payload);
        }
        bytes
    }

    #[test]
    fn records_offsets_without_reading_payloads() {
        let bytes = blocks(&[b"abc", b"", b"defgh"]);
        let mut cursor = Cursor::new(bytes);
        let directory = PlaneDirectory::read(&mut cursor, 3).unwrap();
        assert_eq!(
            directory.entries(),
            &[
                PlaneEntry {
                    offset: 4,
                    length: 3
                },
                PlaneEntry {
                    offset: 11,
                    length: 0
                },
                PlaneEntry {
                    offset: 15,
                    length: 5
                },
            ]
        );
        // The final payload is not skipped.
        assert_eq!(cursor.position(), 15);
    }

    #[test]
    fn skip_past_end_is_truncated() {
        let mut bytes = blocks(&[b"abc", b"def"]);
        bytes[0] = 200;
        let err = PlaneDirectory::read(&mut Cursor::new(bytes), 2).unwrap_err();
        assert!(matches!(err, SsifError::TruncatedFile(_)));
    }

    #[test]
    fn missing_length_prefix_is_truncated() {
        let bytes = blocks(&[b"abc"]);
        let err = PlaneDirectory::read(&mut Cursor::new(bytes), 2).unwrap_err();
        assert!(matches!(err, SsifError::TruncatedFile(_)));
    }

    #[test]
    fn huge_plane_count_on_short_stream_is_truncated() {
        let bytes = blocks(&[b"abc"]);
        let err = PlaneDirectory::read(&mut Cursor::new(bytes), 1 << 40).unwrap_err();
        assert!(matches!(err, SsifError::TruncatedFile(_)));
        let err = PlaneDirectory::read(&mut Cursor::new(Vec::new()), usize::MAX).unwrap_err();
        assert!(matches!(err, SsifError::TruncatedFile(_)));
    }

    #[test]
    fn overlong_final_entry_is_accepted() {
        let mut bytes = blocks(&[b"abc", b"def"]);
        bytes[7] = 50;
        let directory = PlaneDirectory::read(&mut Cursor::new(bytes), 2).unwrap();
        assert_eq!(directory.get(1).map(|e| e.length), Some(50));
    }
}
