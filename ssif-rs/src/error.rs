/// Represents all possible errors that can occur while reading an SSIF file.
///
/// Errors raised while opening a file (`Format`, `TruncatedFile`) are fatal for that open.
/// Errors raised while fetching planes (`NameNotFound`, `IndexOutOfRange`, `Decompression`)
/// fail only that call; the reader stays usable.
#[derive(Debug)]
pub enum SsifError {
    /// The header, packing order or a name record is malformed.
    Format(String),
    /// A read or skip ran past the end of the file.
    TruncatedFile(String),
    /// A channel name was requested that is not in the channel name table.
    NameNotFound(String),
    /// A plane payload failed to decompress or produced the wrong number of bytes.
    Decompression(String),
    /// A z, t or c index is not smaller than the size of its axis.
    IndexOutOfRange {
        /// The axis the index was given for (`"z"`, `"t"` or `"c"`).
        axis: &'static str,
        /// The requested index.
        index: usize,
        /// The declared size of the axis.
        size: usize,
    },
    /// Represents an error that occurs during I/O operations.
    Io(std::io::Error),
}

impl std::fmt::Display for SsifError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SsifError::Format(err) => write!(f, "Invalid SSIF format: {err}"),
            SsifError::TruncatedFile(err) => write!(f, "Truncated SSIF file: {err}"),
            SsifError::NameNotFound(name) => write!(f, "Channel name not found: {name}"),
            SsifError::Decompression(err) => write!(f, "Decompression failed: {err}"),
            SsifError::IndexOutOfRange { axis, index, size } => {
                write!(f, "Index {index} out of range for axis {axis} of size {size}")
            }
            SsifError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for SsifError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SsifError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SsifError {
    fn from(error: std::io::Error) -> Self {
        SsifError::Io(error)
    }
}

impl SsifError {
    /// Maps an I/O error to `TruncatedFile` when it was caused by hitting the end of the stream.
    pub(crate) fn from_read(error: std::io::Error, context: &str) -> Self {
        if error.kind() == std::io::ErrorKind::UnexpectedEof {
            SsifError::TruncatedFile(context.to_string())
        } else {
            SsifError::Io(error)
        }
    }
}
