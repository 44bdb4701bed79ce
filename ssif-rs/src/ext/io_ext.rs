use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

/// A trait that reads fixed-width byte records from any `Read` type.
pub trait ArrayReadExt: Read {
    /// Reads exactly `length` bytes.
    fn read_array(&mut self, length: usize) -> io::Result<Vec<u8>>;

    /// Reads exactly `N` bytes into a stack array.
    fn read_record<const N: usize>(&mut self) -> io::Result<[u8; N]>;
}

impl<T> ArrayReadExt for T
where
    T: Read,
{
    fn read_array(&mut self, length: usize) -> io::Result<Vec<u8>> {
        let mut result: Vec<u8> = Vec::new();

        result
            .try_reserve_exact(length)
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
        result.resize(length, 0);

        self.read_exact(&mut result)?;

        Ok(result)
    }

    fn read_record<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut record = [0u8; N];
        self.read_exact(&mut record)?;
        Ok(record)
    }
}

/// Utility methods for working with seekable streams.
pub trait SeekExt: Seek {
    /// Skips over the given number of bytes from the current position.
    fn skip<P: Copy + 'static>(&mut self, size: P) -> io::Result<u64>
    where
        u64: TryFrom<P>;

    /// Returns the total length of the stream, leaving the position unchanged.
    fn stream_length(&mut self) -> io::Result<u64>;
}

impl<T> SeekExt for T
where
    T: Seek,
{
    fn skip<P: Copy + 'static>(&mut self, size: P) -> io::Result<u64>
    where
        u64: TryFrom<P>,
    {
        let size = u64::try_from(size).map_err(|_| io::Error::from(io::ErrorKind::InvalidData))?;
        let size = i64::try_from(size).map_err(|_| io::Error::from(io::ErrorKind::InvalidData))?;

        self.seek(SeekFrom::Current(size))
    }

    fn stream_length(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        if pos != len {
            self.seek(SeekFrom::Start(pos))?;
        }
        Ok(len)
    }
}
