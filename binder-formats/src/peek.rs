//! Position-preserving stream peeks shared by the structural probes.

use std::io::{self, Read, Seek, SeekFrom};

/// Read up to `max` bytes from the current position and seek back.
pub(crate) fn peek<R: Read + Seek>(reader: &mut R, max: usize) -> io::Result<Vec<u8>> {
    let saved = reader.stream_position()?;
    let mut buffer = vec![0u8; max];
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buffer.truncate(filled);
    reader.seek(SeekFrom::Start(saved))?;
    Ok(buffer)
}

/// Total stream length, position restored.
pub(crate) fn stream_len<R: Seek>(reader: &mut R) -> io::Result<u64> {
    let saved = reader.stream_position()?;
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(saved))?;
    Ok(len)
}
