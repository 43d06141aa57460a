//! Variable length quantities.
//!
//! Standard MIDI files use the usual 7 bits per byte encoding. XMIDI stores
//! the delay between events as a run of bytes below `0x80` that are summed
//! together, the first byte with the high bit set being the next status byte.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};

const MAX_VLQ_BYTES: usize = 4;

fn read_byte<R: Read>(source: &mut R) -> io::Result<Option<u8>> {
  let mut buf = [0u8; 1];
  loop {
    match source.read(&mut buf) {
      Ok(0) => return Ok(None),
      Ok(_) => return Ok(Some(buf[0])),
      Err(ref err) if err.kind() == ErrorKind::Interrupted => continue,
      Err(err) => return Err(err),
    }
  }
}

/// Reads a standard MIDI VLQ, returning the value and the number of bytes read.
pub fn read_vlq<R: Read>(source: &mut R) -> io::Result<(u32, usize)> {
  let mut quant = 0u32;
  for i in 0..MAX_VLQ_BYTES {
    let data = read_byte(source)?.ok_or_else(|| io::Error::from(ErrorKind::UnexpectedEof))?;
    quant = (quant << 7) | u32::from(data & 0x7f);
    if data & 0x80 == 0 {
      return Ok((quant, i + 1));
    }
  }
  Ok((quant, MAX_VLQ_BYTES))
}

/// Reads an XMIDI delay, returning the value and the number of bytes read.
///
/// The terminating byte is left in the source.
pub fn read_vlq2<R: Read + Seek>(source: &mut R) -> io::Result<(u32, usize)> {
  let mut quant = 0u32;
  let mut count = 0;
  while let Some(data) = read_byte(source)? {
    if data & 0x80 != 0 {
      source.seek(SeekFrom::Current(-1))?;
      break;
    }
    quant += u32::from(data);
    count += 1;
  }
  Ok((quant, count))
}

/// Writes a standard MIDI VLQ, returning the number of bytes written.
pub fn write_vlq<W: Write>(dest: &mut W, value: u32) -> io::Result<usize> {
  let value = value & 0x0fff_ffff;
  let mut buffer = value & 0x7f;
  let mut rest = value >> 7;
  while rest != 0 {
    buffer <<= 8;
    buffer |= (rest & 0x7f) | 0x80;
    rest >>= 7;
  }

  let mut written = 0;
  loop {
    dest.write_all(&[(buffer & 0xff) as u8])?;
    written += 1;
    if buffer & 0x80 != 0 {
      buffer >>= 8;
    } else {
      break;
    }
  }
  Ok(written)
}
