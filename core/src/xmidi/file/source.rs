use std::io::{Read, Seek, SeekFrom};

use crate::xmidi::error::XMidiError;
use crate::xmidi::vlq::{read_vlq, read_vlq2};

pub type Tag = [u8; 4];

/// Seekable byte source with the big and little endian readers the container
/// formats need.
pub struct Source<R> {
  inner: R,
  size: u64,
  position: u64,
}

impl<R: Read + Seek> Source<R> {
  pub fn new(mut inner: R) -> Result<Source<R>, XMidiError> {
    let position = inner.seek(SeekFrom::Current(0))?;
    let size = inner.seek(SeekFrom::End(0))?;
    inner.seek(SeekFrom::Start(position))?;
    Ok(Source {
      inner,
      size,
      position,
    })
  }

  pub fn size(&self) -> u64 {
    self.size
  }

  /// Current offset, kept in step with every read and seek.
  pub fn position(&mut self) -> Result<u64, XMidiError> {
    Ok(self.position)
  }

  pub fn seek(&mut self, position: u64) -> Result<(), XMidiError> {
    if position != self.position {
      self.position = self.inner.seek(SeekFrom::Start(position))?;
    }
    Ok(())
  }

  pub fn skip(&mut self, count: i64) -> Result<(), XMidiError> {
    if count != 0 {
      self.position = self.inner.seek(SeekFrom::Current(count))?;
    }
    Ok(())
  }

  fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), XMidiError> {
    self.inner.read_exact(buf)?;
    self.position += buf.len() as u64;
    Ok(())
  }

  pub fn read_u8(&mut self) -> Result<u8, XMidiError> {
    let mut buf = [0u8; 1];
    self.read_exact(&mut buf)?;
    Ok(buf[0])
  }

  pub fn read_u16_le(&mut self) -> Result<u16, XMidiError> {
    let mut buf = [0u8; 2];
    self.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
  }

  pub fn read_u16_be(&mut self) -> Result<u16, XMidiError> {
    let mut buf = [0u8; 2];
    self.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
  }

  pub fn read_u32_le(&mut self) -> Result<u32, XMidiError> {
    let mut buf = [0u8; 4];
    self.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
  }

  pub fn read_u32_be(&mut self) -> Result<u32, XMidiError> {
    let mut buf = [0u8; 4];
    self.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
  }

  pub fn read_tag(&mut self) -> Result<Tag, XMidiError> {
    let mut tag = [0u8; 4];
    self.read_exact(&mut tag)?;
    Ok(tag)
  }

  pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, XMidiError> {
    let mut buffer = vec![0u8; len];
    self.read_exact(&mut buffer)?;
    Ok(buffer)
  }

  pub fn read_vlq(&mut self) -> Result<u32, XMidiError> {
    let (value, count) = read_vlq(&mut self.inner)?;
    self.position += count as u64;
    Ok(value)
  }

  pub fn read_vlq2(&mut self) -> Result<u32, XMidiError> {
    let (value, count) = read_vlq2(&mut self.inner)?;
    self.position += count as u64;
    Ok(value)
  }
}

/// Chunks are padded to an even length.
pub fn padded(len: u32) -> u64 {
  (u64::from(len) + 1) & !1
}

pub fn tag_name(tag: &Tag) -> String {
  String::from_utf8_lossy(tag).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn readers() {
    let data = vec![b'F', b'O', b'R', b'M', 0, 0, 0, 10, 2, 0, 0x12, 0x34, 0x78, 0x56, 0x34, 0x12];
    let mut source = Source::new(Cursor::new(data)).unwrap();
    assert_eq!(source.size(), 16);
    assert_eq!(&source.read_tag().unwrap(), b"FORM");
    assert_eq!(source.read_u32_be().unwrap(), 10);
    assert_eq!(source.read_u16_le().unwrap(), 2);
    assert_eq!(source.read_u16_be().unwrap(), 0x1234);
    assert_eq!(source.read_u32_le().unwrap(), 0x1234_5678);
    assert!(source.read_u8().is_err());
  }

  #[test]
  fn seek_and_skip() {
    let mut source = Source::new(Cursor::new(vec![1u8, 2, 3, 4])).unwrap();
    source.skip(2).unwrap();
    assert_eq!(source.read_u8().unwrap(), 3);
    source.seek(0).unwrap();
    assert_eq!(source.position().unwrap(), 0);
    assert_eq!(source.read_bytes(2).unwrap(), vec![1, 2]);
  }

  struct SeekCounter {
    inner: Cursor<Vec<u8>>,
    seeks: usize,
  }

  impl Read for SeekCounter {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
      self.inner.read(buf)
    }
  }

  impl Seek for SeekCounter {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
      self.seeks += 1;
      self.inner.seek(pos)
    }
  }

  #[test]
  fn position_is_tracked_without_seeking() {
    let reader = SeekCounter {
      inner: Cursor::new(vec![0x12, 0x34, 0x81, 0x00, 0x05, 0x7f, 0x90, 0x3c]),
      seeks: 0,
    };
    let mut source = Source::new(reader).unwrap();
    let seeks = source.inner.seeks;

    assert_eq!(source.read_u16_be().unwrap(), 0x1234);
    assert_eq!(source.position().unwrap(), 2);
    assert_eq!(source.read_vlq().unwrap(), 0x80);
    assert_eq!(source.position().unwrap(), 4);
    assert_eq!(source.inner.seeks, seeks);

    // the status byte ending the delay is given back
    assert_eq!(source.read_vlq2().unwrap(), 0x84);
    assert_eq!(source.position().unwrap(), 6);
    assert_eq!(source.read_u8().unwrap(), 0x90);
    assert_eq!(source.position().unwrap(), 7);

    let seeks = source.inner.seeks;
    source.seek(7).unwrap();
    assert_eq!(source.inner.seeks, seeks);
    source.seek(0).unwrap();
    assert_eq!(source.position().unwrap(), 0);
    assert_eq!(source.read_u8().unwrap(), 0x12);
  }

  #[test]
  fn padding() {
    assert_eq!(padded(0), 0);
    assert_eq!(padded(5), 6);
    assert_eq!(padded(6), 6);
  }
}
