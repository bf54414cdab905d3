use iftraf_stubs::InterfaceCounters;

use crate::error::IftrafError;

/// Routing message type carrying extended interface statistics.
pub const RTM_IFINFO2: u8 = 0x12;

// Offsets into the common `if_msghdr` prefix shared by every routing
// message: total length, version, type.
const MSGHDR_LEN: usize = 4;

// Offsets into `if_msghdr2` and the `if_data64` it embeds at offset 32.
const IFM_FLAGS: usize = 8;
const IFM_INDEX: usize = 12;
const IFM2_DATA: usize = 32;
const IFI_IPACKETS: usize = IFM2_DATA + 24;
const IFI_OPACKETS: usize = IFM2_DATA + 40;
const IFI_IBYTES: usize = IFM2_DATA + 64;
const IFI_OBYTES: usize = IFM2_DATA + 72;

/// Shortest `RTM_IFINFO2` message that still contains the byte counters.
pub const IFINFO2_MIN_LEN: usize = IFI_OBYTES + 8;

/// One routing message out of the interface list buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceRecord {
  /// An `RTM_IFINFO2` message with embedded traffic counters. The embedded
  /// counters truncate at 4 GiB on some kernels and lag real traffic by up
  /// to about 1 KiB.
  GenericInfo(GenericInfo),
  /// Any other routing message. Carries no traffic data and is skipped.
  Other { msg_type: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericInfo {
  pub index: u16,
  pub flags: u32,
  pub counters: InterfaceCounters,
}

/// Cursor over the raw interface list buffer, yielding one record per
/// routing message. The declared message length drives the cursor, so it
/// is bounds checked before every record and any inconsistency is fatal.
pub struct RecordIter<'a> {
  buf: &'a [u8],
  offset: usize,
  failed: bool,
}

impl<'a> RecordIter<'a> {
  pub fn new(buf: &'a [u8]) -> Self {
    Self {
      buf,
      offset: 0,
      failed: false,
    }
  }
}

impl Iterator for RecordIter<'_> {
  type Item = Result<InterfaceRecord, IftrafError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed || self.offset >= self.buf.len() {
      return None;
    }
    match parse_record(self.buf, self.offset) {
      Ok((record, next_offset)) => {
        self.offset = next_offset;
        Some(Ok(record))
      }
      Err(err) => {
        self.failed = true;
        Some(Err(err))
      }
    }
  }
}

fn parse_record(
  buf: &[u8],
  offset: usize,
) -> Result<(InterfaceRecord, usize), IftrafError> {
  let remaining = buf.len() - offset;
  if remaining < MSGHDR_LEN {
    return Err(malformed(offset, "truncated message header".to_owned()));
  }
  let msg_len = read_u16(buf, offset) as usize;
  if msg_len < MSGHDR_LEN {
    return Err(malformed(
      offset,
      format!("declared length {msg_len} is shorter than the header"),
    ));
  }
  if msg_len > remaining {
    return Err(malformed(
      offset,
      format!("declared length {msg_len} overruns the {remaining} remaining bytes"),
    ));
  }
  let msg_type = buf[offset + 3];
  let record = if msg_type == RTM_IFINFO2 {
    if msg_len < IFINFO2_MIN_LEN {
      return Err(malformed(
        offset,
        format!("interface info message of {msg_len} bytes cannot hold counters"),
      ));
    }
    InterfaceRecord::GenericInfo(GenericInfo {
      index: read_u16(buf, offset + IFM_INDEX),
      flags: read_u32(buf, offset + IFM_FLAGS),
      counters: InterfaceCounters {
        input_packets: read_u64(buf, offset + IFI_IPACKETS),
        output_packets: read_u64(buf, offset + IFI_OPACKETS),
        input_bytes: read_u64(buf, offset + IFI_IBYTES),
        output_bytes: read_u64(buf, offset + IFI_OBYTES),
      },
    })
  } else {
    InterfaceRecord::Other { msg_type }
  };
  Ok((record, offset + msg_len))
}

fn malformed(offset: usize, reason: String) -> IftrafError {
  IftrafError::MalformedRecord { offset, reason }
}

// The buffer is an in memory kernel struct dump, so every integer is
// native endian.

pub(crate) fn read_u16(buf: &[u8], at: usize) -> u16 {
  let mut bytes = [0u8; 2];
  bytes.copy_from_slice(&buf[at..at + 2]);
  u16::from_ne_bytes(bytes)
}

pub(crate) fn read_u32(buf: &[u8], at: usize) -> u32 {
  let mut bytes = [0u8; 4];
  bytes.copy_from_slice(&buf[at..at + 4]);
  u32::from_ne_bytes(bytes)
}

pub(crate) fn read_u64(buf: &[u8], at: usize) -> u64 {
  let mut bytes = [0u8; 8];
  bytes.copy_from_slice(&buf[at..at + 8]);
  u64::from_ne_bytes(bytes)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  // The real `if_msghdr2` is 160 bytes, the minimum we parse is shorter.
  // Build records at the real size to keep the fixtures honest.
  const IFINFO2_LEN: usize = 160;

  pub fn ifinfo2_record(
    index: u16,
    flags: u32,
    counters: &InterfaceCounters,
  ) -> Vec<u8> {
    let mut buf = vec![0u8; IFINFO2_LEN];
    buf[0..2].copy_from_slice(&(IFINFO2_LEN as u16).to_ne_bytes());
    buf[2] = 5;
    buf[3] = RTM_IFINFO2;
    buf[IFM_FLAGS..IFM_FLAGS + 4].copy_from_slice(&flags.to_ne_bytes());
    buf[IFM_INDEX..IFM_INDEX + 2].copy_from_slice(&index.to_ne_bytes());
    buf[IFI_IPACKETS..IFI_IPACKETS + 8]
      .copy_from_slice(&counters.input_packets.to_ne_bytes());
    buf[IFI_OPACKETS..IFI_OPACKETS + 8]
      .copy_from_slice(&counters.output_packets.to_ne_bytes());
    buf[IFI_IBYTES..IFI_IBYTES + 8]
      .copy_from_slice(&counters.input_bytes.to_ne_bytes());
    buf[IFI_OBYTES..IFI_OBYTES + 8]
      .copy_from_slice(&counters.output_bytes.to_ne_bytes());
    buf
  }

  pub fn other_record(msg_type: u8, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    buf[0..2].copy_from_slice(&(len as u16).to_ne_bytes());
    buf[2] = 5;
    buf[3] = msg_type;
    buf
  }

  fn sample_counters(seed: u64) -> InterfaceCounters {
    InterfaceCounters {
      input_packets: seed,
      output_packets: seed + 1,
      input_bytes: seed * 1000,
      output_bytes: seed * 1000 + 1,
    }
  }

  #[test]
  fn test_empty_buffer_yields_nothing() {
    assert_eq!(RecordIter::new(&[]).count(), 0);
  }

  #[test]
  fn test_parses_records_in_order() {
    let first = sample_counters(7);
    let second = sample_counters(90);
    let mut buf = ifinfo2_record(1, 0x8863, &first);
    buf.extend(other_record(0x0e, 24));
    buf.extend(ifinfo2_record(4, 0, &second));

    let records = RecordIter::new(&buf)
      .collect::<Result<Vec<_>, _>>()
      .expect("well formed buffer");
    assert_eq!(records.len(), 3);
    assert_eq!(
      records[0],
      InterfaceRecord::GenericInfo(GenericInfo {
        index: 1,
        flags: 0x8863,
        counters: first,
      })
    );
    assert_eq!(records[1], InterfaceRecord::Other { msg_type: 0x0e });
    assert_eq!(
      records[2],
      InterfaceRecord::GenericInfo(GenericInfo {
        index: 4,
        flags: 0,
        counters: second,
      })
    );
  }

  #[test]
  fn test_zero_length_record_is_fatal() {
    let mut buf = ifinfo2_record(1, 0, &sample_counters(1));
    buf.extend([0u8; 8]);
    let result = RecordIter::new(&buf).collect::<Result<Vec<_>, _>>();
    assert!(matches!(
      result,
      Err(IftrafError::MalformedRecord { offset: 160, .. })
    ));
  }

  #[test]
  fn test_overrunning_length_is_fatal() {
    let mut buf = other_record(0x0e, 24);
    buf[0..2].copy_from_slice(&1000u16.to_ne_bytes());
    let result = RecordIter::new(&buf).collect::<Result<Vec<_>, _>>();
    assert!(matches!(result, Err(IftrafError::MalformedRecord { .. })));
  }

  #[test]
  fn test_short_ifinfo2_is_fatal() {
    // A correctly delimited message that claims to be RTM_IFINFO2 but is
    // too short to contain the counters.
    let buf = other_record(RTM_IFINFO2, 24);
    let result = RecordIter::new(&buf).collect::<Result<Vec<_>, _>>();
    assert!(matches!(result, Err(IftrafError::MalformedRecord { .. })));
  }

  #[test]
  fn test_truncated_trailing_header_is_fatal() {
    let mut buf = other_record(0x0e, 24);
    buf.extend([0u8; 2]);
    let result = RecordIter::new(&buf).collect::<Result<Vec<_>, _>>();
    assert!(matches!(
      result,
      Err(IftrafError::MalformedRecord { offset: 24, .. })
    ));
  }

  #[test]
  fn test_iterator_stops_after_failure() {
    let mut buf = other_record(0x0e, 24);
    buf[0..2].copy_from_slice(&2u16.to_ne_bytes());
    let mut iter = RecordIter::new(&buf);
    assert!(matches!(iter.next(), Some(Err(_))));
    assert!(iter.next().is_none());
  }
}
