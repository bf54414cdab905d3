use thiserror::Error;

/// Every failure here is fatal. A failed pass produces no report and does
/// not replace the previous sample.
#[derive(Debug, Error)]
pub enum IftrafError {
  /// The interface list sysctl failed.
  #[error("interface list query failed: {0}")]
  Fetch(std::io::Error),
  /// The per interface mib sysctl failed.
  #[error("extended query failed for interface {index}: {source}")]
  ExtendedQuery {
    index: u16,
    source: std::io::Error,
  },
  /// A record declared a length inconsistent with the remaining buffer.
  /// Should be unreachable against a healthy kernel.
  #[error("malformed interface record at offset {offset}: {reason}")]
  MalformedRecord { offset: usize, reason: String },
}
