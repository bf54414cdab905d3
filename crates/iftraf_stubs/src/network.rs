#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};

/// Traffic counters for a single interface, as reported by the kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct InterfaceCounters {
  pub input_packets: u64,
  pub output_packets: u64,
  pub input_bytes: u64,
  pub output_bytes: u64,
}

/// Cumulative traffic totals summed over every interface observed during
/// one sampling pass. The kernel reports each counter as monotonic per
/// interface, but the aggregated totals can still move backwards between
/// samples when an upstream counter is truncated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct NetworkMetrics {
  pub total_input_packets: u64,
  pub total_output_packets: u64,
  pub total_input_bytes: u64,
  pub total_output_bytes: u64,
}

/// Growth of each total over one sampling interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct NetworkDelta {
  pub input_packets: u64,
  pub output_packets: u64,
  pub input_bytes: u64,
  pub output_bytes: u64,
}

impl NetworkMetrics {
  /// Fold one interface worth of counters into the totals.
  pub fn add(&mut self, counters: &InterfaceCounters) {
    self.total_input_packets += counters.input_packets;
    self.total_output_packets += counters.output_packets;
    self.total_input_bytes += counters.input_bytes;
    self.total_output_bytes += counters.output_bytes;
  }

  /// Growth since `previous`, modulo 2^64. Wrapping keeps the delta small
  /// and positive when a truncated upstream counter made a total fall
  /// between two samples.
  pub fn delta_since(&self, previous: &NetworkMetrics) -> NetworkDelta {
    NetworkDelta {
      input_packets: self
        .total_input_packets
        .wrapping_sub(previous.total_input_packets),
      output_packets: self
        .total_output_packets
        .wrapping_sub(previous.total_output_packets),
      input_bytes: self
        .total_input_bytes
        .wrapping_sub(previous.total_input_bytes),
      output_bytes: self
        .total_output_bytes
        .wrapping_sub(previous.total_output_bytes),
    }
  }
}
