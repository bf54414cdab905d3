use iftraf_stubs::NetworkMetrics;

use crate::error::IftrafError;
use crate::routing::{InterfaceRecord, RecordIter};
use crate::sysctl::ExtendedSource;

/// Which of the two kernel counter sources feeds the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterSource {
  /// Counters embedded in the interface list records. Truncate at 4 GiB
  /// on some kernels and are batched at about 1 KiB granularity.
  Embedded,
  /// Full width counters from the per interface mib.
  Extended,
}

/// One aggregation pass: parse the raw interface list, resolve counters
/// for every interface record through the configured source, and sum them
/// into a single snapshot. No interface is excluded, loopback included.
pub fn collect_metrics(
  buf: &[u8],
  source: CounterSource,
  ext: &impl ExtendedSource,
) -> Result<NetworkMetrics, IftrafError> {
  let mut metrics = NetworkMetrics::default();
  for record in RecordIter::new(buf) {
    let info = match record? {
      InterfaceRecord::GenericInfo(info) => info,
      InterfaceRecord::Other { .. } => continue,
    };
    log::debug!("interface {} flags {:#x}", info.index, info.flags);
    let counters = match source {
      CounterSource::Embedded => info.counters,
      CounterSource::Extended => {
        let data = ext.query(info.index)?;
        log::debug!("mib counters for interface {}", data.index);
        data.counters
      }
    };
    metrics.add(&counters);
  }
  Ok(metrics)
}
