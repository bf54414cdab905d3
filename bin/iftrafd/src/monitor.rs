use std::time::Duration;

use ntex::time::interval;

use iftraf_stubs::NetworkMetrics;

use crate::error::IftrafError;
use crate::metrics::{collect_metrics, CounterSource};
use crate::sysctl::{self, IfMib};

/// A byte counter that moved backwards between two samples. Traffic
/// counters never decrease for real, so this is evidence of truncation in
/// the upstream source, not of a traffic decline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRegression {
  pub before: u64,
  pub after: u64,
  pub difference: u64,
}

/// True integer comparison, separate from the wrapping delta.
pub fn check_regression(previous: u64, current: u64) -> Option<CounterRegression> {
  if current < previous {
    Some(CounterRegression {
      before: previous,
      after: current,
      difference: previous - current,
    })
  } else {
    None
  }
}

fn snapshot(source: CounterSource) -> Result<NetworkMetrics, IftrafError> {
  let buf = sysctl::fetch_iflist2()?;
  collect_metrics(&buf, source, &IfMib)
}

/// Sample forever: one snapshot per second, reporting totals and deltas
/// against the previous snapshot. Never returns Ok; the only exits are a
/// fatal query error or process termination.
pub async fn run(source: CounterSource) -> Result<(), IftrafError> {
  let tick = interval(Duration::from_secs(1));
  let mut previous = snapshot(source)?;
  loop {
    tick.tick().await;
    let current = snapshot(source)?;
    report(&current, &previous);
    previous = current;
  }
}

fn report(current: &NetworkMetrics, previous: &NetworkMetrics) {
  let delta = current.delta_since(previous);

  println!("--- PACKETS ---");
  println!(
    "  Input (Download): {} (total), {} (delta)",
    current.total_input_packets, delta.input_packets
  );
  println!(
    "  Output (Upload): {} (total), {} (delta)",
    current.total_output_packets, delta.output_packets
  );

  println!("--- BYTES ---");
  println!(
    "  Input (Download): {} (total), {} (delta)",
    current.total_input_bytes, delta.input_bytes
  );
  println!(
    "  Output (Upload): {} (total), {} (delta)",
    current.total_output_bytes, delta.output_bytes
  );

  if let Some(regression) =
    check_regression(previous.total_input_bytes, current.total_input_bytes)
  {
    log::warn!("input byte counter went backwards, upstream truncation");
    println!("!! INPUT OVERFLOW !!");
    println!(
      "Before: {}, After: {}, Difference: {}",
      regression.before, regression.after, regression.difference
    );
  }

  if let Some(regression) =
    check_regression(previous.total_output_bytes, current.total_output_bytes)
  {
    log::warn!("output byte counter went backwards, upstream truncation");
    println!("!! OUTPUT OVERFLOW !!");
    println!(
      "Before: {}, After: {}, Difference: {}",
      regression.before, regression.after, regression.difference
    );
  }

  println!();
}
