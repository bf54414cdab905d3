use clap::Parser;

#[derive(Debug, Parser)]
pub struct Cli {
  /// Read counters from the fields embedded in the interface list records
  /// instead of the per interface mib. Embedded counters truncate at 4 GiB
  /// on some kernels.
  #[clap(long)]
  pub embedded: bool,
}
