/*
* iftrafd is a single host network traffic monitor
* It polls the kernel interface statistics once per second and reports
* cumulative totals and per interval deltas for packets and bytes,
* flagging counters that moved backwards between two samples.
*/

mod cli;
mod error;
mod routing;
mod sysctl;
mod metrics;
mod monitor;

use clap::Parser;

use metrics::CounterSource;

#[ntex::main]
async fn main() -> std::io::Result<()> {
  let cli = cli::Cli::parse();
  // Build env logger
  if std::env::var("LOG_LEVEL").is_err() {
    std::env::set_var("LOG_LEVEL", "iftrafd=info,warn,error");
  }
  env_logger::Builder::new()
    .parse_env("LOG_LEVEL")
    .format_target(false)
    .init();

  let source = if cli.embedded {
    CounterSource::Embedded
  } else {
    CounterSource::Extended
  };

  log::info!("Starting traffic monitor");
  if let Err(err) = monitor::run(source).await {
    eprintln!("{err}");
    std::process::exit(1);
  }
  Ok(())
}
