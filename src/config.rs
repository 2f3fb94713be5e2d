
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::export::DEFAULT_OUTPUT;

pub const DEFAULT_ADDRESS:&str = "TCPIP0::192.168.1.100::inst0::INSTR";
pub const DEFAULT_TIMEOUT_MS:u64 = 15000;
pub const DEFAULT_SETTLE_MS:u64 = 200;

/// Acquire one waveform from an oscilloscope and write it as time, voltage pairs
#[derive(Parser, Debug, Clone)]
#[command(name = "scopedump", version)]
pub struct Config {
	/// Instrument address, `TCPIP0::<host>::inst0::INSTR` or a bare host
	#[arg(short, long, default_value = DEFAULT_ADDRESS)]
	pub address: String,

	/// I/O timeout in milliseconds
	#[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
	pub timeout_ms: u64,

	/// Delay after every command before the response is read, in milliseconds
	#[arg(long, default_value_t = DEFAULT_SETTLE_MS)]
	pub settle_ms: u64,

	/// Output file
	#[arg(short, long, default_value = DEFAULT_OUTPUT)]
	pub output: PathBuf,
}

impl Config {
	pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }
	pub fn settle_delay(&self) -> Duration { Duration::from_millis(self.settle_ms) }
}

impl Default for Config {
	fn default() -> Self {
		Self{
			address: DEFAULT_ADDRESS.to_owned(),
			timeout_ms: DEFAULT_TIMEOUT_MS,
			settle_ms: DEFAULT_SETTLE_MS,
			output: PathBuf::from(DEFAULT_OUTPUT),
		}
	}
}
