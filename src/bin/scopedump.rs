use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use scopedump::acquire;
use scopedump::config::Config;

fn main() -> ExitCode {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

	let config = Config::parse();

	match acquire::run(&config) {
		Ok(n) => {
			info!("Wrote {} samples", n);
			ExitCode::SUCCESS
		},
		Err(e) => {
			if e.is_unreachable() { error!("Error: Could not connect to the scope! {}", e); }
			else                  { error!("Error: {}", e); }
			ExitCode::FAILURE
		},
	}
}
