
use std::io;
use std::time::Duration;

use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;

use crate::error::{Error, Result};
use crate::vxi11::CoreClient;

lazy_static! {
	static ref TCPIP_RE: Regex = Regex::new(r"(?i)^TCPIP(\d*)::([^:]+)(?:::([^:]+))?(?:::INSTR)?$").unwrap();
	static ref HOST_RE: Regex  = Regex::new(r"^[A-Za-z0-9.\-]+$").unwrap();
}

pub const DEFAULT_DEVICE:&str = "inst0";

// Text replies past this are cut; the command layer rejects anything near it anyway
const LINE_READ_LIMIT:usize = 1 << 16;

/// Byte-level connection to one instrument.
///
/// Every read consumes one complete response message from the instrument.
pub trait Session {
	fn set_timeout(&mut self, timeout:Duration) -> io::Result<()>;

	/// Device clear: aborts pending operations and empties the output queue.
	fn clear(&mut self) -> io::Result<()>;

	fn write(&mut self, data:&[u8]) -> io::Result<()>;

	fn read_line(&mut self) -> io::Result<Vec<u8>>;

	/// Reads a response, keeping at most `max_len` bytes of it.
	fn read_block(&mut self, max_len:usize) -> io::Result<Vec<u8>>;

	fn close(&mut self) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceAddress {
	pub host: String,
	pub device: String,
}

impl ResourceAddress {

	/// Accepts `TCPIP[n]::<host>[::<device>][::INSTR]` or a bare host name or IP address.
	pub fn parse(address:&str) -> Result<Self> {
		let address = address.trim();

		if let Some(caps) = TCPIP_RE.captures(address) {
			let host = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
			let device = caps.get(3).map(|m| m.as_str()).filter(|d| !d.eq_ignore_ascii_case("INSTR")).unwrap_or(DEFAULT_DEVICE);
			return Ok(Self{ host: host.to_owned(), device: device.to_owned() });
		}

		if HOST_RE.is_match(address) {
			return Ok(Self{ host: address.to_owned(), device: DEFAULT_DEVICE.to_owned() });
		}

		Err(Error::Address(address.to_owned()))
	}

}

/// A [`Session`] over a VXI-11 core channel.
pub struct Vxi11Session {
	core: CoreClient,
	address: ResourceAddress,
}

impl Vxi11Session {

	pub fn open(address:&str, timeout:Duration) -> Result<Self> {
		let address = ResourceAddress::parse(address)?;
		let connect_err = |source:io::Error| Error::Connect{ address: format!("{}::{}", address.host, address.device), source };

		let mut core = CoreClient::new(&address.host, timeout).map_err(connect_err)?;
		core.create_link(&address.device).map_err(connect_err)?;

		info!("Connected to {} ({})", address.host, address.device);
		Ok(Self{ core, address })
	}

}

impl Session for Vxi11Session {

	fn set_timeout(&mut self, timeout:Duration) -> io::Result<()> { self.core.set_io_timeout(timeout) }
	fn clear(&mut self) -> io::Result<()> { self.core.clear() }
	fn write(&mut self, data:&[u8]) -> io::Result<()> { self.core.write(data) }

	fn read_line(&mut self) -> io::Result<Vec<u8>> {
		self.core.read(LINE_READ_LIMIT)
	}

	fn read_block(&mut self, max_len:usize) -> io::Result<Vec<u8>> { self.core.read(max_len) }

	fn close(&mut self) -> io::Result<()> { self.core.destroy_link() }

}

impl Drop for Vxi11Session {

	fn drop(&mut self) {
		if self.core.link().is_some() {
			if let Err(e) = self.core.destroy_link() {
				warn!("Unable to destroy link to {}: {}", self.address.host, e);
			}
		}
	}

}
