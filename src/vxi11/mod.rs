
// Device core
pub const DEVICE_CORE_PROG:u32  = 0x0607af;
pub const DEVICE_CORE_VERS:u32  = 1;
pub const CREATE_LINK:u32       = 10;
pub const DEVICE_WRITE:u32      = 11;
pub const DEVICE_READ:u32       = 12;
pub const DEVICE_CLEAR:u32      = 15;
pub const DESTROY_LINK:u32      = 23;

pub const CLIENT_ID:i32 = 3333;

pub const OPERATION_FLAGS_END_ONLY:i32 = 8;

// Reason bits in a device_read reply
pub const REASON_REQCNT:i32 = 1;
pub const REASON_CHR:i32    = 2;
pub const REASON_END:i32    = 4;

// Request size used while throwing away the tail of an over-long response
const DISCARD_REQUEST_SIZE:u32 = 1 << 20;

use std::io::{self, Error, ErrorKind};
use std::time::Duration;

use log::{debug, warn};

use crate::rpc::port_mapping::{TcpPortMapperClient, Mapping, Protocol};
use crate::rpc::tcp_clients::TcpClient;

pub mod xdr_pack;

fn err(msg:&str) -> io::Error { Error::new(ErrorKind::Other, msg) }

// Maps a VXI-11 device_error code onto an io::Error, None meaning success
pub fn device_error(code:i32) -> Option<io::Error> {
	let (kind, msg) = match code {
		0  => return None,
		1  => (ErrorKind::InvalidInput, "Syntax error"),
		3  => (ErrorKind::NotFound, "Device not accessible"),
		4  => (ErrorKind::InvalidInput, "Invalid link identifier"),
		5  => (ErrorKind::InvalidInput, "Parameter error"),
		6  => (ErrorKind::Other, "Channel not established"),
		8  => (ErrorKind::Unsupported, "Operation not supported"),
		9  => (ErrorKind::Other, "Out of resources"),
		11 => (ErrorKind::WouldBlock, "Device locked by another link"),
		12 => (ErrorKind::Other, "No lock held by this link"),
		15 => (ErrorKind::TimedOut, "I/O timeout"),
		17 => (ErrorKind::Other, "I/O error"),
		21 => (ErrorKind::InvalidInput, "Invalid address"),
		23 => (ErrorKind::Interrupted, "Abort"),
		29 => (ErrorKind::AlreadyExists, "Channel already established"),
		_  => (ErrorKind::Other, "Unknown device error"),
	};
	Some(Error::new(kind, format!("VXI-11 error {}: {}", code, msg)))
}

fn check(code:i32) -> io::Result<()> {
	match device_error(code) {
		None    => Ok(()),
		Some(e) => Err(e),
	}
}

pub struct CoreClient {
	client: TcpClient,
	opt_link: Option<Link>,
	io_timeout_ms: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Link {
	pub link_id: i32,
	pub abort_port: u16,
	pub max_recv_size: u32,
}

impl CoreClient {

	fn get_link(&self) -> io::Result<Link> {
		self.opt_link.ok_or_else(|| Error::new(ErrorKind::NotConnected, "No VXI-11 link"))
	}

	pub fn new(host:&str, timeout:Duration) -> io::Result<Self> {

		// Find the port to use for the core program
		let mut pmap_client = TcpPortMapperClient::new(host, timeout)?;

		let mapping = Mapping {
			program: DEVICE_CORE_PROG,
			version: DEVICE_CORE_VERS,
			protocol: Protocol::TCP,
			port: 0,
		};

		let port = pmap_client.get_port(&mapping)?;
		let client = TcpClient::connect((host, port), DEVICE_CORE_PROG, DEVICE_CORE_VERS, timeout)?;

		Ok(Self::with_client(client, timeout))
	}

	// Core channel over an already-connected RPC client
	fn with_client(client:TcpClient, timeout:Duration) -> Self {
		CoreClient{ client, opt_link: None, io_timeout_ms: millis(timeout) }
	}

	pub fn link(&self) -> Option<Link> { self.opt_link }

	pub fn set_io_timeout(&mut self, timeout:Duration) -> io::Result<()> {
		if timeout.is_zero() {
			return Err(Error::new(ErrorKind::InvalidInput, "Timeout must be non-zero"));
		}
		self.io_timeout_ms = millis(timeout);
		// Give the socket some slack beyond the device-side timeout so the device reports it first
		self.client.set_timeout(timeout + Duration::from_secs(1))
	}

	pub fn create_link(&mut self, device:&str) -> io::Result<Link> {
		if self.opt_link.is_some() {
			return Err(err("Already connected to a link"));
		}

		self.client.start_call(CREATE_LINK)?;
		xdr_pack::pack_create_link_parms(&mut self.client.packer, CLIENT_ID, false, self.io_timeout_ms, device)?;
		self.client.do_call()?;

		let error:i32         = self.client.unpacker.unpack_i32()?;
		let link_id:i32       = self.client.unpacker.unpack_i32()?;
		let abort_port:u32    = self.client.unpacker.unpack_u32()?;
		let max_recv_size:u32 = self.client.unpacker.unpack_u32()?;
		check(error)?;

		let link = Link{ link_id, abort_port: abort_port as u16, max_recv_size };
		debug!("Created VXI-11 link {:?} to {}", link, device);
		self.opt_link = Some(link);
		Ok(link)
	}

	pub fn write(&mut self, data:&[u8]) -> io::Result<()> {
		let link = self.get_link()?;

		// Split into chunks the device is willing to accept, flagging END on the last one
		let chunk_size = if link.max_recv_size == 0 { data.len().max(1) } else { link.max_recv_size as usize };
		let mut chunks = data.chunks(chunk_size).peekable();
		while let Some(chunk) = chunks.next() {
			let flags = if chunks.peek().is_none() { OPERATION_FLAGS_END_ONLY } else { 0 };

			self.client.start_call(DEVICE_WRITE)?;
			xdr_pack::pack_device_write_parms(&mut self.client.packer, link.link_id, self.io_timeout_ms, self.io_timeout_ms, flags, chunk)?;
			self.client.do_call()?;

			let error:i32 = self.client.unpacker.unpack_i32()?;
			let size:u32  = self.client.unpacker.unpack_u32()?;
			check(error)?;

			if size as usize != chunk.len() {
				return Err(err("Number of bytes in confirmation doesn't match number of bytes sent"));
			}
		}

		Ok(())
	}

	// One device_read call
	fn read_once(&mut self, link:Link, request_size:u32) -> io::Result<(i32, Vec<u8>)> {
		self.client.start_call(DEVICE_READ)?;
		xdr_pack::pack_device_read_parms(&mut self.client.packer, link.link_id, request_size, self.io_timeout_ms, self.io_timeout_ms, 0, 0)?;
		self.client.do_call()?;

		let error:i32    = self.client.unpacker.unpack_i32()?;
		let reason:i32   = self.client.unpacker.unpack_i32()?;
		let data:Vec<u8> = self.client.unpacker.unpack_variable_len_opaque()?;
		check(error)?;

		if reason & !(REASON_REQCNT | REASON_CHR | REASON_END) != 0 {
			return Err(err("Reserved bits set in device_read reason"));
		}
		Ok((reason, data))
	}

	// Reads one complete response message. At most `max_len` bytes are kept; anything the device
	// sends beyond that is read and discarded so the next command starts from an empty output queue.
	pub fn read(&mut self, max_len:usize) -> io::Result<Vec<u8>> {
		let link = self.get_link()?;
		let mut ans:Vec<u8> = vec![];
		let mut discarded:usize = 0;

		loop {
			let room = max_len.saturating_sub(ans.len());
			let wanted = if room == 0 { DISCARD_REQUEST_SIZE } else { room.min(u32::MAX as usize) as u32 };
			let (reason, data) = self.read_once(link, wanted)?;

			if data.len() > room {
				discarded += data.len() - room;
				ans.extend_from_slice(&data[..room]);
			} else {
				ans.extend_from_slice(&data);
			}

			if reason & REASON_END != 0 { break; }
		}

		if discarded > 0 {
			warn!("Discarded {} response bytes beyond the {} byte read limit", discarded, max_len);
		}
		Ok(ans)
	}

	pub fn clear(&mut self) -> io::Result<()> {
		let link = self.get_link()?;

		self.client.start_call(DEVICE_CLEAR)?;
		xdr_pack::pack_device_generic_parms(&mut self.client.packer, link.link_id, 0, self.io_timeout_ms, self.io_timeout_ms)?;
		self.client.do_call()?;

		check(self.client.unpacker.unpack_i32()?)
	}

	pub fn destroy_link(&mut self) -> io::Result<()> {
		let link = self.opt_link.take().ok_or_else(|| err("No link to destroy"))?;

		self.client.start_call(DESTROY_LINK)?;
		self.client.packer.pack_i32(link.link_id)?;
		self.client.do_call()?;

		check(self.client.unpacker.unpack_i32()?)?;
		debug!("Destroyed VXI-11 link {}", link.link_id);
		Ok(())
	}

}

fn millis(d:Duration) -> u32 { d.as_millis().min(u32::MAX as u128) as u32 }
