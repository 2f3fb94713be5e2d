
use std::io::{self, Read, Write, Error, ErrorKind};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use byteorder::{BigEndian, WriteBytesExt, ReadBytesExt};
use log::trace;

use crate::xdr;
use crate::rpc::LAST_FRAGMENT;
use super::{xdr_pack, xdr_unpack};

pub struct TcpClient {
	pub stream: TcpStream,
	pub prog: u32,
	pub vers: u32,
	pub lastxid: u32,
	pub packer: xdr::Packer,
	pub unpacker: xdr::Unpacker,
}

impl TcpClient {

	pub fn connect<A: ToSocketAddrs>(addr: A, prog: u32, vers: u32, timeout: Duration) -> io::Result<Self> {
		let sock_addr = addr.to_socket_addrs()?.next()
			.ok_or_else(|| Error::new(ErrorKind::AddrNotAvailable, "Address did not resolve"))?;
		let stream = TcpStream::connect_timeout(&sock_addr, timeout)?;
		stream.set_nodelay(true)?;

		let mut client = Self{ stream, prog, vers, lastxid: 0, packer: xdr::Packer::new(), unpacker: xdr::Unpacker::new() };
		client.set_timeout(timeout)?;
		Ok(client)
	}

	pub fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
		self.stream.set_read_timeout(Some(timeout))?;
		self.stream.set_write_timeout(Some(timeout))
	}

	// Resets the packer and writes a call header for the next transaction id
	pub fn start_call(&mut self, prc:u32) -> io::Result<()> {
		self.lastxid = self.lastxid.wrapping_add(1);
		self.packer.reset();
		xdr_pack::pack_callheader_no_auth(&mut self.packer, self.lastxid, self.prog, self.vers, prc)
	}

	// Sends whatever is in the packer as one record and loads the matching reply into the unpacker,
	// positioned after the reply header
	pub fn do_call(&mut self) -> io::Result<()> {
		let call:&[u8] = self.packer.as_bytes();
		if call.len() >= LAST_FRAGMENT as usize {
			return Err(Error::new(ErrorKind::InvalidInput, "RPC call too large for a single fragment"));
		}

		let mut send_bytes:Vec<u8> = Vec::with_capacity(call.len() + 4);
		send_bytes.write_u32::<BigEndian>(call.len() as u32 | LAST_FRAGMENT)?;
		send_bytes.extend_from_slice(call);
		self.stream.write_all(&send_bytes)?;
		trace!("RPC call xid={} ({} bytes)", self.lastxid, call.len());

		loop {
			let reply = self.read_record()?;
			self.unpacker.reset(&reply);

			let (xid, _) = xdr_unpack::unpack_replyheader(&mut self.unpacker)?;
			if xid == self.lastxid {
				return Ok(());
			} else if xid < self.lastxid {
				// Stale reply to an earlier call
				trace!("Discarding RPC reply for stale xid={}", xid);
				continue;
			} else {
				return Err(Error::new(ErrorKind::InvalidData, "RPC reply xid is ahead of the last call"));
			}
		}
	}

	fn read_record(&mut self) -> io::Result<Vec<u8>> {
		let mut reply:Vec<u8> = vec![];

		let mut last:bool = false;
		while !last {
			let header:u32 = self.stream.read_u32::<BigEndian>()?;
			last = (header & LAST_FRAGMENT) != 0;
			let n = (header & !LAST_FRAGMENT) as usize;

			let start = reply.len();
			reply.resize(start + n, 0);
			self.stream.read_exact(&mut reply[start..])?;
		}

		Ok(reply)
	}

}
