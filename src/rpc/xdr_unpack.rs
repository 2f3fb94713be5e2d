
use std::io::{self, Error, ErrorKind};

use crate::xdr::Unpacker;
use crate::rpc::{REPLY, MSG_DENIED, RPC_MISMATCH, AUTH_ERROR, MSG_ACCEPTED, PROG_UNAVAIL, PROG_MISMATCH, PROC_UNAVAIL, GARBAGE_ARGS, SYSTEM_ERR, SUCCESS};

fn err(msg:&str) -> io::Error { Error::new(ErrorKind::Other, msg) }

pub struct Auth {
	pub flavor: i32,
	pub body: Vec<u8>,
}

pub fn unpack_auth(unpacker:&mut Unpacker) -> io::Result<Auth> {
	let flavor:i32  = unpacker.unpack_enum()?;
	let body:Vec<u8> = unpacker.unpack_variable_len_opaque()?;
	Ok(Auth{ flavor, body })
}

// Consumes the reply header and leaves the unpacker positioned at the procedure results
pub fn unpack_replyheader(unpacker:&mut Unpacker) -> io::Result<(u32, Auth)> {
	let xid:u32 = unpacker.unpack_u32()?;

	if unpacker.unpack_enum()? != REPLY { return Err(err("Expected REPLY message type in RPC reply header")); }

	match unpacker.unpack_enum()? {
		MSG_DENIED => {
			match unpacker.unpack_enum()? {
				RPC_MISMATCH => {
					let low  = unpacker.unpack_u32()?;
					let high = unpacker.unpack_u32()?;
					return Err(Error::new(ErrorKind::Other, format!("RPC version mismatch, server supports {} to {}", low, high)))
				},
				AUTH_ERROR => {
					let stat = unpacker.unpack_u32()?;
					return Err(Error::new(ErrorKind::PermissionDenied, format!("RPC call denied, auth status {}", stat)))
				},
				_ => return Err(err("RPC call denied for an unknown reason")),
			}
		},
		MSG_ACCEPTED => { },
		_ => return Err(err("Neither MSG_DENIED nor MSG_ACCEPTED in RPC reply header")),
	}

	let verf = unpack_auth(unpacker)?;

	match unpacker.unpack_enum()? {
		SUCCESS       => Ok((xid, verf)),
		PROG_UNAVAIL  => Err(err("RPC program unavailable")),
		PROG_MISMATCH => {
			let low  = unpacker.unpack_u32()?;
			let high = unpacker.unpack_u32()?;
			Err(Error::new(ErrorKind::Other, format!("RPC program version mismatch, server supports {} to {}", low, high)))
		},
		PROC_UNAVAIL  => Err(err("RPC procedure unavailable")),
		GARBAGE_ARGS  => Err(err("RPC server could not decode arguments")),
		SYSTEM_ERR    => Err(err("RPC server system error")),
		_             => Err(err("RPC call failed for an unknown reason")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::xdr::Packer;

	fn reply(xid:u32, accept_stat:i32) -> Vec<u8> {
		let mut packer = Packer::new();
		packer.pack_u32(xid).unwrap();
		packer.pack_enum(REPLY).unwrap();
		packer.pack_enum(MSG_ACCEPTED).unwrap();
		packer.pack_enum(0).unwrap();
		packer.pack_variable_len_opaque(&[]).unwrap();
		packer.pack_enum(accept_stat).unwrap();
		packer.pack_u32(1234).unwrap();
		packer.as_bytes().to_vec()
	}

	#[test]
	fn accepted_reply_leaves_results() {
		let mut unpacker = Unpacker::new();
		unpacker.reset(&reply(42, SUCCESS));
		let (xid, verf) = unpack_replyheader(&mut unpacker).unwrap();
		assert_eq!(xid, 42);
		assert_eq!(verf.flavor, 0);
		assert_eq!(unpacker.unpack_u32().unwrap(), 1234);
	}

	#[test]
	fn unavailable_program_is_an_error() {
		let mut unpacker = Unpacker::new();
		unpacker.reset(&reply(1, PROG_UNAVAIL));
		assert!(unpack_replyheader(&mut unpacker).is_err());
	}
}
