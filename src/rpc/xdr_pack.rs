use std::io;

use crate::xdr::Packer;
use crate::rpc::{CALL, RPCVERSION};

pub fn pack_auth(packer:&mut Packer, flavor:i32, stuff:&[u8]) -> io::Result<()> {
	packer.pack_enum(flavor)?;
	packer.pack_variable_len_opaque(stuff)
}

pub fn pack_callheader(packer:&mut Packer, xid:u32, prog:u32, vers:u32, prc:u32, cred:(i32, &[u8]), verf:(i32, &[u8])) -> io::Result<()> {
	packer.pack_u32(xid)?;
	packer.pack_enum(CALL)?;
	packer.pack_u32(RPCVERSION)?;
	packer.pack_u32(prog)?;
	packer.pack_u32(vers)?;
	packer.pack_u32(prc)?;
	pack_auth(packer, cred.0, cred.1)?;
	pack_auth(packer, verf.0, verf.1)
}

// AUTH_NONE for both credentials and verifier
pub fn pack_callheader_no_auth(packer: &mut Packer, xid:u32, prog:u32, vers:u32, prc:u32) -> io::Result<()> {
	pack_callheader(packer, xid, prog, vers, prc, (0, &[]), (0, &[]))
}

pub fn pack_mapping(packer: &mut Packer, prog:u32, vers:u32, prot:u32, port:u32) -> io::Result<()> {
	packer.pack_u32(prog)?;
	packer.pack_u32(vers)?;
	packer.pack_u32(prot)?;
	packer.pack_u32(port)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::xdr::Unpacker;

	#[test]
	fn call_header_layout() {
		let mut packer = Packer::new();
		pack_callheader_no_auth(&mut packer, 7, 100000, 2, 3).unwrap();

		// xid, CALL, rpcvers, prog, vers, proc, then two empty AUTH_NONE blocks
		assert_eq!(packer.as_bytes().len(), 10 * 4);

		let mut unpacker = Unpacker::new();
		unpacker.reset(packer.as_bytes());
		assert_eq!(unpacker.unpack_u32().unwrap(), 7);
		assert_eq!(unpacker.unpack_enum().unwrap(), CALL);
		assert_eq!(unpacker.unpack_u32().unwrap(), RPCVERSION);
		assert_eq!(unpacker.unpack_u32().unwrap(), 100000);
		assert_eq!(unpacker.unpack_u32().unwrap(), 2);
		assert_eq!(unpacker.unpack_u32().unwrap(), 3);
	}
}
