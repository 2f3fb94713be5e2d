
use std::io::{self, Error, ErrorKind};

use crate::xdr::Packer;

pub fn pack_create_link_parms(packer:&mut Packer, id:i32, lock_device:bool, lock_timeout:u32, device:&str) -> io::Result<()> {
	if !device.is_ascii() {
		return Err(Error::new(ErrorKind::InvalidInput, "VXI-11 device name must be ASCII"));
	}
	packer.pack_i32(id)?;
	packer.pack_bool(lock_device)?;
	packer.pack_u32(lock_timeout)?;
	packer.pack_variable_len_opaque(device.as_bytes())
}

pub fn pack_device_write_parms(packer:&mut Packer, link:i32, timeout:u32, lock_timeout:u32, flags:i32, data:&[u8]) -> io::Result<()> {
	packer.pack_i32(link)?;
	packer.pack_u32(timeout)?;
	packer.pack_u32(lock_timeout)?;
	packer.pack_i32(flags)?;
	packer.pack_variable_len_opaque(data)
}

pub fn pack_device_read_parms(packer:&mut Packer, link:i32, request_size:u32, timeout:u32, lock_timeout:u32, flags:i32, term_char:i32) -> io::Result<()> {
	packer.pack_i32(link)?;
	packer.pack_u32(request_size)?;
	packer.pack_u32(timeout)?;
	packer.pack_u32(lock_timeout)?;
	packer.pack_i32(flags)?;
	packer.pack_i32(term_char)
}

pub fn pack_device_generic_parms(packer:&mut Packer, link:i32, flags:i32, lock_timeout:u32, timeout:u32) -> io::Result<()> {
	packer.pack_i32(link)?;
	packer.pack_i32(flags)?;
	packer.pack_u32(lock_timeout)?;
	packer.pack_u32(timeout)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn non_ascii_device_name_is_rejected() {
		let mut packer = Packer::new();
		assert!(pack_create_link_parms(&mut packer, 1, false, 0, "inst\u{e9}").is_err());
		assert!(pack_create_link_parms(&mut packer, 1, false, 0, "inst0").is_ok());
	}

	#[test]
	fn write_parms_carry_payload_last() {
		let mut packer = Packer::new();
		pack_device_write_parms(&mut packer, 3, 15000, 15000, 8, b"*IDN?\n").unwrap();
		let bytes = packer.as_bytes();
		// link, timeout, lock_timeout, flags, length, 6 bytes of data + 2 bytes of padding
		assert_eq!(bytes.len(), 5 * 4 + 8);
		assert_eq!(&bytes[16..20], &[0, 0, 0, 6]);
		assert_eq!(&bytes[20..26], b"*IDN?\n");
	}
}
