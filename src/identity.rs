
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
	static ref IDN_RE: Regex = Regex::new(r"^\s*([^,]+),([^,]+),([^,]+),([^,]+?)\s*$").unwrap();
}

/// Parsed `*IDN?` reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
	pub manufacturer: String,
	pub model: String,
	pub serial_num: String,
	pub fw_version: String,
}

impl Identity {

	pub fn parse(idn:&str) -> Option<Self> {
		let caps = IDN_RE.captures(idn)?;
		let field = |i:usize| caps.get(i).map(|m| m.as_str().trim().to_owned());

		Some(Self{
			manufacturer: field(1)?,
			model:        field(2)?,
			serial_num:   field(3)?,
			fw_version:   field(4)?,
		})
	}

}
