
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::waveform::Sample;

pub const DEFAULT_OUTPUT:&str = "data.csv";

// Scientific notation with `precision` digits after the point and a signed, at least two digit
// exponent, e.g. `-5.00000000e-06`
fn scientific(value:f64, precision:usize) -> String {
	let formatted = format!("{:.*e}", precision, value);
	match formatted.split_once('e') {
		Some((mantissa, exp)) => match exp.parse::<i32>() {
			Ok(exp) => format!("{}e{}{:02}", mantissa, if exp < 0 { '-' } else { '+' }, exp.abs()),
			Err(_) => formatted,
		},
		// inf and NaN
		None => formatted,
	}
}

/// Writes one `"<time>, <voltage>"` line per sample; time to 9 significant digits, voltage to 6.
pub fn write_samples<W: Write>(out:&mut W, samples:&[Sample]) -> io::Result<()> {
	for s in samples {
		writeln!(out, "{}, {}", scientific(s.time, 8), scientific(s.voltage, 5))?;
	}
	out.flush()
}

pub fn write_file(path:&Path, samples:&[Sample]) -> Result<()> {
	let output_err = |source:io::Error| Error::Output{ path: path.to_owned(), source };

	let file = File::create(path).map_err(output_err)?;
	let mut out = BufWriter::new(file);
	write_samples(&mut out, samples).map_err(output_err)?;

	info!("File written to: {}", path.display());
	Ok(())
}
