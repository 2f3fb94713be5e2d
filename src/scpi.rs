//! Command/query layer: newline-terminated SCPI commands over a [`Session`].

use std::str;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::block::{self, BlockInfo, WaveformBuffer, MAX_HEADER_LEN};
use crate::error::{Error, Result};
use crate::session::Session;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Longest text reply accepted by [`Instrument::query_text`].
pub const MAX_TEXT_LEN: usize = 256;

pub const PREAMBLE_ARITY: usize = 10;

pub struct Instrument<S: Session> {
	session: S,
	settle_delay: Duration,
}

impl<S: Session> Instrument<S> {

	pub fn new(session:S, settle_delay:Duration) -> Self { Self{ session, settle_delay } }

	pub fn session(&mut self) -> &mut S { &mut self.session }

	/// Sends `command` with a newline appended and waits out the settle delay.
	pub fn send_command(&mut self, command:&str) -> Result<()> {
		debug!("> {}", command);
		let mut message = String::with_capacity(command.len() + 1);
		message.push_str(command);
		message.push('\n');

		let sent = self.session.write(message.as_bytes());

		// The instrument needs time to process the command whether or not the write went through
		thread::sleep(self.settle_delay);

		sent.map_err(|source| Error::Send{ command: command.to_owned(), source })
	}

	pub fn query_text(&mut self, query:&str) -> Result<String> {
		self.send_command(query)?;

		let raw = self.session.read_line().map_err(|source| Error::Receive{ command: query.to_owned(), source })?;
		if raw.len() > MAX_TEXT_LEN {
			return Err(Error::ResponseTooLong{ command: query.to_owned(), len: raw.len(), max: MAX_TEXT_LEN });
		}

		let text = str::from_utf8(&raw)
			.map_err(|_| Error::Parse{ command: query.to_owned(), reason: "Unable to parse response as UTF-8".into() })?;
		let text = text.trim_end_matches(&['\n', '\r'][..]);
		debug!("< {}", text);
		Ok(text.to_owned())
	}

	/// Queries a comma-separated list of exactly [`PREAMBLE_ARITY`] numbers.
	pub fn query_numbers(&mut self, query:&str) -> Result<Vec<f64>> {
		let text = self.query_text(query)?;
		parse_numbers(&text, PREAMBLE_ARITY)
			.map_err(|reason| Error::Parse{ command: query.to_owned(), reason })
	}

	/// Queries a definite-length block into `buf`; a full buffer is logged as possible truncation.
	pub fn query_block(&mut self, query:&str, buf:&mut WaveformBuffer) -> Result<BlockInfo> {
		self.send_command(query)?;

		let max = MAX_HEADER_LEN + buf.capacity() + 2;
		let raw = self.session.read_block(max).map_err(|source| Error::Receive{ command: query.to_owned(), source })?;

		let info = block::decode_block(&raw, buf).map_err(|source| Error::Block{ command: query.to_owned(), source })?;
		debug!("< block of {} bytes", info.len);
		if info.truncated {
			warn!("Not all data may have been saved! Block filled the {} byte buffer", buf.capacity());
		}
		Ok(info)
	}

}

/// Parses `arity` comma-separated floating point values.
pub fn parse_numbers(text:&str, arity:usize) -> std::result::Result<Vec<f64>, String> {
	let fields:Vec<&str> = text.trim().split(',').collect();
	if fields.len() != arity {
		return Err(format!("Expected {} comma-separated values, got {}", arity, fields.len()));
	}

	fields.iter()
		.map(|f| f.trim().parse::<f64>().map_err(|_| format!("Unable to parse {:?} as a number", f.trim())))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::VecDeque;
	use std::io;
	use std::time::Instant;

	#[derive(Default)]
	struct Scripted {
		written: Vec<Vec<u8>>,
		replies: VecDeque<io::Result<Vec<u8>>>,
		fail_writes: bool,
	}

	impl Session for Scripted {
		fn set_timeout(&mut self, _:Duration) -> io::Result<()> { Ok(()) }
		fn clear(&mut self) -> io::Result<()> { Ok(()) }
		fn write(&mut self, data:&[u8]) -> io::Result<()> {
			if self.fail_writes { return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone")); }
			self.written.push(data.to_vec());
			Ok(())
		}
		fn read_line(&mut self) -> io::Result<Vec<u8>> {
			self.replies.pop_front().unwrap_or_else(|| Err(io::Error::new(io::ErrorKind::TimedOut, "no reply")))
		}
		fn read_block(&mut self, max_len:usize) -> io::Result<Vec<u8>> {
			let mut reply = self.read_line()?;
			reply.truncate(max_len);
			Ok(reply)
		}
		fn close(&mut self) -> io::Result<()> { Ok(()) }
	}

	fn instrument(replies:&[&[u8]]) -> Instrument<Scripted> {
		let session = Scripted{ replies: replies.iter().map(|r| Ok(r.to_vec())).collect(), ..Default::default() };
		Instrument::new(session, Duration::from_millis(0))
	}

	#[test]
	fn commands_are_newline_terminated() {
		let mut inst = instrument(&[]);
		inst.send_command(":autoscale").unwrap();
		assert_eq!(inst.session().written, vec![b":autoscale\n".to_vec()]);
	}

	#[test]
	fn send_failure_is_reported() {
		let mut inst = instrument(&[]);
		inst.session().fail_writes = true;
		assert!(matches!(inst.send_command("*RST"), Err(Error::Send{ .. })));
	}

	#[test]
	fn text_query_strips_terminator() {
		let mut inst = instrument(&[b"KEYSIGHT,EDUX1002G,CN1,1.0\n"]);
		assert_eq!(inst.query_text("*IDN?").unwrap(), "KEYSIGHT,EDUX1002G,CN1,1.0");
		assert_eq!(inst.session().written, vec![b"*IDN?\n".to_vec()]);
	}

	#[test]
	fn overlong_text_reply_is_rejected() {
		let long = vec![b'x'; MAX_TEXT_LEN + 1];
		let mut inst = instrument(&[&long]);
		assert!(matches!(inst.query_text("*IDN?"), Err(Error::ResponseTooLong{ len: 257, .. })));
	}

	#[test]
	fn missing_reply_is_a_receive_error() {
		let mut inst = instrument(&[]);
		assert!(matches!(inst.query_text("*IDN?"), Err(Error::Receive{ .. })));
	}

	#[test]
	fn ten_numbers() {
		let mut inst = instrument(&[b"1.0,2.0,3.0,4.0,5.0,6.0,7.0,8.0,9.0,10.0\n"]);
		let values = inst.query_numbers(":WAVeform:PREamble?").unwrap();
		assert_eq!(values, (1..=10).map(f64::from).collect::<Vec<_>>());
	}

	#[test]
	fn scientific_notation_and_spaces() {
		let values = parse_numbers("+0, +0, +10240, +1, 1.0E-06, -5.0E-06, +0, 4.0E-02, 1.0E-01, +128", 10).unwrap();
		assert_eq!(values[4], 1.0e-6);
		assert_eq!(values[9], 128.0);
	}

	#[test]
	fn wrong_number_count_or_garbage() {
		assert!(parse_numbers("1,2,3", 10).is_err());
		assert!(parse_numbers("1,2,3,4,5,6,7,8,9,10,11", 10).is_err());
		assert!(parse_numbers("1,2,3,4,5,6,7,8,nine,10", 10).is_err());

		let mut inst = instrument(&[b"1,2,3\n"]);
		assert!(matches!(inst.query_numbers(":WAVeform:PREamble?"), Err(Error::Parse{ .. })));
	}

	#[test]
	fn block_query() {
		let mut inst = instrument(&[b"#15hello\n"]);
		let mut buf = WaveformBuffer::with_capacity(16);
		let info = inst.query_block(":waveform:data?", &mut buf).unwrap();
		assert_eq!(info, BlockInfo{ len: 5, truncated: false });
		assert_eq!(buf.as_slice(), b"hello");
	}

	#[test]
	fn truncated_block_is_not_an_error() {
		let mut inst = instrument(&[b"#18abcdefgh\n"]);
		let mut buf = WaveformBuffer::with_capacity(4);
		let info = inst.query_block(":waveform:data?", &mut buf).unwrap();
		assert!(info.truncated);
		assert_eq!(buf.as_slice(), b"abcd");
	}

	#[test]
	fn every_send_waits_out_the_settle_delay() {
		let delay = Duration::from_millis(30);
		let session = Scripted{ replies: vec![Ok(b"OK\n".to_vec()), Ok(b"#12ab\n".to_vec())].into(), ..Default::default() };
		let mut inst = Instrument::new(session, delay);

		let start = Instant::now();
		inst.send_command(":autoscale").unwrap();
		assert!(start.elapsed() >= delay);

		let start = Instant::now();
		inst.query_text("*OPC?").unwrap();
		assert!(start.elapsed() >= delay);

		let start = Instant::now();
		inst.query_block(":waveform:data?", &mut WaveformBuffer::with_capacity(16)).unwrap();
		assert!(start.elapsed() >= delay);

		inst.session().fail_writes = true;
		let start = Instant::now();
		assert!(inst.send_command("*RST").is_err());
		assert!(start.elapsed() >= delay);
	}

	#[test]
	fn malformed_block_fails() {
		let mut inst = instrument(&[b"#Z5hello\n"]);
		let mut buf = WaveformBuffer::with_capacity(16);
		assert!(matches!(inst.query_block(":waveform:data?", &mut buf), Err(Error::Block{ .. })));
	}
}
