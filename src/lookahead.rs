use std::io;

use crate::error::Result;
use crate::reader::ByteReader;

/// Single-opcode lookahead buffer.
///
/// The decoder needs to inspect the next opcode before deciding whether it
/// belongs to the current construct (for instance, whether a text run
/// continues). Peeking reads at most one byte from the source and keeps it
/// until it is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead {
	/// Nothing buffered, the next peek reads from the source.
	Empty,
	/// An opcode has been read but not consumed.
	Cached(u8),
}

impl Lookahead {
	/// Return the next opcode without consuming it.
	///
	/// Returns `None` if the source is exhausted.
	pub fn peek<R: io::Read>(&mut self, r: &mut ByteReader<R>) -> Result<Option<u8>> {
		match *self {
			Self::Cached(op) => Ok(Some(op)),
			Self::Empty => match r.try_read_byte()? {
				Some(op) => {
					*self = Self::Cached(op);
					Ok(Some(op))
				}
				None => Ok(None),
			},
		}
	}

	/// Return and consume the next opcode.
	pub fn take<R: io::Read>(&mut self, r: &mut ByteReader<R>) -> Result<Option<u8>> {
		let op = self.peek(r)?;
		*self = Self::Empty;
		Ok(op)
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}
}

impl Default for Lookahead {
	fn default() -> Self {
		Self::Empty
	}
}
