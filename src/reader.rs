/*!
# Byte-level access to the document

[`ByteReader`] wraps any [`std::io::Read`] and provides the primitive
decoders of the WBXML wire format: single bytes, multi-byte integers and
zero-terminated inline strings. It counts the bytes it consumed so that
errors can be attributed to an input offset.
*/
use std::io;

use bytes::Bytes;

use crate::error::{Error, ErrorKind, Result, ERRCTX_UNKNOWN};
use crate::strings::is_whitespace;

/// Counting byte source for the decoder.
///
/// **Note:** The decoder reads single bytes at a time. Unbuffered sources
/// such as files or sockets should be wrapped in a [`std::io::BufReader`].
pub struct ByteReader<R> {
	inner: R,
	offset: u64,
}

impl<R> ByteReader<R> {
	pub fn new(inner: R) -> Self {
		Self { inner, offset: 0 }
	}

	/// Number of bytes consumed so far.
	pub fn offset(&self) -> u64 {
		self.offset
	}

	/// Return a reference to the wrapped source
	pub fn get_ref(&self) -> &R {
		&self.inner
	}

	/// Return a mutable reference to the wrapped source
	pub fn get_mut(&mut self) -> &mut R {
		&mut self.inner
	}

	/// Consume self and return the wrapped source.
	pub fn into_inner(self) -> R {
		self.inner
	}
}

impl<R: io::Read> ByteReader<R> {

	/// Read a single byte, returning `None` if the source is exhausted.
	pub fn try_read_byte(&mut self) -> Result<Option<u8>> {
		let mut buf = [0u8; 1];
		loop {
			match self.inner.read(&mut buf[..]) {
				Ok(0) => return Ok(None),
				Ok(_) => {
					self.offset += 1;
					return Ok(Some(buf[0]));
				}
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			}
		}
	}

	/// Read a single byte.
	///
	/// Fails with [`ErrorKind::UnexpectedEndOfInput`] if the source is
	/// exhausted.
	pub fn read_byte(&mut self) -> Result<u8> {
		match self.try_read_byte()? {
			Some(b) => Ok(b),
			None => Err(Error::eof(ERRCTX_UNKNOWN)),
		}
	}

	/// Read a multi-byte integer (`mb_u_int32`).
	///
	/// Each byte contributes its low seven bits, most significant group
	/// first; a set high bit indicates that more bytes follow. Values which
	/// do not fit into 32 bits are rejected with
	/// [`ErrorKind::IntegerOverflow`].
	pub fn read_varint(&mut self) -> Result<u32> {
		let mut value: u32 = 0;
		loop {
			let b = self.read_byte()?;
			if value > (u32::MAX >> 7) {
				return Err(ErrorKind::IntegerOverflow.into());
			}
			value = (value << 7) | (b & 0x7f) as u32;
			if b & 0x80 == 0 {
				return Ok(value);
			}
		}
	}

	/// Read a zero-terminated inline string into `into`.
	///
	/// The terminator is consumed but not stored. Returns whether every
	/// byte of the string was at most U+0020.
	///
	/// At most `limit` bytes are accepted before the terminator; longer
	/// strings fail with [`ErrorKind::LimitExceeded`].
	pub fn read_inline_string(&mut self, limit: usize, into: &mut Vec<u8>) -> Result<bool> {
		let start = into.len();
		loop {
			match self.read_byte()? {
				0 => return Ok(is_whitespace(&into[start..])),
				b => {
					if into.len() - start >= limit {
						return Err(ErrorKind::LimitExceeded("inline string length").into());
					}
					into.push(b);
				}
			}
		}
	}

	/// Read exactly `len` bytes.
	pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
		let mut buf = vec![0u8; len];
		match self.inner.read_exact(&mut buf[..]) {
			Ok(()) => (),
			Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
				return Err(Error::eof(ERRCTX_UNKNOWN))
			}
			Err(e) => return Err(e.into()),
		}
		self.offset += len as u64;
		Ok(buf.into())
	}
}
