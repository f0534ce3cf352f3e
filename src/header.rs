/*!
# Document header

Every WBXML document starts with a header which declares the format
version, the document type (public identifier), the charset and the string
table of the document.
*/
use std::io;

use log::debug;

use crate::charset::Charset;
use crate::error::{add_context, ErrorKind, Result, ERRCTX_HEADER};
use crate::reader::ByteReader;
use crate::tables::StringTable;

/// Public identifier of the document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicId {
	/// A well-known identifier, as assigned by the WAP specifications
	/// (`1` denotes an unknown document type).
	Known(u32),
	/// The identifier is stored as string in the string table at the given
	/// offset.
	StringTable(u32),
}

/// Decoded document header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
	version: u8,
	public_id: PublicId,
	charset: Charset,
	string_table: StringTable,
}

impl Header {
	/// Construct a header from its parts.
	pub fn new(version: u8, public_id: PublicId, charset: Charset, string_table: StringTable) -> Header {
		Header {
			version,
			public_id,
			charset,
			string_table,
		}
	}

	/// Decode a header from `r`.
	///
	/// String tables longer than `max_string_table` bytes are rejected with
	/// [`ErrorKind::LimitExceeded`] before anything is allocated.
	pub fn read<R: io::Read>(r: &mut ByteReader<R>, max_string_table: usize) -> Result<Header> {
		add_context(Self::read_inner(r, max_string_table), ERRCTX_HEADER)
	}

	fn read_inner<R: io::Read>(r: &mut ByteReader<R>, max_string_table: usize) -> Result<Header> {
		let version = r.read_byte()?;
		let public_id = match r.read_varint()? {
			0 => PublicId::StringTable(r.read_varint()?),
			other => PublicId::Known(other),
		};
		let charset = Charset::from_mib(r.read_varint()?)?;
		let len = r.read_varint()? as usize;
		if len > max_string_table {
			return Err(ErrorKind::LimitExceeded("string table length").into());
		}
		let string_table = StringTable::new(r.read_bytes(len)?);
		if let PublicId::StringTable(offset) = public_id {
			string_table.get(offset)?;
		}
		debug!(
			"WBXML header: version 0x{:02x}, public id {:?}, charset {}, {} bytes of string table",
			version,
			public_id,
			charset.name(),
			string_table.len(),
		);
		Ok(Header {
			version,
			public_id,
			charset,
			string_table,
		})
	}

	/// The raw version byte.
	pub fn version(&self) -> u8 {
		self.version
	}

	/// Major version number (`1` for WBXML 1.x).
	pub fn major_version(&self) -> u8 {
		1 + (self.version >> 4)
	}

	/// Minor version number (`3` for WBXML 1.3).
	pub fn minor_version(&self) -> u8 {
		self.version & 0x0f
	}

	pub fn public_id(&self) -> PublicId {
		self.public_id
	}

	/// Return the public identifier string, if it is stored in the string
	/// table.
	pub fn public_id_str(&self) -> Result<Option<String>> {
		match self.public_id {
			PublicId::Known(_) => Ok(None),
			PublicId::StringTable(offset) => {
				let raw = self.string_table.get(offset)?;
				Ok(Some(self.charset.decode(raw)?))
			}
		}
	}

	pub fn charset(&self) -> Charset {
		self.charset
	}

	pub fn string_table(&self) -> &StringTable {
		&self.string_table
	}
}
