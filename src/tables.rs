/*!
# Symbol tables

WBXML replaces element names, attribute names and common attribute values
with single-byte tokens. The meaning of a token depends on the *code page*
which is active for its domain; the decoder tracks one active page for
element tokens and one for attribute tokens.

The dictionaries are not part of the document. They belong to the document
type and have to be supplied by the application through [`SymbolTables`].
In addition, each document carries its own [`StringTable`], a blob of
zero-terminated strings which are referred to by byte offset.
*/
use std::fmt;

use bytes::Bytes;

use crate::error::{ErrorKind, Result};
use crate::strings::Name;

/// Kind of dictionary a token is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
	/// Element names
	Tag,
	/// Attribute names, optionally with a value prefix (`name=prefix`)
	AttributeStart,
	/// Attribute value fragments
	AttributeValue,
}

impl fmt::Display for TableKind {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::Tag => "tag",
			Self::AttributeStart => "attribute start",
			Self::AttributeValue => "attribute value",
		})
	}
}

/// Result of a token lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol<'x> {
	/// The token names a table entry.
	Entry(&'x str),
	/// The token is a literal: the actual string is stored in the string
	/// table at an offset which follows the token as a multi-byte integer.
	Literal,
}

type Table = Vec<Option<Name>>;

#[derive(Debug, Clone, Default)]
struct CodePage {
	tags: Option<Table>,
	attribute_starts: Option<Table>,
	attribute_values: Option<Table>,
}

impl CodePage {
	fn get(&self, kind: TableKind) -> Option<&Table> {
		match kind {
			TableKind::Tag => self.tags.as_ref(),
			TableKind::AttributeStart => self.attribute_starts.as_ref(),
			TableKind::AttributeValue => self.attribute_values.as_ref(),
		}
	}

	fn get_mut(&mut self, kind: TableKind) -> &mut Option<Table> {
		match kind {
			TableKind::Tag => &mut self.tags,
			TableKind::AttributeStart => &mut self.attribute_starts,
			TableKind::AttributeValue => &mut self.attribute_values,
		}
	}
}

/**
# Token dictionaries of a document type

Holds, per code page, the tables for element names, attribute starts and
attribute values. The first entry of each table corresponds to token `0x05`
(token values below that are reserved for global tokens). Empty strings mark
slots which are undefined; using such a token is an error.

The tables are immutable once handed to a decoder and are shared via
[`RcPtr`](crate::RcPtr), so that many decoders can use one set of tables.

## Example

```
use rwbxml::{SymbolTables, Symbol, TableKind};
let tables = SymbolTables::new()
	.with_tags(0, &["root", "item"])
	.with_attribute_starts(0, &["type", "type=text"]);
assert_eq!(tables.resolve(TableKind::Tag, 0, 0x06).unwrap(), Symbol::Entry("item"));
```
*/
#[derive(Debug, Clone, Default)]
pub struct SymbolTables {
	pages: Vec<Option<CodePage>>,
}

impl SymbolTables {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the table of the given kind for a code page.
	///
	/// Replaces any previously set table of that kind on that page.
	pub fn set_table<I, S>(&mut self, kind: TableKind, page: u8, entries: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let table: Table = entries
			.into_iter()
			.map(|s| {
				let s = s.as_ref();
				if s.len() > 0 {
					Some(Name::from(s))
				} else {
					None
				}
			})
			.collect();
		let page = page as usize;
		if self.pages.len() <= page {
			self.pages.resize(page + 1, None);
		}
		let slot = self.pages[page].get_or_insert_with(CodePage::default);
		*slot.get_mut(kind) = Some(table);
	}

	/// Builder-style variant of [`Self::set_table`] for element names.
	pub fn with_tags<I, S>(mut self, page: u8, entries: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.set_table(TableKind::Tag, page, entries);
		self
	}

	/// Builder-style variant of [`Self::set_table`] for attribute starts.
	pub fn with_attribute_starts<I, S>(mut self, page: u8, entries: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.set_table(TableKind::AttributeStart, page, entries);
		self
	}

	/// Builder-style variant of [`Self::set_table`] for attribute values.
	pub fn with_attribute_values<I, S>(mut self, page: u8, entries: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.set_table(TableKind::AttributeValue, page, entries);
		self
	}

	/// Return the table of the given kind on `page`, if defined.
	pub fn table(&self, kind: TableKind, page: u8) -> Option<&[Option<Name>]> {
		self.pages
			.get(page as usize)
			.and_then(|p| p.as_ref())
			.and_then(|p| p.get(kind))
			.map(|t| &t[..])
	}

	/// Whether `page` defines a table of the given kind.
	pub fn has_table(&self, kind: TableKind, page: u8) -> bool {
		self.table(kind, page).is_some()
	}

	/// Look up a token.
	///
	/// `token` must not be one of the control tokens `0x00` to `0x03`. The
	/// high bit is ignored. Token `0x04` (after masking) denotes a literal,
	/// which is not resolved through the table but through the string table
	/// of the document; see [`Symbol::Literal`].
	///
	/// Fails with [`ErrorKind::UndefinedCodePage`] if `page` has no table of
	/// the requested kind and with [`ErrorKind::UndefinedSymbol`] if the slot
	/// does not exist or is empty.
	pub fn resolve(&self, kind: TableKind, page: u8, token: u8) -> Result<Symbol<'_>> {
		debug_assert!((token & 0x7f) >= 0x04);
		let table = match self.table(kind, page) {
			Some(t) => t,
			None => return Err(ErrorKind::UndefinedCodePage(kind, page).into()),
		};
		let idx = (token & 0x7f) as isize - 5;
		if idx == -1 {
			return Ok(Symbol::Literal);
		}
		if idx < 0 {
			return Err(ErrorKind::UndefinedSymbol(kind, token).into());
		}
		match table.get(idx as usize) {
			Some(Some(s)) => Ok(Symbol::Entry(s.as_str())),
			_ => Err(ErrorKind::UndefinedSymbol(kind, token).into()),
		}
	}
}

/**
# Per-document string table

Opaque blob of zero-terminated strings from the document header, addressed
by byte offset.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable(Bytes);

impl StringTable {
	pub fn new<T: Into<Bytes>>(data: T) -> StringTable {
		StringTable(data.into())
	}

	/// Size of the table in bytes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// The raw table contents.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0[..]
	}

	/// Return the raw bytes of the string starting at `offset`, without its
	/// terminator.
	///
	/// Fails with [`ErrorKind::InvalidStringTableOffset`] if `offset` is
	/// not inside the table or if the string is not terminated before the
	/// end of the table.
	pub fn get(&self, offset: u32) -> Result<&[u8]> {
		let start = offset as usize;
		if start >= self.0.len() {
			return Err(ErrorKind::InvalidStringTableOffset(offset).into());
		}
		let tail = &self.0[start..];
		match memchr::memchr(0, tail) {
			Some(end) => Ok(&tail[..end]),
			None => Err(ErrorKind::InvalidStringTableOffset(offset).into()),
		}
	}
}
