/*!
# Streaming WBXML decoding

This crate provides a pull-based decoder for WBXML, the WAP Binary XML
content format used by SyncML, ActiveSync, WAP push and friends.

## Features

* WBXML 1.0 to 1.3 bodies
* Multiple code pages for element and attribute tokens
* String table references and literal names
* Extension tokens and opaque data
* UTF-8, US-ASCII, ISO-8859-1 and (via `encoding_rs`) most legacy charsets
  which are compatible with zero-terminated strings
* Optional namespace processing of `xmlns` attributes
* Limits on string lengths and nesting depth
* Tokio-based loading via the `async` feature and [`read_document`].

WBXML does not carry the dictionaries for its tokens. These are defined by
the document type and need to be supplied by the application through
[`SymbolTables`].

## Example

```
use rwbxml::{Decoder, EventRead, Event, RcPtr, SymbolTables};
let tables = RcPtr::new(SymbolTables::new().with_tags(0, &["greeting"]));
// WBXML 1.3, unknown public id, UTF-8, no string table
let doc = b"\x03\x01\x6a\x00\x45\x03Hello\x00\x02\x21\x01";
let mut decoder = Decoder::new(&doc[..], tables).unwrap();
let mut events = Vec::new();
decoder.read_all(|ev| events.push(ev)).unwrap();
assert_eq!(events[1], Event::Text{ text: "Hello!".to_string(), whitespace: false });
assert_eq!(events.len(), 4);
```

## High-level usage

### Cursor-style usage

[`Decoder::advance`] decodes the next [`Event`] and keeps it as the
current event, which can then be inspected through the accessors of the
decoder ([`Decoder::name`], [`Decoder::text`], [`Decoder::attribute_value`],
...). [`Decoder::next_tag`], [`Decoder::next_text`] and
[`Decoder::require`] help with walking through documents of a known
structure.

### Event-style usage

The [`EventRead`] trait returns owned [`Event`]s until the end of the
document.
*/
pub mod charset;
pub mod error;
pub mod header;
mod lookahead;
pub mod parser;
pub mod reader;
pub mod strings;
pub mod tables;
pub mod tokens;

#[cfg(feature = "async")]
pub mod future;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use error::{Error, ErrorKind, Position, Result};
#[doc(inline)]
pub use parser::{
	Decoder, DecoderOptions, Event, EventType, ExtensionData, ExtensionText, RcPtr, XMLNS_XML,
	XMLNS_XMLNS,
};
pub use charset::Charset;
pub use header::{Header, PublicId};
pub use strings::{Attribute, Name, QName};
pub use tables::{StringTable, Symbol, SymbolTables, TableKind};
pub use tokens::ExtensionCode;

#[cfg(feature = "async")]
#[doc(inline)]
pub use future::read_document;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

/**
# Source for individual document events

This trait is implemented by the [`Decoder`]. It is analogous to the
[`std::io::Read`] trait, but for [`Event`]s instead of bytes.
*/
pub trait EventRead {
	/// Read a single event.
	///
	/// If the end of a valid document has been reached and reported, `None`
	/// is returned.
	///
	/// All errors are fatal (and will be returned again by the decoder on
	/// the next invocation without reading further data from the source).
	fn read(&mut self) -> Result<Option<Event>>;

	/// Read all events which can be produced from the data source.
	///
	/// The given `cb` is invoked for each event, including the final
	/// [`Event::EndDocument`].
	fn read_all<F>(&mut self, mut cb: F) -> Result<()>
	where
		F: FnMut(Event) -> (),
	{
		loop {
			match self.read()? {
				None => return Ok(()),
				Some(ev) => cb(ev),
			}
		}
	}
}
