/*!
# Pull decoder

The [`Decoder`] turns a WBXML byte stream into a sequence of [`Event`]s.
It is driven by the caller: each call to [`Decoder::advance`] decodes just
enough of the input to produce the next event, which is then also
available through the cursor-style accessors of the decoder.

[`Decoder::advance_raw`] is the fine-grained primitive, which reports each
text producing token separately. [`Decoder::advance`] merges runs of
adjacent text tokens into a single [`Event::Text`].
*/
use std::borrow::Cow;
use std::io;
use std::mem;

use log::debug;

use crate::error::{Error, ErrorKind, ErrorWithContext, Position, Result, ERRCTX_ELEMENT};
use crate::header::Header;
use crate::lookahead::Lookahead;
use crate::reader::ByteReader;
use crate::strings::{Attribute, QName};
use crate::tables::SymbolTables;
use crate::tokens::ExtensionCode;
use crate::EventRead;

mod common;
mod namespaces;
mod raw;

#[doc(inline)]
pub use common::{
	DecoderOptions, Event, EventType, ExtensionData, ExtensionText, RcPtr, XMLNS_XML, XMLNS_XMLNS,
};
#[doc(inline)]
pub use namespaces::NamespaceResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	/// No element has been opened yet.
	BeforeDocument,
	/// Inside or between elements.
	Body,
	/// An element without content has been opened; its end tag is due.
	DegenerateClose,
	/// An end tag has been emitted; the element is popped on the next call.
	Closing,
	/// The end of the document has been reached.
	AtEnd,
}

/**
# WBXML pull decoder

The decoder reads the document header eagerly on construction. The body is
decoded one event at a time, on demand.

All errors are fatal: once an error has been returned, every further call
returns the same error without touching the source.

**Note:** The decoder reads the source byte by byte. Unbuffered sources
should be wrapped in a [`std::io::BufReader`].

## Example

```
use rwbxml::{Decoder, DecoderOptions, Event, EventType, RcPtr, SymbolTables};
let tables = RcPtr::new(
	SymbolTables::new()
		.with_tags(0, &["list", "item"])
		.with_attribute_starts(0, &["id"]),
);
// WBXML 1.3, unknown public id, UTF-8, no string table
let doc = b"\x03\x01\x6a\x00\x45\xc6\x05\x03a\x00\x01\x03x\x00\x01\x01";
let mut decoder = Decoder::new(&doc[..], tables).unwrap();
assert_eq!(decoder.advance().unwrap().event_type(), EventType::StartTag);
assert_eq!(decoder.name(), Some("list"));
assert_eq!(decoder.next_tag().unwrap().event_type(), EventType::StartTag);
assert_eq!(decoder.attribute_value("", "id"), Some("a"));
assert_eq!(decoder.next_text().unwrap(), "x");
decoder.require(EventType::EndTag, None, Some("item")).unwrap();
assert_eq!(decoder.next_tag().unwrap().event_type(), EventType::EndTag);
assert!(matches!(decoder.advance().unwrap(), Event::EndDocument));
assert_eq!(decoder.depth(), 0);
```
*/
pub struct Decoder<R> {
	reader: ByteReader<R>,
	header: Header,
	tables: RcPtr<SymbolTables>,
	opts: DecoderOptions,
	lookahead: Lookahead,
	tag_page: u8,
	attr_page: u8,
	state: State,
	elements: Vec<QName>,
	namespaces: NamespaceResolver,
	current: Event,
	attr_pool: Vec<Attribute>,
	text_buf: Vec<u8>,
	poison: Option<Error>,
}

impl<R: io::Read> Decoder<R> {
	/// Create a decoder with default options, reading the header from
	/// `src`.
	pub fn new(src: R, tables: RcPtr<SymbolTables>) -> Result<Self> {
		Self::with_options(src, tables, DecoderOptions::default())
	}

	/// Create a decoder with the given options, reading the header from
	/// `src`.
	pub fn with_options(src: R, tables: RcPtr<SymbolTables>, options: DecoderOptions) -> Result<Self> {
		let mut reader = ByteReader::new(src);
		let header = match Header::read(&mut reader, options.max_string_length) {
			Ok(h) => h,
			Err(e) => {
				let e = e.at(Position {
					offset: reader.offset(),
					depth: 0,
					element: None,
				});
				debug!("failed to decode header: {}", e);
				return Err(e);
			}
		};
		Ok(Self {
			reader,
			header,
			tables,
			opts: options,
			lookahead: Lookahead::Empty,
			tag_page: 0,
			attr_page: 0,
			state: State::BeforeDocument,
			elements: Vec::new(),
			namespaces: NamespaceResolver::new(),
			current: Event::StartDocument,
			attr_pool: Vec::new(),
			text_buf: Vec::new(),
			poison: None,
		})
	}

	fn check_poison(&self) -> Result<()> {
		if let Some(poison) = self.poison.as_ref() {
			return Err(poison.clone());
		}
		Ok(())
	}

	/// Poison the decoder, making it return `e` for all eternity.
	fn fail(&mut self, e: Error) -> Error {
		let e = e.at(self.position());
		debug!("decoder poisoned: {}", e);
		self.poison = Some(e.clone());
		e
	}

	/// Reclaim the attribute buffer of the previous start tag.
	fn recycle(&mut self) {
		if let Event::StartTag { attributes, .. } = &mut self.current {
			self.attr_pool = mem::take(attributes);
			self.attr_pool.clear();
		}
	}

	fn drive<F>(&mut self, f: F) -> Result<&Event>
	where
		F: FnOnce(&mut Self) -> Result<Event>,
	{
		self.check_poison()?;
		self.recycle();
		match f(self) {
			Ok(ev) => {
				self.current = ev;
				Ok(&self.current)
			}
			Err(e) => Err(self.fail(e)),
		}
	}

	/// Decode the next event, merging adjacent text.
	///
	/// Inline strings, string table references and entities which directly
	/// follow each other are reported as one [`Event::Text`]. Depending on
	/// [`DecoderOptions::extension_text`], this also applies to string
	/// valued extensions.
	///
	/// After the end of the document, [`Event::EndDocument`] is returned on
	/// every call.
	pub fn advance(&mut self) -> Result<&Event> {
		self.drive(Self::step_coalesced)
	}

	/// Decode the next event without merging text.
	///
	/// Every `STR_I`, `STR_T`, `ENTITY` and extension token is reported as
	/// its own event.
	pub fn advance_raw(&mut self) -> Result<&Event> {
		self.drive(Self::step)
	}

	/// Advance to the next start or end tag, skipping whitespace-only text.
	///
	/// Fails with [`ErrorKind::MalformedContent`] if any other event is
	/// encountered.
	pub fn next_tag(&mut self) -> Result<&Event> {
		loop {
			match self.advance()?.event_type() {
				EventType::Text if self.current.is_whitespace() => continue,
				EventType::StartTag | EventType::EndTag => return Ok(&self.current),
				_ => {
					return Err(self.fail(
						Error::from(ErrorKind::MalformedContent("expected start or end tag"))
							.with_context(ERRCTX_ELEMENT),
					))
				}
			}
		}
	}

	/// Read the text content of a text-only element.
	///
	/// The current event must be a start tag. Returns the text up to the
	/// matching end tag, which becomes the current event. Elements without
	/// text yield the empty string.
	///
	/// Fails with [`ErrorKind::MalformedContent`] if the current event is
	/// not a start tag or if the element contains anything but text.
	pub fn next_text(&mut self) -> Result<String> {
		self.check_poison()?;
		if self.event_type() != EventType::StartTag {
			return Err(self.fail(ErrorKind::MalformedContent("expected start tag").into()));
		}
		self.advance()?;
		let text = match &mut self.current {
			Event::Text { text, .. } => mem::take(text),
			_ => String::new(),
		};
		if self.event_type() == EventType::Text {
			self.advance()?;
		}
		if self.event_type() != EventType::EndTag {
			return Err(self.fail(
				Error::from(ErrorKind::MalformedContent("expected end tag"))
					.with_context(ERRCTX_ELEMENT),
			));
		}
		Ok(text)
	}

	/// Check that the current event has the given type and, for tags,
	/// namespace and local name.
	///
	/// `None` matches any namespace or name. Fails with
	/// [`ErrorKind::MalformedContent`] otherwise.
	pub fn require(&mut self, ty: EventType, namespace: Option<&str>, name: Option<&str>) -> Result<()> {
		self.check_poison()?;
		let matches = self.event_type() == ty
			&& namespace.map(|ns| self.namespace() == Some(ns)).unwrap_or(true)
			&& name.map(|n| self.name() == Some(n)).unwrap_or(true);
		if matches {
			Ok(())
		} else {
			Err(self.fail(ErrorKind::MalformedContent("required event not found").into()))
		}
	}

	/// Return the position of the decoder in the input.
	pub fn position(&self) -> Position {
		Position {
			offset: self.reader.offset(),
			depth: self.elements.len(),
			element: self.elements.last().map(|qn| qn.to_string().into()),
		}
	}
}

impl<R> Decoder<R> {
	/// The current event.
	pub fn current(&self) -> &Event {
		&self.current
	}

	pub fn event_type(&self) -> EventType {
		self.current.event_type()
	}

	/// Number of open elements.
	///
	/// A start tag counts its own element, and so does the matching end
	/// tag; the element is only removed on the following call.
	pub fn depth(&self) -> usize {
		self.elements.len()
	}

	/// Local name of the current tag, or the name of the current entity.
	pub fn name(&self) -> Option<&str> {
		match &self.current {
			Event::EntityRef { name, .. } => Some(name.as_str()),
			other => other.qname().map(|qn| qn.name.as_str()),
		}
	}

	/// Namespace URI of the current tag.
	///
	/// Empty if namespace processing is disabled.
	pub fn namespace(&self) -> Option<&str> {
		self.current.qname().map(|qn| qn.namespace.as_str())
	}

	/// Namespace prefix of the current tag.
	pub fn prefix(&self) -> Option<&str> {
		self.current.qname().map(|qn| qn.prefix.as_str())
	}

	/// Text of the current text or entity event.
	pub fn text(&self) -> Option<Cow<'_, str>> {
		self.current.text()
	}

	pub fn is_whitespace(&self) -> bool {
		self.current.is_whitespace()
	}

	/// Whether the current event is the start tag of an element without
	/// content.
	pub fn is_empty_element(&self) -> bool {
		matches!(self.current, Event::StartTag { empty: true, .. })
	}

	/// Attributes of the current start tag.
	pub fn attributes(&self) -> &[Attribute] {
		self.current.attributes()
	}

	/// Number of attributes of the current start tag (zero for all other
	/// events).
	pub fn attribute_count(&self) -> usize {
		self.current.attributes().len()
	}

	pub fn attribute_at(&self, index: usize) -> Option<&Attribute> {
		self.current.attributes().get(index)
	}

	/// Value of the attribute with the given namespace and name on the
	/// current start tag.
	///
	/// Without namespace processing, the namespace is always empty and
	/// `name` is compared with the full lexical name.
	pub fn attribute_value(&self, namespace: &str, name: &str) -> Option<&str> {
		self.current
			.attributes()
			.iter()
			.find(|a| a.namespace.as_str() == namespace && a.name.as_str() == name)
			.map(|a| a.value.as_str())
	}

	pub fn extension_code(&self) -> Option<ExtensionCode> {
		match &self.current {
			Event::Extension { code, .. } => Some(*code),
			_ => None,
		}
	}

	pub fn extension_data(&self) -> Option<&ExtensionData> {
		match &self.current {
			Event::Extension { data, .. } => Some(data),
			_ => None,
		}
	}

	/// The decoded document header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Active code page for element tokens.
	pub fn tag_page(&self) -> u8 {
		self.tag_page
	}

	/// Active code page for attribute tokens.
	pub fn attribute_page(&self) -> u8 {
		self.attr_page
	}

	pub fn options(&self) -> &DecoderOptions {
		&self.opts
	}

	pub fn tables(&self) -> &RcPtr<SymbolTables> {
		&self.tables
	}

	/// Return a reference to the wrapped source
	pub fn get_ref(&self) -> &R {
		self.reader.get_ref()
	}

	/// Consume the decoder and return the wrapped source.
	pub fn into_inner(self) -> R {
		self.reader.into_inner()
	}
}

impl<R: io::Read> EventRead for Decoder<R> {
	/// Read a single event from the decoder, merging adjacent text.
	///
	/// After [`Event::EndDocument`] has been returned once, `None` is
	/// returned.
	fn read(&mut self) -> Result<Option<Event>> {
		self.check_poison()?;
		if self.state == State::AtEnd {
			return Ok(None);
		}
		self.advance().map(|ev| Some(ev.clone()))
	}
}
