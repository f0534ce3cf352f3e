use std::io;
use std::mem;

use log::trace;

use crate::error::{
	add_context, Error, ErrorKind, ErrorWithContext, Result, ERRCTX_ATTNAME, ERRCTX_ATTVAL, ERRCTX_DOCEND,
	ERRCTX_ELEMENT, ERRCTX_ELEMENT_CLOSE, ERRCTX_ENTITY, ERRCTX_EXTENSION, ERRCTX_NAME,
	ERRCTX_NAMESPACE, ERRCTX_PAGE_SWITCH, ERRCTX_STRTBL, ERRCTX_TEXT,
};
use crate::strings::{is_whitespace, Attribute, Name, QName};
use crate::tables::{Symbol, TableKind};
use crate::tokens::*;

use super::common::{check_unique, Event, ExtensionData, ExtensionText};
use super::{Decoder, State};

const HEX_DIGITS: &'static [u8; 16] = b"0123456789abcdef";

/// Append the textual form of an extension inside an attribute value.
fn render_extension(data: &ExtensionData, into: &mut String) {
	match data {
		ExtensionData::Str(s) => into.push_str(s),
		ExtensionData::Int(v) => into.push_str(&v.to_string()),
		ExtensionData::None => (),
		ExtensionData::Opaque(bytes) => {
			into.reserve(bytes.len() * 2);
			for b in bytes.iter() {
				into.push(HEX_DIGITS[(b >> 4) as usize] as char);
				into.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
			}
		}
	}
}

impl<R: io::Read> Decoder<R> {
	/// Read the page number following a `SWITCH_PAGE` and activate it for
	/// the tag or the attribute domain.
	fn switch_page(&mut self, kind: TableKind) -> Result<()> {
		let page = add_context(self.reader.read_byte(), ERRCTX_PAGE_SWITCH)?;
		match kind {
			TableKind::Tag => {
				if !self.tables.has_table(TableKind::Tag, page) {
					return Err(Error::from(ErrorKind::UndefinedCodePage(kind, page)));
				}
				self.tag_page = page;
			}
			TableKind::AttributeStart | TableKind::AttributeValue => {
				if !self.tables.has_table(TableKind::AttributeStart, page)
					&& !self.tables.has_table(TableKind::AttributeValue, page)
				{
					return Err(Error::from(ErrorKind::UndefinedCodePage(kind, page)));
				}
				self.attr_page = page;
			}
		}
		trace!("switched {} page to {}", kind, page);
		Ok(())
	}

	/// Peek at the next opcode, applying any code page switches in front
	/// of it to the given domain.
	///
	/// Returns `None` at the end of the input.
	fn peek_opcode(&mut self, kind: TableKind) -> Result<Option<u8>> {
		loop {
			match self.lookahead.peek(&mut self.reader)? {
				Some(SWITCH_PAGE) => {
					self.lookahead.take(&mut self.reader)?;
					self.switch_page(kind)?;
				}
				other => return Ok(other),
			}
		}
	}

	/// Consume the opcode which was returned by the last peek.
	fn consume_opcode(&mut self) -> Result<()> {
		debug_assert!(!self.lookahead.is_empty());
		self.lookahead.take(&mut self.reader)?;
		Ok(())
	}

	/// Decode a string table entry and append it to `into`.
	///
	/// Returns whether the entry consists of whitespace only.
	fn read_table_string(&self, offset: u32, into: &mut String) -> Result<bool> {
		add_context(
			self.header
				.string_table()
				.get(offset)
				.and_then(|raw| {
					self.header.charset().decode_into(raw, into)?;
					Ok(is_whitespace(raw))
				}),
			ERRCTX_STRTBL,
		)
	}

	/// Read a string table offset and append the referenced entry to
	/// `into`.
	fn read_table_ref(&mut self, into: &mut String) -> Result<bool> {
		let offset = add_context(self.reader.read_varint(), ERRCTX_STRTBL)?;
		self.read_table_string(offset, into)
	}

	/// Read an inline string and append it to `into`.
	fn read_inline_text(&mut self, into: &mut String) -> Result<bool> {
		self.text_buf.clear();
		let whitespace = self
			.reader
			.read_inline_string(self.opts.max_string_length, &mut self.text_buf)?;
		self.header.charset().decode_into(&self.text_buf, into)?;
		Ok(whitespace)
	}

	fn read_entity(&mut self) -> Result<char> {
		let cp = self.reader.read_varint()?;
		match std::char::from_u32(cp) {
			Some(ch) => Ok(ch),
			None => Err(ErrorKind::InvalidChar(cp).into()),
		}
	}

	/// Resolve a token through the active page of `kind`, or through the
	/// string table if the token is a literal.
	fn read_symbol(&mut self, kind: TableKind, page: u8, token: u8) -> Result<Name> {
		let symbol = if token & 0x7f == LITERAL {
			Symbol::Literal
		} else {
			self.tables.resolve(kind, page, token)?
		};
		match symbol {
			Symbol::Entry(s) => Ok(Name::from(s)),
			Symbol::Literal => {
				let mut s = String::new();
				self.read_table_ref(&mut s)?;
				Ok(Name::from(s))
			}
		}
	}

	fn read_extension(&mut self, code: ExtensionCode) -> Result<ExtensionData> {
		match code {
			ExtensionCode::ExtI0 | ExtensionCode::ExtI1 | ExtensionCode::ExtI2 => {
				let mut s = String::new();
				self.read_inline_text(&mut s)?;
				Ok(ExtensionData::Str(s))
			}
			ExtensionCode::ExtT0 | ExtensionCode::ExtT1 | ExtensionCode::ExtT2 => {
				Ok(ExtensionData::Int(self.reader.read_varint()?))
			}
			ExtensionCode::Ext0 | ExtensionCode::Ext1 | ExtensionCode::Ext2 => Ok(ExtensionData::None),
			ExtensionCode::Opaque => {
				let len = self.reader.read_varint()? as usize;
				if len > self.opts.max_string_length {
					return Err(ErrorKind::LimitExceeded("opaque data length").into());
				}
				Ok(ExtensionData::Opaque(self.reader.read_bytes(len)?))
			}
		}
	}

	/// Decode the payload of a text producing opcode and append it to
	/// `into`.
	///
	/// Returns whether the appended text is whitespace only.
	fn read_text_part(&mut self, op: u8, into: &mut String) -> Result<bool> {
		match op {
			ENTITY => {
				let ch = add_context(self.read_entity(), ERRCTX_ENTITY)?;
				into.push(ch);
				Ok(ch <= ' ')
			}
			STR_I => add_context(self.read_inline_text(into), ERRCTX_TEXT),
			STR_T => self.read_table_ref(into),
			EXT_I_0 | EXT_I_1 | EXT_I_2 => add_context(self.read_inline_text(into), ERRCTX_EXTENSION),
			_ => Err(ErrorKind::MalformedContent("text expected").into()),
		}
	}

	/// Whether `op` continues a text run in [`Decoder::advance`].
	fn joins_text(&self, op: u8) -> bool {
		match op {
			ENTITY | STR_I | STR_T => true,
			EXT_I_0 | EXT_I_1 | EXT_I_2 => self.opts.extension_text == ExtensionText::Coalesce,
			_ => false,
		}
	}

	fn read_attribute_value(&mut self, value: &mut String) -> Result<()> {
		loop {
			let op = match self.peek_opcode(TableKind::AttributeValue)? {
				Some(op) if is_attribute_value(op) => op,
				Some(_) => return Ok(()),
				None => return Err(Error::eof(ERRCTX_ATTVAL)),
			};
			self.consume_opcode()?;
			trace!("attribute value opcode 0x{:02x}", op);
			match op {
				ENTITY => value.push(self.read_entity()?),
				STR_I => {
					self.read_inline_text(value)?;
				}
				STR_T => {
					self.read_table_ref(value)?;
				}
				_ => match ExtensionCode::from_u8(op) {
					Some(code) => {
						let data = add_context(self.read_extension(code), ERRCTX_EXTENSION)?;
						render_extension(&data, value);
					}
					None => {
						let fragment = self.read_symbol(TableKind::AttributeValue, self.attr_page, op)?;
						value.push_str(&fragment);
					}
				},
			}
			if value.len() > self.opts.max_string_length {
				return Err(ErrorKind::LimitExceeded("attribute value length").into());
			}
		}
	}

	/// Read attributes up to and including the terminating `END`.
	fn read_attributes(&mut self, attributes: &mut Vec<Attribute>) -> Result<()> {
		loop {
			let op = match self.peek_opcode(TableKind::AttributeStart)? {
				Some(op) => op,
				None => return Err(Error::eof(ERRCTX_ATTNAME)),
			};
			self.consume_opcode()?;
			if op == END {
				return Ok(());
			}
			if !is_attribute_start(op) {
				return Err(ErrorKind::MalformedContent("attribute start expected").into());
			}
			let start = add_context(
				self.read_symbol(TableKind::AttributeStart, self.attr_page, op),
				ERRCTX_ATTNAME,
			)?;
			trace!("attribute start 0x{:02x} resolved to {:?}", op, start.as_str());
			let mut attr = Attribute::default();
			match start.find('=') {
				Some(pos) => {
					attr.name = Name::from(&start[..pos]);
					attr.value.push_str(&start[pos + 1..]);
				}
				None => attr.name = start,
			}
			add_context(self.read_attribute_value(&mut attr.value), ERRCTX_ATTVAL)?;
			attributes.push(attr);
		}
	}

	fn open_element(&mut self, op: u8) -> Result<Event> {
		let raw_name = add_context(
			self.read_symbol(TableKind::Tag, self.tag_page, op & TAG_TOKEN_MASK),
			ERRCTX_NAME,
		)?;
		let mut attributes = mem::take(&mut self.attr_pool);
		attributes.clear();
		if op & TAG_HAS_ATTRIBUTES != 0 {
			add_context(self.read_attributes(&mut attributes), ERRCTX_ELEMENT)?;
		}
		if self.elements.len() >= self.opts.max_depth {
			return Err(ErrorKind::LimitExceeded("element depth").into());
		}
		add_context(check_unique(&attributes, |a, b| a.name == b.name), ERRCTX_ELEMENT)?;

		let mut name = QName::local(raw_name);
		let depth = self.elements.len() + 1;
		if self.opts.namespaces {
			add_context(
				self.namespaces.process(depth, &mut name, &mut attributes),
				ERRCTX_NAMESPACE,
			)?;
		}
		self.elements.push(name.clone());
		let empty = op & TAG_HAS_CONTENT == 0;
		self.state = if empty { State::DegenerateClose } else { State::Body };
		Ok(Event::StartTag {
			name,
			attributes,
			empty,
		})
	}

	/// Decode a single event.
	pub(super) fn step(&mut self) -> Result<Event> {
		match self.state {
			State::Closing => {
				let depth = self.elements.len();
				self.elements.pop();
				self.namespaces.pop_scope(depth);
				self.state = State::Body;
			}
			State::DegenerateClose => {
				self.state = State::Closing;
				return match self.elements.last() {
					Some(top) => Ok(Event::EndTag(top.clone())),
					None => Err(ErrorKind::MalformedContent("no element to close").into()),
				};
			}
			State::AtEnd => return Ok(Event::EndDocument),
			State::BeforeDocument | State::Body => (),
		}

		let op = match self.peek_opcode(TableKind::Tag)? {
			Some(op) => op,
			None => {
				if self.elements.len() > 0 || self.state == State::BeforeDocument {
					return Err(Error::eof(ERRCTX_DOCEND));
				}
				self.state = State::AtEnd;
				return Ok(Event::EndDocument);
			}
		};
		self.consume_opcode()?;
		trace!(
			"opcode 0x{:02x} at depth {} (tag page {})",
			op,
			self.elements.len(),
			self.tag_page
		);

		match op {
			END => match self.elements.last() {
				Some(top) => {
					let ev = Event::EndTag(top.clone());
					self.state = State::Closing;
					Ok(ev)
				}
				None => Err(Error::from(ErrorKind::MalformedContent("end token without open element"))
					.with_context(ERRCTX_ELEMENT_CLOSE)),
			},
			ENTITY => {
				let ch = add_context(self.read_entity(), ERRCTX_ENTITY)?;
				Ok(Event::EntityRef {
					ch,
					name: format!("#{}", ch as u32),
				})
			}
			STR_I | STR_T => {
				let mut text = String::new();
				let whitespace = self.read_text_part(op, &mut text)?;
				Ok(Event::Text { text, whitespace })
			}
			op if is_extension_slot(op) => {
				let code = match ExtensionCode::from_u8(op) {
					Some(code) => code,
					None => return Err(ErrorKind::IllegalExtensionOpcode(op).into()),
				};
				let data = add_context(self.read_extension(code), ERRCTX_EXTENSION)?;
				Ok(Event::Extension { code, data })
			}
			op => {
				let ev = self.open_element(op)?;
				if self.state == State::BeforeDocument {
					self.state = State::Body;
				}
				Ok(ev)
			}
		}
	}

	/// Decode a single event, merging adjacent text producing tokens.
	pub(super) fn step_coalesced(&mut self) -> Result<Event> {
		let (mut text, mut whitespace) = match self.step()? {
			Event::Text { text, whitespace } => (text, whitespace),
			Event::EntityRef { ch, .. } => (ch.to_string(), ch <= ' '),
			Event::Extension {
				data: ExtensionData::Str(s),
				..
			} if self.opts.extension_text == ExtensionText::Coalesce => {
				let whitespace = is_whitespace(s.as_bytes());
				(s, whitespace)
			}
			other => return Ok(other),
		};
		loop {
			let op = match self.peek_opcode(TableKind::Tag)? {
				Some(op) if self.joins_text(op) => op,
				_ => break,
			};
			self.consume_opcode()?;
			trace!("coalescing text opcode 0x{:02x}", op);
			whitespace &= self.read_text_part(op, &mut text)?;
			if text.len() > self.opts.max_string_length {
				return Err(ErrorKind::LimitExceeded("text length").into());
			}
		}
		Ok(Event::Text { text, whitespace })
	}
}
