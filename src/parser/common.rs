use std::borrow::Cow;
use std::fmt;
#[cfg(not(feature = "mt"))]
use std::rc::Rc;
#[cfg(feature = "mt")]
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{ErrorKind, Result};
use crate::strings::{Attribute, QName};
use crate::tokens::ExtensionCode;

/// Shared pointer around the symbol tables
///
/// In builds with the `mt` feature, this is a [`Arc`]. In non-`mt` builds,
/// this is a [`std::rc::Rc`]
#[cfg(feature = "mt")]
pub type RcPtr<T> = Arc<T>;
/// Shared pointer around the symbol tables
///
/// In builds with the `mt` feature, this is a [`std::sync::Arc`].
/// In non-`mt` builds, this is a [`Rc`].
#[cfg(not(feature = "mt"))]
pub type RcPtr<T> = Rc<T>;

/// XML core namespace URI (for the `xml:` prefix)
pub const XMLNS_XML: &'static str = "http://www.w3.org/XML/1998/namespace";
/// XML namespace URI (for the `xmlns:` prefix)
pub const XMLNS_XMLNS: &'static str = "http://www.w3.org/2000/xmlns/";

/// Whether string-valued extensions take part in text coalescing.
///
/// See [`DecoderOptions::extension_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionText {
	/// `EXT_I_*` tokens are always reported as [`Event::Extension`].
	Separate,
	/// `EXT_I_*` tokens are treated as text by
	/// [`Decoder::advance`](crate::Decoder::advance) and merged with
	/// adjacent text, as if they were inline strings.
	Coalesce,
}

/// Hold options to configure a [`Decoder`](crate::Decoder).
///
/// See also [`Decoder::with_options()`](crate::Decoder::with_options).
#[derive(Debug, Clone, PartialEq, Copy)]
pub struct DecoderOptions {
	/// Enable namespace processing.
	///
	/// If enabled, `xmlns` and `xmlns:*` attributes are interpreted as
	/// namespace declarations and removed from the attribute list, and
	/// element and attribute names are split into prefix and local name and
	/// resolved against the declarations in scope.
	pub namespaces: bool,

	/// Policy for string-valued extension tokens.
	pub extension_text: ExtensionText,

	/// Maximum number of bytes in an inline string, an opaque payload, the
	/// string table, and in a text run or attribute value assembled from
	/// several tokens.
	///
	/// Longer data fails decoding with
	/// [`ErrorKind::LimitExceeded`](crate::ErrorKind::LimitExceeded).
	pub max_string_length: usize,

	/// Maximum nesting depth of elements.
	pub max_depth: usize,

	/// Maximum size in bytes of a document loaded by `read_document`
	/// (feature `async`).
	pub max_document_length: usize,
}

impl DecoderOptions {
	/// Set the [`DecoderOptions::namespaces`] value.
	///
	/// # Example
	///
	/// ```
	/// use rwbxml::DecoderOptions;
	/// let opts = DecoderOptions::default().namespaces(true);
	/// assert!(opts.namespaces);
	/// ```
	pub fn namespaces(mut self, v: bool) -> DecoderOptions {
		self.namespaces = v;
		self
	}

	/// Set the [`DecoderOptions::extension_text`] value.
	pub fn extension_text(mut self, v: ExtensionText) -> DecoderOptions {
		self.extension_text = v;
		self
	}

	/// Set the [`DecoderOptions::max_string_length`] value.
	pub fn max_string_length(mut self, v: usize) -> DecoderOptions {
		self.max_string_length = v;
		self
	}

	/// Set the [`DecoderOptions::max_depth`] value.
	pub fn max_depth(mut self, v: usize) -> DecoderOptions {
		self.max_depth = v;
		self
	}

	/// Set the [`DecoderOptions::max_document_length`] value.
	pub fn max_document_length(mut self, v: usize) -> DecoderOptions {
		self.max_document_length = v;
		self
	}
}

impl Default for DecoderOptions {
	/// Constructs default decoder options.
	///
	/// The limits are implementation-defined and should not be relied upon.
	fn default() -> Self {
		Self {
			namespaces: false,
			extension_text: ExtensionText::Separate,
			max_string_length: 1024 * 1024,
			max_depth: 256,
			max_document_length: 16 * 1024 * 1024,
		}
	}
}

/// Payload of an extension token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionData {
	/// Inline string payload of `EXT_I_*`
	Str(String),
	/// Integer payload of `EXT_T_*`
	Int(u32),
	/// `EXT_0` to `EXT_2` carry no payload
	None,
	/// Raw bytes of `OPAQUE`
	Opaque(Bytes),
}

/// Discriminant of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
	StartDocument,
	StartTag,
	EndTag,
	Text,
	EntityRef,
	Extension,
	EndDocument,
}

impl fmt::Display for EventType {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::StartDocument => "START_DOCUMENT",
			Self::StartTag => "START_TAG",
			Self::EndTag => "END_TAG",
			Self::Text => "TEXT",
			Self::EntityRef => "ENTITY_REF",
			Self::Extension => "EXTENSION",
			Self::EndDocument => "END_DOCUMENT",
		})
	}
}

/**
# Logical document parts

Each [`Event`] refers to a structural unit of the document which has been
decoded. Code page switches are never reported.

[`Decoder::advance_raw`](crate::Decoder::advance_raw) reports every text
producing token as its own event; [`Decoder::advance`](crate::Decoder::advance)
merges adjacent ones into a single [`Event::Text`].
*/
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
	/// Nothing has been decoded yet.
	StartDocument,
	/// The start of an element.
	StartTag {
		/// Name of the element.
		name: QName,
		/// Attributes declared on the element.
		///
		/// With namespace processing enabled, namespace declarations are
		/// not included.
		attributes: Vec<Attribute>,
		/// Set if the element has no content; the matching
		/// [`Event::EndTag`] follows immediately.
		empty: bool,
	},
	/// The end of an element.
	EndTag(QName),
	/// Character data.
	Text {
		text: String,
		/// Whether all characters are at most U+0020.
		whitespace: bool,
	},
	/// A numeric character entity.
	EntityRef {
		/// The referenced character.
		ch: char,
		/// Symbolic name of the entity, `#` followed by the decimal code
		/// point.
		name: String,
	},
	/// An application-defined extension token.
	Extension {
		code: ExtensionCode,
		data: ExtensionData,
	},
	/// The end of the input has been reached with all elements closed.
	EndDocument,
}

impl Event {
	pub fn event_type(&self) -> EventType {
		match self {
			Self::StartDocument => EventType::StartDocument,
			Self::StartTag { .. } => EventType::StartTag,
			Self::EndTag(..) => EventType::EndTag,
			Self::Text { .. } => EventType::Text,
			Self::EntityRef { .. } => EventType::EntityRef,
			Self::Extension { .. } => EventType::Extension,
			Self::EndDocument => EventType::EndDocument,
		}
	}

	/// Return the element name of a tag event.
	pub fn qname(&self) -> Option<&QName> {
		match self {
			Self::StartTag { name, .. } => Some(name),
			Self::EndTag(name) => Some(name),
			_ => None,
		}
	}

	/// Return the text of a text or entity event.
	pub fn text(&self) -> Option<Cow<'_, str>> {
		match self {
			Self::Text { text, .. } => Some(Cow::Borrowed(text.as_str())),
			Self::EntityRef { ch, .. } => Some(Cow::Owned(ch.to_string())),
			_ => None,
		}
	}

	/// Whether this is character data consisting of whitespace only.
	pub fn is_whitespace(&self) -> bool {
		match self {
			Self::Text { whitespace, .. } => *whitespace,
			Self::EntityRef { ch, .. } => *ch <= ' ',
			_ => false,
		}
	}

	/// Return the attributes of a start tag event.
	///
	/// For all other events, the slice is empty.
	pub fn attributes(&self) -> &[Attribute] {
		match self {
			Self::StartTag { attributes, .. } => &attributes[..],
			_ => &[],
		}
	}
}

/// Fail with [`ErrorKind::DuplicateAttribute`] if two attributes are
/// considered equal by `same`.
pub(crate) fn check_unique<F>(attributes: &[Attribute], same: F) -> Result<()>
where
	F: Fn(&Attribute, &Attribute) -> bool,
{
	for (i, a) in attributes.iter().enumerate() {
		for b in attributes[..i].iter() {
			if same(a, b) {
				return Err(ErrorKind::DuplicateAttribute(a.name.clone()).into());
			}
		}
	}
	Ok(())
}
