/*!
# Names and attributes

Element and attribute names in WBXML documents are short and come from a
small dictionary, so they are carried as [`smartstring`] strings which keep
them inline without a heap allocation in the common case.

A [`QName`] and an [`Attribute`] always carry the namespace and prefix
fields. They stay empty unless namespace processing is enabled on the
decoder (see [`DecoderOptions::namespaces`](crate::DecoderOptions::namespaces)),
in which case they are filled in by prefix resolution.
*/
use std::fmt;

use smartstring::alias::String as SmartString;

/// Short, inline-optimized string used for names, prefixes and namespace
/// URIs.
pub type Name = SmartString;

/// Qualified name of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QName {
	/// Namespace URI, empty if the name is not in a namespace or if
	/// namespace processing is disabled.
	pub namespace: Name,
	/// Namespace prefix as written in the document, empty if there was none
	/// or if namespace processing is disabled.
	pub prefix: Name,
	/// Local part of the name, or the full lexical name if namespace
	/// processing is disabled.
	pub name: Name,
}

impl QName {
	/// Create a name without namespace and prefix.
	pub fn local<T: Into<Name>>(name: T) -> QName {
		QName {
			namespace: Name::new(),
			prefix: Name::new(),
			name: name.into(),
		}
	}

	/// Whether the element is in the namespace `ns` and has the local name
	/// `name`.
	pub fn matches(&self, ns: &str, name: &str) -> bool {
		self.namespace.as_str() == ns && self.name.as_str() == name
	}
}

impl fmt::Display for QName {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		if self.prefix.len() > 0 {
			write!(f, "{}:{}", self.prefix, self.name)
		} else {
			f.write_str(&self.name)
		}
	}
}

/// A single decoded attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attribute {
	/// Namespace URI; empty for unprefixed attributes or if namespace
	/// processing is disabled.
	pub namespace: Name,
	/// Namespace prefix as written in the document.
	pub prefix: Name,
	/// Local name, or the full lexical name if namespace processing is
	/// disabled.
	pub name: Name,
	/// Attribute value, with all value fragments concatenated.
	pub value: String,
}

impl Attribute {
	/// Create an attribute with the given lexical name and value.
	pub fn new<N: Into<Name>, V: Into<String>>(name: N, value: V) -> Attribute {
		Attribute {
			namespace: Name::new(),
			prefix: Name::new(),
			name: name.into(),
			value: value.into(),
		}
	}
}

/// Split a lexical name into an optional prefix and the local part.
///
/// Only the first colon separates; the local part may contain further
/// colons.
pub fn split_prefix(name: &str) -> (Option<&str>, &str) {
	match name.find(':') {
		Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
		None => (None, name),
	}
}

/// Whether all bytes are at most U+0020, which includes control
/// characters.
///
/// An empty slice is whitespace-only.
pub fn is_whitespace(data: &[u8]) -> bool {
	data.iter().all(|b| *b <= 0x20)
}
