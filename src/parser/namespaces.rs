use crate::error::{ErrorKind, Result};
use crate::strings::{split_prefix, Attribute, Name, QName};

use super::common::{check_unique, XMLNS_XML, XMLNS_XMLNS};

#[derive(Debug, Clone)]
struct Binding {
	depth: usize,
	prefix: Option<Name>,
	uri: Name,
}

/**
# Namespace prefix resolver

Tracks the namespace declarations in scope and rewrites element and
attribute names into (namespace, prefix, local name) triples.

Declarations are recorded together with the depth of the element which
carries them; [`NamespaceResolver::pop_scope`] forgets them again when the
element is closed. Lookups walk the declarations from the innermost scope
outwards.

The `xml` and `xmlns` prefixes are bound to their fixed URIs and cannot be
rebound.
*/
#[derive(Debug, Clone, Default)]
pub struct NamespaceResolver {
	bindings: Vec<Binding>,
}

impl NamespaceResolver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Look up the URI bound to `prefix`, or the default namespace if
	/// `prefix` is `None`.
	pub fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
		match prefix {
			Some("xml") => return Some(XMLNS_XML),
			Some("xmlns") => return Some(XMLNS_XMLNS),
			_ => (),
		}
		self.bindings
			.iter()
			.rev()
			.find(|b| b.prefix.as_deref() == prefix)
			.map(|b| b.uri.as_str())
	}

	/// Number of bindings in scope, including shadowed ones.
	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	/// Resolve an element which is opened at `depth`.
	///
	/// Namespace declarations are removed from `attributes` and bound at
	/// `depth`. The remaining attributes and the element name are rewritten
	/// in place. Unprefixed attributes are never in a namespace; an
	/// unprefixed element takes the innermost default namespace, or the
	/// empty namespace if there is none.
	pub fn process(&mut self, depth: usize, name: &mut QName, attributes: &mut Vec<Attribute>) -> Result<()> {
		let mut i = 0;
		while i < attributes.len() {
			let prefix = match split_prefix(&attributes[i].name) {
				(None, "xmlns") => None,
				(Some("xmlns"), prefix) => Some(Name::from(prefix)),
				_ => {
					i += 1;
					continue;
				}
			};
			let decl = attributes.remove(i);
			if decl.value.is_empty() {
				return Err(ErrorKind::EmptyNamespaceDeclaration.into());
			}
			if let Some(prefix) = prefix.as_ref() {
				if prefix.is_empty() {
					return Err(ErrorKind::MalformedContent("empty namespace prefix").into());
				}
				if prefix.as_str() == "xml" || prefix.as_str() == "xmlns" {
					return Err(ErrorKind::MalformedContent("reserved namespace prefix").into());
				}
			}
			self.bindings.push(Binding {
				depth,
				prefix,
				uri: Name::from(decl.value),
			});
		}

		for attr in attributes.iter_mut() {
			let (prefix, local) = match split_prefix(&attr.name) {
				(Some(prefix), local) => (Name::from(prefix), Name::from(local)),
				(None, _) => continue,
			};
			attr.namespace = match self.lookup(Some(prefix.as_str())) {
				Some(uri) => Name::from(uri),
				None => return Err(ErrorKind::UndefinedPrefix(prefix).into()),
			};
			attr.prefix = prefix;
			attr.name = local;
		}
		// prefixes which differ lexically may still map to the same URI
		check_unique(attributes, |a, b| a.namespace == b.namespace && a.name == b.name)?;

		let (prefix, local) = match split_prefix(&name.name) {
			(Some(prefix), local) => (Some(Name::from(prefix)), Name::from(local)),
			(None, _) => (None, name.name.clone()),
		};
		name.namespace = match (self.lookup(prefix.as_deref()), prefix) {
			(Some(uri), prefix) => {
				name.prefix = prefix.unwrap_or_default();
				Name::from(uri)
			}
			(None, Some(prefix)) => return Err(ErrorKind::UndefinedPrefix(prefix).into()),
			(None, None) => Name::new(),
		};
		name.name = local;
		Ok(())
	}

	/// Drop all bindings made at `depth` or deeper.
	pub fn pop_scope(&mut self, depth: usize) {
		while let Some(b) = self.bindings.last() {
			if b.depth < depth {
				break;
			}
			self.bindings.pop();
		}
	}
}
