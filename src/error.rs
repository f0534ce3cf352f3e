/*!
# Error types

This module holds the error types returned by the decoder.

Every error carries an [`ErrorKind`] describing what went wrong, a static
phrase describing where in the grammar it happened and, once the error has
passed through a [`Decoder`](crate::Decoder), the [`Position`] in the input
at which decoding stopped.
*/
use std::error;
use std::fmt;
use std::io;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::sync::Arc;

use crate::strings::Name;
use crate::tables::TableKind;

pub const ERRCTX_UNKNOWN: &'static str = "in unknown context";
pub const ERRCTX_HEADER: &'static str = "in document header";
pub const ERRCTX_STRTBL: &'static str = "in string table reference";
pub const ERRCTX_TEXT: &'static str = "in text";
pub const ERRCTX_ENTITY: &'static str = "in entity";
pub const ERRCTX_EXTENSION: &'static str = "in extension";
pub const ERRCTX_PAGE_SWITCH: &'static str = "at code page switch";
pub const ERRCTX_NAME: &'static str = "in element name";
pub const ERRCTX_ATTNAME: &'static str = "in attribute name";
pub const ERRCTX_ATTVAL: &'static str = "in attribute value";
pub const ERRCTX_ELEMENT: &'static str = "in element";
pub const ERRCTX_ELEMENT_CLOSE: &'static str = "at element close";
pub const ERRCTX_NAMESPACE: &'static str = "in namespace declaration";
pub const ERRCTX_DOCEND: &'static str = "at end of document";

/// [`std::sync::Arc`]-based around [`std::io::Error`] to allow cloning.
#[derive(Clone)]
pub struct IOErrorWrapper(Arc<io::Error>);

impl IOErrorWrapper {
	fn wrap(e: io::Error) -> IOErrorWrapper {
		IOErrorWrapper(Arc::new(e))
	}
}

impl fmt::Debug for IOErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl fmt::Display for IOErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(&**self, f)
	}
}

impl PartialEq for IOErrorWrapper {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl AsRef<io::Error> for IOErrorWrapper {
	fn as_ref(&self) -> &io::Error {
		&*self.0
	}
}

impl Deref for IOErrorWrapper {
	type Target = io::Error;

	fn deref(&self) -> &io::Error {
		&*self.0
	}
}

/// Classification of decoding failures.
///
/// All kinds are fatal to the stream they occurred in.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
	/// The byte source reported an error.
	Io(IOErrorWrapper),

	/// The byte source was exhausted in the middle of a token, or while
	/// elements were still open.
	UnexpectedEndOfInput,

	/// A multi-byte integer does not fit into 32 bits.
	IntegerOverflow,

	/// A token refers to a slot which is out of range or empty in the
	/// table selected by the active code page.
	UndefinedSymbol(TableKind, u8),

	/// A code page has no table of the required kind.
	UndefinedCodePage(TableKind, u8),

	/// An opcode was dispatched as an extension, but is none of the
	/// `EXT_*` or `OPAQUE` tokens.
	IllegalExtensionOpcode(u8),

	/// The token sequence does not form the structure which was required.
	///
	/// The string describes the expectation and should not be interpreted
	/// by user code.
	MalformedContent(&'static str),

	/// A namespace declaration binds a prefix (or the default namespace)
	/// to the empty string.
	EmptyNamespaceDeclaration,

	/// Use of a namespace prefix which is not bound in scope.
	UndefinedPrefix(Name),

	/// An attribute was declared more than once on the same element.
	///
	/// **Note:** This is also emitted for prefixed attributes which only
	/// collide after their prefixes have been resolved.
	DuplicateAttribute(Name),

	/// An entity refers to a value which is not a Unicode scalar value.
	InvalidChar(u32),

	/// A string is not valid in the charset of the document.
	InvalidText,

	/// A string table offset points outside the table, or the string at
	/// that offset is not terminated.
	InvalidStringTableOffset(u32),

	/// The document declares a charset (IANA MIBenum) which cannot be
	/// decoded.
	UnsupportedCharset(u32),

	/// A configured limit of [`DecoderOptions`](crate::DecoderOptions) was
	/// exceeded.
	///
	/// The string indicates which limit and should not be interpreted by
	/// user code.
	LimitExceeded(&'static str),
}

impl fmt::Display for ErrorKind {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Io(e) => write!(f, "I/O error: {}", e),
			Self::UnexpectedEndOfInput => f.write_str("unexpected end of input"),
			Self::IntegerOverflow => f.write_str("multi-byte integer exceeds 32 bits"),
			Self::UndefinedSymbol(kind, token) => {
				write!(f, "undefined {} token 0x{:02x}", kind, token)
			}
			Self::UndefinedCodePage(kind, page) => {
				write!(f, "code page {} has no {} table", page, kind)
			}
			Self::IllegalExtensionOpcode(op) => write!(f, "illegal extension opcode 0x{:02x}", op),
			Self::MalformedContent(msg) => write!(f, "malformed content: {}", msg),
			Self::EmptyNamespaceDeclaration => f.write_str("namespace URI is empty"),
			Self::UndefinedPrefix(prefix) => {
				write!(f, "use of undeclared namespace prefix {:?}", prefix.as_str())
			}
			Self::DuplicateAttribute(name) => write!(f, "duplicate attribute {:?}", name.as_str()),
			Self::InvalidChar(cp) => write!(f, "invalid char: U+{:08x}", cp),
			Self::InvalidText => f.write_str("string is not valid in the document charset"),
			Self::InvalidStringTableOffset(offset) => {
				write!(f, "invalid string table offset {}", offset)
			}
			Self::UnsupportedCharset(mib) => write!(f, "unsupported charset (MIBenum {})", mib),
			Self::LimitExceeded(what) => write!(f, "limit exceeded: {}", what),
		}
	}
}

/// Where in the input decoding stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
	/// Number of bytes consumed from the source, including the header.
	pub offset: u64,
	/// Number of open elements.
	pub depth: usize,
	/// Name of the innermost open element, if any.
	pub element: Option<Name>,
}

/// Error type returned by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
	kind: ErrorKind,
	context: &'static str,
	position: Option<Box<Position>>,
}

pub type Result<T> = StdResult<T, Error>;

pub(crate) trait ErrorWithContext {
	fn with_context(self, ctx: &'static str) -> Self;
}

impl Error {
	pub fn io(e: io::Error) -> Error {
		ErrorKind::Io(IOErrorWrapper::wrap(e)).into()
	}

	pub(crate) fn eof(ctx: &'static str) -> Error {
		Error::from(ErrorKind::UnexpectedEndOfInput).with_context(ctx)
	}

	/// The classification of this error.
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// A short phrase describing where in the grammar the error occurred.
	pub fn context(&self) -> &'static str {
		self.context
	}

	/// Position of the decoder when the error occurred.
	///
	/// This is `None` for errors which were raised outside of a decoder, for
	/// example by [`SymbolTables::resolve`](crate::SymbolTables::resolve).
	pub fn position(&self) -> Option<&Position> {
		self.position.as_deref()
	}

	pub(crate) fn at(mut self, position: Position) -> Self {
		if self.position.is_none() {
			self.position = Some(Box::new(position));
		}
		self
	}
}

impl ErrorWithContext for Error {
	fn with_context(mut self, ctx: &'static str) -> Self {
		// the innermost context is the most precise one
		if self.context == ERRCTX_UNKNOWN {
			self.context = ctx;
		}
		self
	}
}

pub(crate) fn add_context<T, E: ErrorWithContext>(r: StdResult<T, E>, ctx: &'static str) -> StdResult<T, E> {
	r.map_err(|e| e.with_context(ctx))
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error {
			kind,
			context: ERRCTX_UNKNOWN,
			position: None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::io(e)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.kind)?;
		if self.context != ERRCTX_UNKNOWN {
			write!(f, " {}", self.context)?;
		}
		if let Some(pos) = self.position.as_ref() {
			write!(f, " at byte {} (depth {}", pos.offset, pos.depth)?;
			if let Some(name) = pos.element.as_ref() {
				write!(f, ", inside <{}>", name)?;
			}
			f.write_str(")")?;
		}
		Ok(())
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match &self.kind {
			ErrorKind::Io(e) => Some(&**e),
			_ => None,
		}
	}
}
