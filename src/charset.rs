/*!
# Document charsets

WBXML documents declare their charset as an IANA MIBenum in the header. All
strings (inline strings and string table entries) are decoded according to
that charset.

Only charsets in which a zero byte always terminates a string can be
supported, which rules out the UTF-16 and UTF-32 families.
*/
use std::fmt;

use encoding_rs::Encoding;

use crate::error::{ErrorKind, Result};

#[derive(Clone, Copy)]
enum Decoding {
	Utf8,
	Ascii,
	Latin1,
	Other(&'static Encoding),
}

/// A supported document charset.
#[derive(Clone, Copy)]
pub struct Charset {
	mib: u32,
	decoding: Decoding,
}

impl Charset {
	/// UTF-8, MIBenum 106.
	pub const UTF_8: Charset = Charset {
		mib: 106,
		decoding: Decoding::Utf8,
	};

	/// Look up a charset by its IANA MIBenum.
	///
	/// The value `0` ("unknown") is treated as UTF-8.
	pub fn from_mib(mib: u32) -> Result<Charset> {
		let decoding = match mib {
			0 | 106 => Decoding::Utf8,
			3 => Decoding::Ascii,
			4 => Decoding::Latin1,
			5 => Decoding::Other(encoding_rs::ISO_8859_2),
			6 => Decoding::Other(encoding_rs::ISO_8859_3),
			7 => Decoding::Other(encoding_rs::ISO_8859_4),
			8 => Decoding::Other(encoding_rs::ISO_8859_5),
			9 => Decoding::Other(encoding_rs::ISO_8859_6),
			10 => Decoding::Other(encoding_rs::ISO_8859_7),
			11 => Decoding::Other(encoding_rs::ISO_8859_8),
			// the WHATWG mapping of ISO-8859-9
			12 => Decoding::Other(encoding_rs::WINDOWS_1254),
			13 => Decoding::Other(encoding_rs::ISO_8859_10),
			17 => Decoding::Other(encoding_rs::SHIFT_JIS),
			18 => Decoding::Other(encoding_rs::EUC_JP),
			38 => Decoding::Other(encoding_rs::EUC_KR),
			109 => Decoding::Other(encoding_rs::ISO_8859_13),
			110 => Decoding::Other(encoding_rs::ISO_8859_14),
			111 => Decoding::Other(encoding_rs::ISO_8859_15),
			112 => Decoding::Other(encoding_rs::ISO_8859_16),
			113 | 2025 => Decoding::Other(encoding_rs::GBK),
			114 => Decoding::Other(encoding_rs::GB18030),
			2026 => Decoding::Other(encoding_rs::BIG5),
			2084 => Decoding::Other(encoding_rs::KOI8_R),
			2088 => Decoding::Other(encoding_rs::KOI8_U),
			2109 => Decoding::Other(encoding_rs::WINDOWS_874),
			2250 => Decoding::Other(encoding_rs::WINDOWS_1250),
			2251 => Decoding::Other(encoding_rs::WINDOWS_1251),
			2252 => Decoding::Other(encoding_rs::WINDOWS_1252),
			2253 => Decoding::Other(encoding_rs::WINDOWS_1253),
			2254 => Decoding::Other(encoding_rs::WINDOWS_1254),
			2255 => Decoding::Other(encoding_rs::WINDOWS_1255),
			2256 => Decoding::Other(encoding_rs::WINDOWS_1256),
			2257 => Decoding::Other(encoding_rs::WINDOWS_1257),
			2258 => Decoding::Other(encoding_rs::WINDOWS_1258),
			other => return Err(ErrorKind::UnsupportedCharset(other).into()),
		};
		Ok(Charset { mib, decoding })
	}

	/// The IANA MIBenum as declared in the document.
	pub fn mib(&self) -> u32 {
		self.mib
	}

	/// Canonical name of the charset.
	pub fn name(&self) -> &'static str {
		match self.decoding {
			Decoding::Utf8 => "UTF-8",
			Decoding::Ascii => "US-ASCII",
			Decoding::Latin1 => "ISO-8859-1",
			Decoding::Other(enc) => enc.name(),
		}
	}

	/// Decode `data` and append it to `into`.
	///
	/// Fails with [`ErrorKind::InvalidText`] if `data` is not valid in this
	/// charset; nothing is appended in that case.
	pub fn decode_into(&self, data: &[u8], into: &mut String) -> Result<()> {
		match self.decoding {
			Decoding::Utf8 => match std::str::from_utf8(data) {
				Ok(s) => into.push_str(s),
				Err(_) => return Err(ErrorKind::InvalidText.into()),
			},
			Decoding::Ascii => {
				if !data.is_ascii() {
					return Err(ErrorKind::InvalidText.into());
				}
				// ascii is valid utf-8
				into.push_str(std::str::from_utf8(data).map_err(|_| ErrorKind::InvalidText)?);
			}
			Decoding::Latin1 => into.extend(data.iter().map(|b| *b as char)),
			Decoding::Other(enc) => match enc.decode_without_bom_handling_and_without_replacement(data) {
				Some(s) => into.push_str(&s),
				None => return Err(ErrorKind::InvalidText.into()),
			},
		}
		Ok(())
	}

	/// Decode `data` into a new string.
	pub fn decode(&self, data: &[u8]) -> Result<String> {
		let mut out = String::with_capacity(data.len());
		self.decode_into(data, &mut out)?;
		Ok(out)
	}
}

impl Default for Charset {
	fn default() -> Self {
		Self::UTF_8
	}
}

impl fmt::Debug for Charset {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Charset")
			.field("mib", &self.mib)
			.field("name", &self.name())
			.finish()
	}
}

impl PartialEq for Charset {
	fn eq(&self, other: &Self) -> bool {
		self.mib == other.mib
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_charset_is_utf8() {
		let cs = Charset::from_mib(0).unwrap();
		assert_eq!(cs.name(), "UTF-8");
		assert_eq!(cs.mib(), 0);
		assert_eq!(cs.name(), Charset::UTF_8.name());
		assert_ne!(cs, Charset::UTF_8);
		assert_eq!(Charset::from_mib(106).unwrap(), Charset::UTF_8);
	}

	#[test]
	fn charsets_with_same_decoder_differ_by_mib() {
		let iso = Charset::from_mib(12).unwrap();
		let win = Charset::from_mib(2254).unwrap();
		assert_eq!(iso.name(), win.name());
		assert_ne!(iso, win);
		assert_eq!(iso, Charset::from_mib(12).unwrap());
	}

	#[test]
	fn utf8_is_strict() {
		let cs = Charset::UTF_8;
		assert_eq!(cs.decode("fööbär".as_bytes()).unwrap(), "fööbär");
		match cs.decode(b"f\xc3") {
			Err(e) if *e.kind() == ErrorKind::InvalidText => (),
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn ascii_rejects_high_bytes() {
		let cs = Charset::from_mib(3).unwrap();
		assert_eq!(cs.decode(b"abc").unwrap(), "abc");
		assert!(cs.decode(b"\xe4").is_err());
	}

	#[test]
	fn latin1_maps_bytes_to_codepoints() {
		let cs = Charset::from_mib(4).unwrap();
		assert_eq!(cs.decode(b"f\xf6\xf6").unwrap(), "föö");
	}

	#[test]
	fn shift_jis_via_encoding_rs() {
		let cs = Charset::from_mib(17).unwrap();
		assert_eq!(cs.name(), "Shift_JIS");
		assert_eq!(cs.decode(b"\x82\xa0").unwrap(), "\u{3042}");
	}

	#[test]
	fn decode_into_appends() {
		let mut s = String::from("a");
		Charset::UTF_8.decode_into(b"b", &mut s).unwrap();
		assert_eq!(s, "ab");
	}

	#[test]
	fn utf16_is_unsupported() {
		match Charset::from_mib(1015) {
			Err(e) if *e.kind() == ErrorKind::UnsupportedCharset(1015) => (),
			other => panic!("unexpected result: {:?}", other),
		}
	}
}
