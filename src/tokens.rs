/*!
# Global WBXML tokens

These opcodes have the same meaning on every code page. Element and
attribute tokens are the remaining values and are looked up in the
[`SymbolTables`](crate::SymbolTables).
*/
use std::fmt;

pub const SWITCH_PAGE: u8 = 0x00;
pub const END: u8 = 0x01;
pub const ENTITY: u8 = 0x02;
pub const STR_I: u8 = 0x03;
pub const LITERAL: u8 = 0x04;
pub const EXT_I_0: u8 = 0x40;
pub const EXT_I_1: u8 = 0x41;
pub const EXT_I_2: u8 = 0x42;
pub const PI: u8 = 0x43;
pub const LITERAL_C: u8 = 0x44;
pub const EXT_T_0: u8 = 0x80;
pub const EXT_T_1: u8 = 0x81;
pub const EXT_T_2: u8 = 0x82;
pub const STR_T: u8 = 0x83;
pub const LITERAL_A: u8 = 0x84;
pub const EXT_0: u8 = 0xc0;
pub const EXT_1: u8 = 0xc1;
pub const EXT_2: u8 = 0xc2;
pub const OPAQUE: u8 = 0xc3;
pub const LITERAL_AC: u8 = 0xc4;

/// Bit of an element opcode which indicates that attributes follow.
pub const TAG_HAS_ATTRIBUTES: u8 = 0x80;
/// Bit of an element opcode which indicates that the element has content.
pub const TAG_HAS_CONTENT: u8 = 0x40;
/// Mask selecting the tag token of an element opcode.
pub const TAG_TOKEN_MASK: u8 = 0x3f;

/// Opcodes of the extension family.
///
/// Each variant determines the payload which follows the opcode, see
/// [`ExtensionData`](crate::ExtensionData).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionCode {
	/// `EXT_I_0`, followed by an inline string
	ExtI0,
	/// `EXT_I_1`, followed by an inline string
	ExtI1,
	/// `EXT_I_2`, followed by an inline string
	ExtI2,
	/// `EXT_T_0`, followed by a multi-byte integer
	ExtT0,
	/// `EXT_T_1`, followed by a multi-byte integer
	ExtT1,
	/// `EXT_T_2`, followed by a multi-byte integer
	ExtT2,
	/// `EXT_0`, no payload
	Ext0,
	/// `EXT_1`, no payload
	Ext1,
	/// `EXT_2`, no payload
	Ext2,
	/// `OPAQUE`, followed by a length-prefixed byte sequence
	Opaque,
}

impl ExtensionCode {
	pub fn from_u8(op: u8) -> Option<ExtensionCode> {
		match op {
			EXT_I_0 => Some(Self::ExtI0),
			EXT_I_1 => Some(Self::ExtI1),
			EXT_I_2 => Some(Self::ExtI2),
			EXT_T_0 => Some(Self::ExtT0),
			EXT_T_1 => Some(Self::ExtT1),
			EXT_T_2 => Some(Self::ExtT2),
			EXT_0 => Some(Self::Ext0),
			EXT_1 => Some(Self::Ext1),
			EXT_2 => Some(Self::Ext2),
			OPAQUE => Some(Self::Opaque),
			_ => None,
		}
	}

	/// The opcode byte of this extension.
	pub fn opcode(&self) -> u8 {
		match self {
			Self::ExtI0 => EXT_I_0,
			Self::ExtI1 => EXT_I_1,
			Self::ExtI2 => EXT_I_2,
			Self::ExtT0 => EXT_T_0,
			Self::ExtT1 => EXT_T_1,
			Self::ExtT2 => EXT_T_2,
			Self::Ext0 => EXT_0,
			Self::Ext1 => EXT_1,
			Self::Ext2 => EXT_2,
			Self::Opaque => OPAQUE,
		}
	}

	/// Whether the payload of this extension is an inline string.
	pub fn is_string(&self) -> bool {
		matches!(self, Self::ExtI0 | Self::ExtI1 | Self::ExtI2)
	}
}

impl fmt::Display for ExtensionCode {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::ExtI0 => "EXT_I_0",
			Self::ExtI1 => "EXT_I_1",
			Self::ExtI2 => "EXT_I_2",
			Self::ExtT0 => "EXT_T_0",
			Self::ExtT1 => "EXT_T_1",
			Self::ExtT2 => "EXT_T_2",
			Self::Ext0 => "EXT_0",
			Self::Ext1 => "EXT_1",
			Self::Ext2 => "EXT_2",
			Self::Opaque => "OPAQUE",
		})
	}
}

/// Whether `op` sits in one of the global token columns of the code space
/// (low six bits 0 to 3) outside of the control row, i.e. whether it is
/// dispatched as an extension in content.
///
/// This includes `PI`, which is not supported and rejected by the
/// extension decoder.
pub fn is_extension_slot(op: u8) -> bool {
	op >= 0x40 && (op & TAG_TOKEN_MASK) <= 0x03 && op != STR_T
}

/// Whether `op` contributes to an attribute value when it follows an
/// attribute name or another value fragment.
pub fn is_attribute_value(op: u8) -> bool {
	match op {
		SWITCH_PAGE | ENTITY | STR_I => true,
		EXT_I_0 | EXT_I_1 | EXT_I_2 => true,
		other => other >= 0x80,
	}
}

/// Whether `op` may start an attribute.
pub fn is_attribute_start(op: u8) -> bool {
	match op {
		LITERAL => true,
		0x05..=0x3f => true,
		0x45..=0x7f => true,
		_ => false,
	}
}
