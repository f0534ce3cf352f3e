#[macro_use]
extern crate afl;
extern crate rwbxml;

use rwbxml::{Decoder, DecoderOptions, Event, ExtensionText, RcPtr, SymbolTables};

fn tables() -> RcPtr<SymbolTables> {
	RcPtr::new(
		SymbolTables::new()
			.with_tags(0, &["a", "b", "c", "d"])
			.with_tags(1, &["e", "f"])
			.with_attribute_starts(0, &["xmlns", "xmlns:p", "p:x", "y", "z=v"])
			.with_attribute_values(0, &["1", "2"]),
	)
}

fn main() {
	fuzz!(|data: &[u8]| {
		// the first byte selects the options, the rest is the document
		let (flags, doc) = match data.split_first() {
			Some((flags, doc)) => (*flags, doc),
			None => return,
		};
		let options = DecoderOptions::default()
			.namespaces(flags & 0x01 != 0)
			.extension_text(if flags & 0x02 != 0 {
				ExtensionText::Coalesce
			} else {
				ExtensionText::Separate
			})
			.max_string_length(4096)
			.max_depth(64);
		let raw = flags & 0x04 != 0;
		let mut decoder = match Decoder::with_options(doc, tables(), options) {
			Ok(d) => d,
			Err(_) => return,
		};

		loop {
			let result = if raw {
				decoder.advance_raw()
			} else {
				decoder.advance()
			};
			match result {
				Err(_) => return,
				Ok(Event::EndDocument) => return,
				Ok(_) => (),
			}
		}
	});
}
