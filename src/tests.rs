use super::*;

use std::io;

use bytes::Bytes;

use crate::error::{ERRCTX_DOCEND, ERRCTX_ENTITY};

// note that these are end-to-end tests... the components of the Decoder are
// tested in their modules.

fn doc(strtbl: &[u8], body: &[u8]) -> Vec<u8> {
	assert!(strtbl.len() < 0x80);
	let mut out = vec![0x03, 0x01, 0x6a, strtbl.len() as u8];
	out.extend_from_slice(strtbl);
	out.extend_from_slice(body);
	out
}

fn tables() -> RcPtr<SymbolTables> {
	RcPtr::new(
		SymbolTables::new()
			// 0x05, 0x06, 0x07
			.with_tags(0, &["root", "item", "name"])
			.with_tags(1, &["foo", "bar"])
			.with_attribute_starts(
				0,
				&[
					"id",           // 0x05
					"type=text",    // 0x06
					"xmlns",        // 0x07
					"xmlns:p",      // 0x08
					"p:attr",       // 0x09
					"href=http://", // 0x0a
					"q:attr",       // 0x0b
					"xmlns:q",      // 0x0c
				],
			)
			.with_attribute_values(0, &[".com", "www."])
			.with_attribute_starts(1, &["lang"]),
	)
}

fn decoder_with(body: &[u8], options: DecoderOptions) -> Decoder<io::Cursor<Vec<u8>>> {
	Decoder::with_options(io::Cursor::new(doc(b"", body)), tables(), options).unwrap()
}

fn decoder(body: &[u8]) -> Decoder<io::Cursor<Vec<u8>>> {
	decoder_with(body, DecoderOptions::default())
}

fn collect<R: io::Read>(d: &mut Decoder<R>) -> Result<Vec<Event>> {
	let mut out = Vec::new();
	d.read_all(|ev| out.push(ev))?;
	Ok(out)
}

fn collect_raw<R: io::Read>(d: &mut Decoder<R>) -> Result<Vec<Event>> {
	let mut out = Vec::new();
	loop {
		let ev = d.advance_raw()?.clone();
		let done = ev == Event::EndDocument;
		out.push(ev);
		if done {
			return Ok(out);
		}
	}
}

fn start(name: &str, empty: bool) -> Event {
	Event::StartTag {
		name: QName::local(name),
		attributes: Vec::new(),
		empty,
	}
}

fn end(name: &str) -> Event {
	Event::EndTag(QName::local(name))
}

fn text(s: &str) -> Event {
	Event::Text {
		text: s.to_string(),
		whitespace: false,
	}
}

struct FailingReader();

impl io::Read for FailingReader {
	fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
		Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"))
	}
}

#[test]
fn decoder_emits_balanced_events() {
	let mut d = decoder(b"\x45\x46\x03a\x00\x01\x06\x01");
	let mut seen = Vec::new();
	loop {
		let ev = d.advance().unwrap().clone();
		seen.push((ev.clone(), d.depth()));
		if ev == Event::EndDocument {
			break;
		}
	}
	assert_eq!(
		seen,
		vec![
			(start("root", false), 1),
			(start("item", false), 2),
			(text("a"), 2),
			(end("item"), 2),
			(start("item", true), 2),
			(end("item"), 2),
			(end("root"), 1),
			(Event::EndDocument, 0),
		]
	);
}

#[test]
fn decoder_keeps_reporting_end_document() {
	let mut d = decoder(b"\x05");
	collect(&mut d).unwrap();
	assert!(matches!(d.advance().unwrap(), Event::EndDocument));
	assert!(matches!(d.advance_raw().unwrap(), Event::EndDocument));
	assert_eq!(d.read().unwrap(), None);
}

#[test]
fn event_read_stops_after_end_document() {
	let mut d = decoder(b"\x05");
	assert_eq!(d.read().unwrap(), Some(start("root", true)));
	assert_eq!(d.read().unwrap(), Some(end("root")));
	assert_eq!(d.read().unwrap(), Some(Event::EndDocument));
	assert_eq!(d.read().unwrap(), None);
	assert_eq!(d.read().unwrap(), None);
}

#[test]
fn advance_coalesces_text_and_entities() {
	let body = b"\x45\x03a\x00\x02\x26\x03b\x00\x01";
	let mut d = decoder(body);
	assert_eq!(
		collect(&mut d).unwrap(),
		vec![start("root", false), text("a&b"), end("root"), Event::EndDocument]
	);

	let mut d = decoder(body);
	assert_eq!(
		collect_raw(&mut d).unwrap(),
		vec![
			start("root", false),
			text("a"),
			Event::EntityRef {
				ch: '&',
				name: "#38".to_string()
			},
			text("b"),
			end("root"),
			Event::EndDocument,
		]
	);
}

#[test]
fn advance_turns_lone_entity_into_text() {
	let mut d = decoder(b"\x45\x02\x20\x01");
	d.advance().unwrap();
	assert_eq!(
		*d.advance().unwrap(),
		Event::Text {
			text: " ".to_string(),
			whitespace: true,
		}
	);
	assert!(d.is_whitespace());
}

#[test]
fn advance_raw_reports_entity_name() {
	let mut d = decoder(b"\x45\x02\x81\x20\x01");
	d.advance_raw().unwrap();
	assert_eq!(d.advance_raw().unwrap().event_type(), EventType::EntityRef);
	assert_eq!(d.name(), Some("#160"));
	assert_eq!(d.text().as_deref(), Some("\u{a0}"));
}

#[test]
fn coalesced_whitespace_flag_requires_all_parts() {
	let mut d = decoder(b"\x45\x03 \x00\x02\x0a\x03x\x00\x01");
	d.advance().unwrap();
	assert_eq!(*d.advance().unwrap(), text(" \nx"));

	let mut d = decoder(b"\x45\x03 \x00\x02\x0a\x03\t\x00\x01");
	d.advance().unwrap();
	d.advance().unwrap();
	assert!(d.is_whitespace());
	assert_eq!(d.text().as_deref(), Some(" \n\t"));
}

#[test]
fn page_switch_is_transparent() {
	let mut d = decoder(b"\x00\x01\x05");
	assert_eq!(*d.advance_raw().unwrap(), start("foo", true));
	assert_eq!(d.tag_page(), 1);
	assert_eq!(
		collect_raw(&mut d).unwrap(),
		vec![end("foo"), Event::EndDocument]
	);
}

#[test]
fn page_switch_between_text_parts_is_transparent() {
	let mut d = decoder(b"\x45\x03a\x00\x00\x01\x03b\x00\x06\x01");
	d.advance().unwrap();
	assert_eq!(*d.advance().unwrap(), text("ab"));
	assert_eq!(*d.advance().unwrap(), start("bar", true));
}

#[test]
fn consecutive_page_switches_all_apply() {
	let mut d = decoder(b"\x00\x01\x00\x00\x05");
	assert_eq!(*d.advance().unwrap(), start("root", true));
	assert_eq!(d.tag_page(), 0);
}

#[test]
fn page_switch_to_undefined_page_fails() {
	let mut d = decoder(b"\x00\x07\x05");
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::UndefinedCodePage(TableKind::Tag, 7) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn undefined_tag_token_fails() {
	let mut d = decoder(b"\x0a");
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::UndefinedSymbol(TableKind::Tag, 0x0a) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn attribute_page_switch_is_independent() {
	let mut d = decoder(b"\x85\x00\x01\x05\x03de\x00\x01");
	d.advance().unwrap();
	assert_eq!(d.attribute_value("", "lang"), Some("de"));
	assert_eq!(d.attribute_page(), 1);
	assert_eq!(d.tag_page(), 0);
}

#[test]
fn attribute_start_prefix_and_value_tokens_concatenate() {
	let mut d = decoder(b"\x86\x0a\x86\x03example\x00\x85\x06\x01");
	d.advance().unwrap();
	assert_eq!(d.name(), Some("item"));
	assert_eq!(d.attribute_count(), 2);
	let href = d.attribute_at(0).unwrap();
	assert_eq!(href.name.as_str(), "href");
	assert_eq!(href.value, "http://www.example.com");
	assert_eq!(d.attribute_value("", "type"), Some("text"));
	assert!(d.is_empty_element());
}

#[test]
fn extensions_render_inside_attribute_values() {
	let mut d = decoder(b"\x85\x05\x80\x07\xc3\x02\xab\xcd\x02\x41\x40x\x00\xc0\x01");
	d.advance().unwrap();
	assert_eq!(d.attribute_value("", "id"), Some("7abcdAx"));
}

#[test]
fn attributes_do_not_leak_between_elements() {
	let mut d = decoder(b"\x45\x86\x05\x03one\x00\x01\x06\x86\x05\x03two\x00\x01\x01");
	assert_eq!(d.next_tag().unwrap().event_type(), EventType::StartTag);
	d.next_tag().unwrap();
	assert_eq!(d.attribute_value("", "id"), Some("one"));
	assert_eq!(d.next_tag().unwrap().event_type(), EventType::EndTag);
	d.next_tag().unwrap();
	assert_eq!(d.attribute_count(), 0);
	d.next_tag().unwrap();
	d.next_tag().unwrap();
	assert_eq!(d.attribute_count(), 1);
	assert_eq!(d.attribute_value("", "id"), Some("two"));
}

#[test]
fn duplicate_attribute_is_rejected() {
	let mut d = decoder(b"\x85\x05\x03a\x00\x05\x03b\x00\x01");
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::DuplicateAttribute("id".into()) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn namespaces_are_resolved() {
	let body = b"\xc5\x07\x03urn:x\x00\x08\x03urn:y\x00\x09\x03v\x00\x01\x01";
	let mut d = decoder_with(body, DecoderOptions::default().namespaces(true));
	d.advance().unwrap();
	assert_eq!(d.namespace(), Some("urn:x"));
	assert_eq!(d.prefix(), Some(""));
	assert_eq!(d.name(), Some("root"));
	assert_eq!(d.attribute_count(), 1);
	let attr = d.attribute_at(0).unwrap();
	assert_eq!(attr.namespace.as_str(), "urn:y");
	assert_eq!(attr.prefix.as_str(), "p");
	assert_eq!(attr.name.as_str(), "attr");
	assert_eq!(d.attribute_value("urn:y", "attr"), Some("v"));
	d.require(EventType::StartTag, Some("urn:x"), Some("root")).unwrap();
	assert_eq!(d.advance().unwrap().qname().unwrap().namespace.as_str(), "urn:x");
	assert!(matches!(d.advance().unwrap(), Event::EndDocument));
}

#[test]
fn namespace_declarations_are_plain_attributes_by_default() {
	let body = b"\xc5\x07\x03urn:x\x00\x08\x03urn:y\x00\x09\x03v\x00\x01\x01";
	let mut d = decoder(body);
	d.advance().unwrap();
	assert_eq!(d.namespace(), Some(""));
	assert_eq!(d.attribute_count(), 3);
	assert_eq!(d.attribute_value("", "xmlns"), Some("urn:x"));
	assert_eq!(d.attribute_value("", "p:attr"), Some("v"));
}

#[test]
fn namespace_scope_ends_with_element() {
	// <root><item xmlns="urn:x"/><item/></root>
	let body = b"\x45\x86\x07\x03urn:x\x00\x01\x06\x01";
	let mut d = decoder_with(body, DecoderOptions::default().namespaces(true));
	d.next_tag().unwrap();
	d.next_tag().unwrap();
	assert_eq!(d.namespace(), Some("urn:x"));
	d.next_tag().unwrap();
	d.next_tag().unwrap();
	assert_eq!(d.name(), Some("item"));
	assert_eq!(d.namespace(), Some(""));
}

#[test]
fn duplicate_attribute_after_resolution_is_rejected() {
	let body = b"\x85\x08\x03urn:same\x00\x0c\x03urn:same\x00\x09\x031\x00\x0b\x032\x00\x01";
	let mut d = decoder(body);
	// lexically distinct
	d.advance().unwrap();
	assert_eq!(d.attribute_count(), 4);

	let mut d = decoder_with(body, DecoderOptions::default().namespaces(true));
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::DuplicateAttribute("attr".into()) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn undeclared_prefix_is_rejected() {
	let mut d = decoder_with(b"\x85\x09\x03v\x00\x01", DecoderOptions::default().namespaces(true));
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::UndefinedPrefix("p".into()) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn empty_namespace_declaration_is_rejected() {
	let mut d = decoder_with(b"\x85\x07\x03\x00\x01", DecoderOptions::default().namespaces(true));
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::EmptyNamespaceDeclaration => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn degenerate_element_closes_on_next_call() {
	let mut d = decoder(b"\x45\x06\x03x\x00\x01");
	d.advance().unwrap();
	assert_eq!(*d.advance().unwrap(), start("item", true));
	assert_eq!(*d.advance().unwrap(), end("item"));
	assert_eq!(*d.advance().unwrap(), text("x"));
	assert_eq!(*d.advance().unwrap(), end("root"));
}

#[test]
fn string_table_names_and_text() {
	let data = doc(b"hello\x00el\x00", b"\x44\x06\x83\x00\x01");
	let mut d = Decoder::new(&data[..], tables()).unwrap();
	assert_eq!(
		collect(&mut d).unwrap(),
		vec![start("el", false), text("hello"), end("el"), Event::EndDocument]
	);
}

#[test]
fn invalid_string_table_offset_is_rejected() {
	let mut d = decoder(b"\x45\x83\x20\x01");
	d.advance().unwrap();
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::InvalidStringTableOffset(32) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn extensions_are_reported() {
	let body = b"\x45\x40ext\x00\x80\x81\x20\xc0\xc3\x03\x01\x02\x03\x01";
	let mut d = decoder(body);
	assert_eq!(
		collect(&mut d).unwrap(),
		vec![
			start("root", false),
			Event::Extension {
				code: ExtensionCode::ExtI0,
				data: ExtensionData::Str("ext".to_string()),
			},
			Event::Extension {
				code: ExtensionCode::ExtT0,
				data: ExtensionData::Int(160),
			},
			Event::Extension {
				code: ExtensionCode::Ext0,
				data: ExtensionData::None,
			},
			Event::Extension {
				code: ExtensionCode::Opaque,
				data: ExtensionData::Opaque(Bytes::from_static(b"\x01\x02\x03")),
			},
			end("root"),
			Event::EndDocument,
		]
	);
}

#[test]
fn extension_accessors() {
	let mut d = decoder(b"\x45\x81\x05\x01");
	d.advance().unwrap();
	assert_eq!(d.extension_code(), None);
	d.advance().unwrap();
	assert_eq!(d.extension_code(), Some(ExtensionCode::ExtT1));
	assert_eq!(d.extension_data(), Some(&ExtensionData::Int(5)));
	assert_eq!(d.text(), None);
}

#[test]
fn extension_text_policy() {
	let body = b"\x45\x03a\x00\x40b\x00\x03c\x00\x01";
	let mut d = decoder(body);
	d.advance().unwrap();
	assert_eq!(*d.advance().unwrap(), text("a"));
	assert_eq!(d.advance().unwrap().event_type(), EventType::Extension);
	assert_eq!(*d.advance().unwrap(), text("c"));

	let mut d = decoder_with(
		body,
		DecoderOptions::default().extension_text(ExtensionText::Coalesce),
	);
	d.advance().unwrap();
	assert_eq!(*d.advance().unwrap(), text("abc"));
	assert_eq!(*d.advance().unwrap(), end("root"));

	// the fine-grained primitive never merges
	let mut d = decoder_with(
		body,
		DecoderOptions::default().extension_text(ExtensionText::Coalesce),
	);
	d.advance_raw().unwrap();
	d.advance_raw().unwrap();
	assert_eq!(d.advance_raw().unwrap().event_type(), EventType::Extension);
}

#[test]
fn processing_instructions_are_illegal_extensions() {
	let mut d = decoder(b"\x45\x43\x01");
	d.advance().unwrap();
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::IllegalExtensionOpcode(0x43) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn truncated_varint_is_unexpected_end() {
	let mut d = decoder(b"\x45\x02\x81");
	d.advance().unwrap();
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::UnexpectedEndOfInput => {
			assert_eq!(e.context(), ERRCTX_ENTITY);
		}
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn truncated_inline_string_is_unexpected_end() {
	let mut d = decoder(b"\x45\x03abc");
	d.advance().unwrap();
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::UnexpectedEndOfInput => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn end_of_input_inside_element_is_reported_with_position() {
	let mut d = decoder(b"\x45");
	d.advance().unwrap();
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::UnexpectedEndOfInput => {
			assert_eq!(e.context(), ERRCTX_DOCEND);
			let pos = e.position().unwrap();
			assert_eq!(pos.offset, 5);
			assert_eq!(pos.depth, 1);
			assert_eq!(pos.element.as_deref(), Some("root"));
		}
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn document_without_root_element_is_incomplete() {
	let mut d = decoder(b"");
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::UnexpectedEndOfInput => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn end_without_open_element_is_malformed() {
	let mut d = decoder(b"\x01");
	match d.advance() {
		Err(e) if matches!(e.kind(), ErrorKind::MalformedContent(_)) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn invalid_entity_is_rejected() {
	let mut d = decoder(b"\x45\x02\x83\xb0\x00\x01");
	d.advance().unwrap();
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::InvalidChar(0xd800) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn errors_poison_the_decoder() {
	let mut d = decoder(b"\x0a\x05");
	let e1 = d.advance().err().unwrap();
	let e2 = d.advance().err().unwrap();
	let e3 = d.read().err().unwrap();
	assert_eq!(e1, e2);
	assert_eq!(e1, e3);
}

#[test]
fn derived_operations_keep_the_first_error() {
	let mut d = decoder(b"\x0a\x05");
	let e1 = d.advance().err().unwrap();
	assert_eq!(d.next_text().err().unwrap(), e1);
	assert_eq!(d.next_tag().err().unwrap(), e1);
	assert_eq!(d.require(EventType::StartTag, None, None).err().unwrap(), e1);
	assert_eq!(d.advance().err().unwrap(), e1);
}

#[test]
fn io_errors_are_fatal() {
	let src = io::Read::chain(&b"\x03\x01\x6a\x00\x45"[..], FailingReader());
	let mut d = Decoder::new(src, tables()).unwrap();
	d.advance().unwrap();
	let e1 = d.advance().err().unwrap();
	match e1.kind() {
		ErrorKind::Io(ioerr) => assert_eq!(ioerr.kind(), io::ErrorKind::ConnectionReset),
		other => panic!("unexpected error: {:?}", other),
	}
	assert!(std::error::Error::source(&e1).is_some());
	let e2 = d.advance().err().unwrap();
	assert_eq!(e1, e2);
}

#[test]
fn depth_limit_is_enforced() {
	let mut d = decoder_with(b"\x45\x46\x01\x01", DecoderOptions::default().max_depth(1));
	d.advance().unwrap();
	match d.advance() {
		Err(e) if matches!(e.kind(), ErrorKind::LimitExceeded(_)) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn string_length_limit_is_enforced() {
	let mut d = decoder_with(
		b"\x45\x03abcd\x00\x01",
		DecoderOptions::default().max_string_length(3),
	);
	d.advance().unwrap();
	match d.advance() {
		Err(e) if matches!(e.kind(), ErrorKind::LimitExceeded(_)) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn string_length_limit_covers_merged_text() {
	let data = doc(b"xxxxxxxxx\x00", b"\x45\x83\x00\x83\x00\x83\x00\x01");
	let opts = DecoderOptions::default().max_string_length(16);
	let mut d = Decoder::with_options(&data[..], tables(), opts).unwrap();
	d.advance().unwrap();
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::LimitExceeded("text length") => (),
		other => panic!("unexpected result: {:?}", other),
	}

	// each reference on its own is within the limit
	let mut d = Decoder::with_options(&data[..], tables(), opts).unwrap();
	d.advance_raw().unwrap();
	assert_eq!(*d.advance_raw().unwrap(), text("xxxxxxxxx"));
	assert_eq!(*d.advance_raw().unwrap(), text("xxxxxxxxx"));
}

#[test]
fn string_length_limit_covers_attribute_values() {
	let data = doc(b"xxxxxxxxx\x00", b"\x85\x05\x83\x00\x83\x00\x83\x00\x01");
	let opts = DecoderOptions::default().max_string_length(16);
	let mut d = Decoder::with_options(&data[..], tables(), opts).unwrap();
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::LimitExceeded("attribute value length") => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn next_tag_skips_whitespace() {
	let mut d = decoder(b"\x45\x03  \x00\x47\x03Alice\x00\x01\x03\n\x00\x01");
	assert_eq!(*d.next_tag().unwrap(), start("root", false));
	assert_eq!(*d.next_tag().unwrap(), start("name", false));
	assert_eq!(d.next_text().unwrap(), "Alice");
	assert_eq!(d.event_type(), EventType::EndTag);
	assert_eq!(*d.next_tag().unwrap(), end("root"));
}

#[test]
fn next_tag_rejects_text() {
	let mut d = decoder(b"\x45\x03x\x00\x01");
	d.next_tag().unwrap();
	match d.next_tag() {
		Err(e) if matches!(e.kind(), ErrorKind::MalformedContent(_)) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn next_text_of_empty_element() {
	let mut d = decoder(b"\x45\x06\x01");
	d.next_tag().unwrap();
	d.next_tag().unwrap();
	assert_eq!(d.next_text().unwrap(), "");
	d.require(EventType::EndTag, None, Some("item")).unwrap();
}

#[test]
fn next_text_rejects_child_elements() {
	let mut d = decoder(b"\x45\x06\x01");
	d.advance().unwrap();
	match d.next_text() {
		Err(e) if matches!(e.kind(), ErrorKind::MalformedContent(_)) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn require_checks_type_and_name() {
	let mut d = decoder(b"\x05");
	d.advance().unwrap();
	d.require(EventType::StartTag, None, Some("root")).unwrap();
	d.require(EventType::StartTag, Some(""), None).unwrap();
	match d.require(EventType::StartTag, None, Some("item")) {
		Err(e) if matches!(e.kind(), ErrorKind::MalformedContent(_)) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn header_is_exposed() {
	let data = doc(b"-//SYNCML//DTD SyncML 1.2//EN\x00", b"\x05");
	let mut raw = data.clone();
	// public id from the string table, offset 0
	raw[1] = 0x00;
	raw.insert(2, 0x00);
	let d = Decoder::new(&raw[..], tables()).unwrap();
	assert_eq!(d.header().major_version(), 1);
	assert_eq!(d.header().minor_version(), 3);
	assert_eq!(d.header().public_id(), PublicId::StringTable(0));
	assert_eq!(
		d.header().public_id_str().unwrap().as_deref(),
		Some("-//SYNCML//DTD SyncML 1.2//EN")
	);
	assert_eq!(d.header().charset(), Charset::UTF_8);
	assert_eq!(d.event_type(), EventType::StartDocument);
	assert_eq!(d.depth(), 0);
}

#[test]
fn latin1_documents_are_decoded() {
	let data = b"\x03\x01\x04\x00\x45\x03\xe4\x00\x01";
	let mut d = Decoder::new(&data[..], tables()).unwrap();
	d.advance().unwrap();
	assert_eq!(*d.advance().unwrap(), text("\u{e4}"));
}

#[test]
fn invalid_utf8_is_rejected() {
	let mut d = decoder(b"\x45\x03\xc3\x00\x01");
	d.advance().unwrap();
	match d.advance() {
		Err(e) if *e.kind() == ErrorKind::InvalidText => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn header_errors_are_returned_from_constructor() {
	match Decoder::new(&b"\x03\x01"[..], tables()) {
		Err(e) if *e.kind() == ErrorKind::UnexpectedEndOfInput => {
			assert_eq!(e.position().unwrap().offset, 2);
		}
		Err(other) => panic!("unexpected error: {:?}", other),
		Ok(_) => panic!("decoder created from truncated header"),
	}
}

#[cfg(feature = "mt")]
#[test]
fn tables_can_be_shared_across_threads() {
	let t = tables();
	let handles: Vec<_> = (0..4)
		.map(|_| {
			let t = t.clone();
			std::thread::spawn(move || {
				let mut d = Decoder::new(io::Cursor::new(doc(b"", b"\x05")), t).unwrap();
				collect(&mut d).unwrap().len()
			})
		})
		.collect();
	for h in handles {
		assert_eq!(h.join().unwrap(), 3);
	}
}

#[cfg(feature = "async")]
#[test]
fn read_document_loads_async_source() {
	let data = doc(b"", b"\x45\x03hi\x00\x01");
	let mut d = tokio_test::block_on(read_document(&data[..], tables(), DecoderOptions::default())).unwrap();
	assert_eq!(
		collect(&mut d).unwrap(),
		vec![start("root", false), text("hi"), end("root"), Event::EndDocument]
	);
}

#[cfg(feature = "async")]
#[test]
fn read_document_reports_io_errors() {
	let src = tokio_test::io::Builder::new()
		.read(b"\x03\x01")
		.read_error(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
		.build();
	match tokio_test::block_on(read_document(src, tables(), DecoderOptions::default())) {
		Err(e) => match e.kind() {
			ErrorKind::Io(ioerr) => assert_eq!(ioerr.kind(), io::ErrorKind::BrokenPipe),
			other => panic!("unexpected error: {:?}", other),
		},
		Ok(_) => panic!("document loaded from failing source"),
	}
}

#[cfg(feature = "async")]
#[tokio::test]
async fn read_document_waits_for_end_of_stream() {
	use tokio::io::AsyncWriteExt;

	let data = doc(b"", b"\x45\x03chunked\x00\x01");
	let (mut tx, rx) = tokio::io::duplex(4);
	let writer = tokio::spawn(async move {
		tx.write_all(&data).await.unwrap();
	});
	let mut d = read_document(rx, tables(), DecoderOptions::default()).await.unwrap();
	writer.await.unwrap();
	d.next_tag().unwrap();
	assert_eq!(d.next_text().unwrap(), "chunked");
}

#[cfg(feature = "async")]
#[test]
fn read_document_enforces_length_limit() {
	// 10 bytes in total
	let data = doc(b"", b"\x45\x03hi\x00\x01");
	let opts = DecoderOptions::default().max_document_length(9);
	match tokio_test::block_on(read_document(&data[..], tables(), opts)) {
		Err(e) if *e.kind() == ErrorKind::LimitExceeded("document length") => (),
		Err(other) => panic!("unexpected error: {:?}", other),
		Ok(_) => panic!("oversized document loaded"),
	}

	let opts = DecoderOptions::default().max_document_length(10);
	let mut d = tokio_test::block_on(read_document(&data[..], tables(), opts)).unwrap();
	d.next_tag().unwrap();
	assert_eq!(d.next_text().unwrap(), "hi");
}
