/*!
# Loading documents from tokio sources

WBXML documents are small and self-delimited only by the end of their
transport, so they are loaded completely before decoding. Decoding itself
then runs synchronously on the in-memory buffer.
*/
use std::io;

use bytes::Bytes;
use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::parser::{Decoder, DecoderOptions, RcPtr};
use crate::tables::SymbolTables;
use crate::{ErrorKind, Result};

/// Read a document from `src` until its end and create a [`Decoder`] for
/// it.
///
/// The header is decoded right away, so header errors are returned from
/// here. I/O errors from `src` are returned as
/// [`ErrorKind::Io`](crate::ErrorKind::Io). Documents longer than
/// [`DecoderOptions::max_document_length`] fail with
/// [`ErrorKind::LimitExceeded`] without reading past the limit.
///
/// # Example
///
/// ```
/// use rwbxml::{read_document, DecoderOptions, EventType, RcPtr, SymbolTables};
/// # tokio_test::block_on(async {
/// let tables = RcPtr::new(SymbolTables::new().with_tags(0, &["ping"]));
/// let src = &b"\x03\x01\x6a\x00\x05"[..];
/// let mut decoder = read_document(src, tables, DecoderOptions::default()).await.unwrap();
/// assert_eq!(decoder.advance().unwrap().event_type(), EventType::StartTag);
/// assert!(decoder.is_empty_element());
/// # })
/// ```
pub async fn read_document<T>(
	src: T,
	tables: RcPtr<SymbolTables>,
	options: DecoderOptions,
) -> Result<Decoder<io::Cursor<Bytes>>>
where
	T: AsyncRead + Unpin,
{
	let limit = options.max_document_length;
	let mut buf = Vec::new();
	// the extra byte flags oversized documents
	src.take((limit as u64).saturating_add(1))
		.read_to_end(&mut buf)
		.await?;
	if buf.len() > limit {
		debug!("WBXML document exceeds {} bytes", limit);
		return Err(ErrorKind::LimitExceeded("document length").into());
	}
	debug!("loaded WBXML document of {} bytes", buf.len());
	Decoder::with_options(io::Cursor::new(Bytes::from(buf)), tables, options)
}
