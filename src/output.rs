// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::future::poll_fn;
use std::io;
use std::path::Path;
use std::task::Poll;
use num_traits::PrimInt;
use crate::page::{PageBuffers, Span};
use crate::sink::FileSink;
use crate::error::ResultExt;
use crate::StreamContext::{Close, Drain, Flush, Write};
use crate::{Result, Sink, DEFAULT_PAGE_SIZE};

/// Options for tuning an [`OutputStream`]'s paging.
///
/// # Page size
///
/// The minimum size of newly allocated pages, [`DEFAULT_PAGE_SIZE`] unless
/// set. Individual writes and reservations may still claim larger pages; the
/// page size is a floor, not a ceiling.
#[derive(Copy, Clone, Debug)]
#[non_exhaustive]
pub struct StreamOptions {
	pub page_size: usize,
}

impl Default for StreamOptions {
	fn default() -> Self {
		Self { page_size: DEFAULT_PAGE_SIZE }
	}
}

impl StreamOptions {
	/// Returns the minimum page size.
	pub fn page_size(&self) -> usize { self.page_size }

	/// Sets the minimum page size.
	pub fn set_page_size(mut self, value: usize) -> Self {
		assert!(value > 0, "page size must be positive");
		self.page_size = value;
		self
	}
}

/// Whether [`close_async`](OutputStream::close_async) waits for the sink's
/// asynchronous close to complete.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CloseBehaviour {
	/// Block the current task until the close completes, surfacing its error.
	#[default]
	Wait,
	/// Fire and forget: a pending or failed close is reported through the
	/// `log` facade instead of the return value.
	DontWait,
}

pub(crate) enum Backing<'d> {
	/// Pages owned by the stream.
	Paged(PageBuffers),
	/// A caller-supplied region the stream cannot grow.
	Fixed(&'d mut [u8]),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum State {
	Open,
	/// A sink operation failed; close is the only valid operation left.
	Failed,
	Closed,
}

/// A forward-only byte stream writing through a span into paged memory, a
/// caller-supplied fixed region, or a sink-backed page queue.
///
/// The cursor only moves forward; the sole way to touch bytes behind it is a
/// reservation made through [`reserve_fixed`] or [`reserve_var`] when the
/// bytes' position is reached. `pos` always equals the total bytes written,
/// reservations included.
///
/// Dropping the stream closes it. Errors found during that implicit close are
/// discarded; call [`close`] (or [`close_async`]) to observe them.
///
/// [`reserve_fixed`]: OutputStream::reserve_fixed
/// [`reserve_var`]: OutputStream::reserve_var
/// [`close`]: OutputStream::close
/// [`close_async`]: OutputStream::close_async
pub struct OutputStream<'d> {
	pub(crate) backing: Backing<'d>,
	pub(crate) span: Span,
	/// Absolute stream position of `span.end`.
	pub(crate) span_end_pos: usize,
	pub(crate) sink: Option<Box<dyn Sink>>,
	/// Count of outstanding reservations. Draining is suppressed and
	/// flush/extraction are defects while non-zero.
	pub(crate) cursors: usize,
	pub(crate) state: State,
}

impl OutputStream<'static> {
	/// Creates a stream that buffers everything in memory until
	/// [`take_output`](Self::take_output).
	pub fn memory() -> Self {
		Self::memory_with(StreamOptions::default())
	}

	/// Creates a memory stream with the given options.
	pub fn memory_with(options: StreamOptions) -> Self {
		Self {
			backing: Backing::Paged(PageBuffers::new(options.page_size)),
			span: Span::default(),
			span_end_pos: 0,
			sink: None,
			cursors: 0,
			state: State::Open,
		}
	}

	/// Creates a stream draining completed pages into `sink`.
	pub fn with_sink(sink: impl Sink + 'static, options: StreamOptions) -> Self {
		let mut stream = Self::memory_with(options);
		stream.sink = Some(Box::new(sink));
		// Sink-backed streams start with one page on hand, so the span is
		// never empty between drains.
		let Backing::Paged(buffers) = &mut stream.backing else { unreachable!() };
		let span = buffers.writable_span();
		stream.set_span(span);
		stream
	}

	/// Creates a stream writing to the file at `path`, truncating an existing
	/// one.
	pub fn file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
		Ok(Self::with_sink(FileSink::create(path)?, StreamOptions::default()))
	}
}

impl<'d> OutputStream<'d> {
	/// Creates a stream writing into a caller-supplied fixed region. The
	/// stream cannot grow it: writing past its end is a defect, as is any
	/// variable-size reservation or output extraction.
	pub fn fixed(region: &'d mut [u8]) -> Self {
		let len = region.len();
		Self {
			backing: Backing::Fixed(region),
			span: Span::new(0, len),
			span_end_pos: len,
			sink: None,
			cursors: 0,
			state: State::Open,
		}
	}

	/// Returns the total number of bytes written, reservations included.
	pub fn pos(&self) -> usize {
		self.span_end_pos - self.span.len()
	}

	/// Returns the remaining writable bytes in the current span.
	pub fn runway(&self) -> usize {
		self.span.len()
	}

	/// Returns the number of unfinalized reservations.
	pub fn reservation_count(&self) -> usize {
		self.cursors
	}

	/// Guarantees the stream can take `extra` bytes without claiming another
	/// page. Only valid immediately after construction.
	///
	/// # Panics
	///
	/// Panics once any byte has been written, or on a fixed-region stream
	/// smaller than `extra`.
	pub fn ensure_runway(&mut self, extra: usize) {
		self.check_writable();
		assert_eq!(self.pos(), 0, "runway can only be ensured before the first write");
		match &mut self.backing {
			Backing::Fixed(region) => {
				assert!(region.len() >= extra, "fixed region smaller than the requested runway");
			}
			Backing::Paged(buffers) => {
				if self.span.len() < extra {
					self.span_end_pos -= self.span.len();
					self.span.end = self.span.start;
					let span = buffers.ensure_runway(extra);
					self.span = span;
					self.span_end_pos += span.len();
				}
			}
		}
	}

	/// Writes a single byte.
	pub fn write_u8(&mut self, value: u8) -> Result {
		self.check_writable();
		if self.span.is_empty() {
			self.grow(1)?;
		}
		self.span_bytes_mut(1)[0] = value;
		self.span.advance(1);
		Ok(())
	}

	/// Writes a whole slice.
	///
	/// Blocks that outgrow the current span either claim a page large enough
	/// for the remainder or, when the stream is drainable, are handed to the
	/// sink directly together with the pending pages, skipping the copy.
	pub fn write_slice(&mut self, bytes: &[u8]) -> Result {
		self.check_writable();
		if bytes.len() <= self.span.len() {
			if !bytes.is_empty() {
				self.span_bytes_mut(bytes.len()).copy_from_slice(bytes);
				self.span.advance(bytes.len());
			}
			return Ok(());
		}
		if matches!(self.backing, Backing::Fixed(_)) {
			panic!(
				"write of {} bytes exceeds the remaining fixed capacity of {}",
				bytes.len(), self.span.len(),
			);
		}
		if self.sync_drainable() {
			return self.drain_sync(Some(bytes)).context(Write);
		}

		// Fill the current span, then put the remainder in one page; the
		// claim rounds up to the page size, so the remainder always fits.
		let (head, rest) = bytes.split_at(self.span.len());
		if !head.is_empty() {
			self.span_bytes_mut(head.len()).copy_from_slice(head);
			self.span.advance(head.len());
		}
		let Backing::Paged(buffers) = &mut self.backing else { unreachable!() };
		buffers.end_last_page_at(self.span.start);
		let span = buffers.add_writable_page(rest.len());
		self.set_span(span);
		self.span_bytes_mut(rest.len()).copy_from_slice(rest);
		self.span.advance(rest.len());
		Ok(())
	}

	/// Writes a UTF-8 string.
	#[inline]
	pub fn write_utf8(&mut self, value: &str) -> Result {
		self.write_slice(value.as_bytes())
	}

	/// Writes a big-endian [`u16`].
	#[inline]
	pub fn write_u16(&mut self, value: u16) -> Result { self.write_int(value) }

	/// Writes a little-endian [`u16`].
	#[inline]
	pub fn write_u16_le(&mut self, value: u16) -> Result { self.write_int_le(value) }

	/// Writes a big-endian [`u32`].
	#[inline]
	pub fn write_u32(&mut self, value: u32) -> Result { self.write_int(value) }

	/// Writes a little-endian [`u32`].
	#[inline]
	pub fn write_u32_le(&mut self, value: u32) -> Result { self.write_int_le(value) }

	/// Writes a big-endian [`u64`].
	#[inline]
	pub fn write_u64(&mut self, value: u64) -> Result { self.write_int(value) }

	/// Writes a little-endian [`u64`].
	#[inline]
	pub fn write_u64_le(&mut self, value: u64) -> Result { self.write_int_le(value) }

	/// Writes a big-endian [`usize`]. To make streams consistent across
	/// platforms, [`usize`] is fixed to the size of [`u64`].
	#[inline]
	pub fn write_usize(&mut self, value: usize) -> Result {
		self.write_u64(value as u64)
	}

	/// Writes a little-endian [`usize`]. To make streams consistent across
	/// platforms, [`usize`] is fixed to the size of [`u64`].
	#[inline]
	pub fn write_usize_le(&mut self, value: usize) -> Result {
		self.write_u64_le(value as u64)
	}

	/// Writes a big-endian integer.
	#[inline]
	pub fn write_int<T: PrimInt + bytemuck::Pod>(&mut self, value: T) -> Result {
		self.write_pod(value.to_be())
	}

	/// Writes a little-endian integer.
	#[inline]
	pub fn write_int_le<T: PrimInt + bytemuck::Pod>(&mut self, value: T) -> Result {
		self.write_pod(value.to_le())
	}

	/// Writes the raw bytes of an arbitrary [`Pod`] value.
	///
	/// [`Pod`]: bytemuck::Pod
	#[inline]
	pub fn write_pod<T: bytemuck::Pod>(&mut self, value: T) -> Result {
		self.write_slice(bytemuck::bytes_of(&value))
	}

	/// Drains pending pages and invokes the sink's flush slot.
	///
	/// Idempotent when nothing was written in between. A no-op on memory
	/// streams.
	///
	/// # Panics
	///
	/// Panics while reservations are outstanding, or when the sink only has
	/// an asynchronous half; use [`flush_async`](Self::flush_async) there.
	pub fn flush(&mut self) -> Result {
		self.check_writable();
		assert_eq!(self.cursors, 0, "flush with outstanding reservations");
		match self.sink.as_deref() {
			None => return Ok(()),
			Some(sink) => assert!(
				sink.is_sync(),
				"synchronous flush on an asynchronous sink; use flush_async",
			),
		}
		self.drain_sync(None).context(Flush)?;
		let sink = self.sink.as_deref_mut().expect("sink checked above");
		let result = sink.flush().context(Flush);
		if result.is_err() {
			self.state = State::Failed;
		}
		result
	}

	/// Asynchronous flavor of [`flush`](Self::flush): drains through the
	/// sink's asynchronous slots when present, falling back to the
	/// synchronous ones. Suspends only inside the sink.
	pub async fn flush_async(&mut self) -> Result {
		self.check_writable();
		assert_eq!(self.cursors, 0, "flush with outstanding reservations");
		if self.sink.is_none() {
			return Ok(());
		}
		self.drain_async(None).await.context(Flush)?;
		let sink = self.sink.as_deref_mut().expect("sink checked above");
		let result = if sink.is_async() {
			poll_fn(|cx| sink.poll_flush(cx)).await.context(Flush)
		} else {
			sink.flush().context(Flush)
		};
		if result.is_err() {
			self.state = State::Failed;
		}
		result
	}

	/// Takes the buffered output as one contiguous byte sequence, leaving the
	/// stream pristine for further writes (`pos` restarts at zero). When the
	/// whole stream sits in a single page, its backing is detached without
	/// copying.
	///
	/// # Panics
	///
	/// Panics on fixed-region or sink-backed streams, or while reservations
	/// are outstanding.
	pub fn take_output(&mut self) -> Vec<u8> {
		self.begin_extraction();
		let pos = self.pos();
		let Backing::Paged(buffers) = &mut self.backing else { unreachable!() };
		let out = match buffers.detach_single_page() {
			Some(data) => data,
			None => {
				let mut out = Vec::with_capacity(pos);
				buffers.consume_all_pages(|live| out.extend_from_slice(live));
				out
			}
		};
		debug_assert_eq!(out.len(), pos);
		self.reset_after_extraction();
		out
	}

	/// Yields each buffered page's live region in stream order without
	/// allocating, then leaves the stream pristine like
	/// [`take_output`](Self::take_output).
	///
	/// # Panics
	///
	/// Panics on fixed-region or sink-backed streams, or while reservations
	/// are outstanding.
	pub fn consume_outputs(&mut self, f: impl FnMut(&[u8])) {
		self.begin_extraction();
		let Backing::Paged(buffers) = &mut self.backing else { unreachable!() };
		buffers.consume_all_pages(f);
		self.reset_after_extraction();
	}

	/// Drains remaining pages, closes the sink's synchronous slot and
	/// releases it. Idempotent; called implicitly on drop.
	///
	/// Buffered bytes that can only drain asynchronously are dropped with a
	/// warning; use [`close_async`](Self::close_async) for those streams.
	pub fn close(&mut self) -> Result {
		if self.state == State::Closed {
			return Ok(());
		}
		let failed = self.state == State::Failed;
		let mut drain = Ok(());
		if self.sink.is_some() && !failed {
			if self.cursors > 0 {
				log::warn!("stream closed with {} unfinalized reservations; buffered bytes dropped", self.cursors);
			} else if self.sync_drainable() {
				drain = self.drain_sync(None).context(Close);
			} else {
				self.seal_span();
				let Backing::Paged(buffers) = &self.backing else { unreachable!() };
				if buffers.count() > 0 {
					log::warn!("synchronous close of an asynchronous stream drops buffered bytes; use close_async");
				}
			}
		}
		self.state = State::Closed;
		let close = match self.sink.take() {
			Some(mut sink) => sink.close().context(Close),
			None => Ok(()),
		};
		drain?;
		close
	}

	/// Asynchronous flavor of [`close`](Self::close): drains remaining pages
	/// through the best available slots, then closes the sink. With
	/// [`CloseBehaviour::DontWait`] the sink's asynchronous close is polled
	/// once and abandoned; whatever it reports goes to the `log` facade.
	pub async fn close_async(&mut self, behaviour: CloseBehaviour) -> Result {
		if self.state == State::Closed {
			return Ok(());
		}
		let failed = self.state == State::Failed;
		let mut drain = Ok(());
		if self.sink.is_some() && !failed {
			if self.cursors > 0 {
				log::warn!("stream closed with {} unfinalized reservations; buffered bytes dropped", self.cursors);
			} else {
				drain = self.drain_async(None).await.context(Close);
			}
		}
		self.state = State::Closed;
		let close = match self.sink.take() {
			Some(mut sink) if sink.is_async() => match behaviour {
				CloseBehaviour::Wait => {
					poll_fn(|cx| sink.poll_close(cx)).await.context(Close)
				}
				CloseBehaviour::DontWait => {
					poll_fn(|cx| {
						match sink.poll_close(cx) {
							Poll::Ready(Ok(())) => {}
							Poll::Ready(Err(err)) => {
								log::warn!("unreported error from fire-and-forget close: {err}");
							}
							Poll::Pending => {
								log::warn!("asynchronous close abandoned while pending");
							}
						}
						Poll::Ready(())
					})
					.await;
					Ok(())
				}
			},
			Some(mut sink) => sink.close().context(Close),
			None => Ok(()),
		};
		drain?;
		close
	}

	pub(crate) fn check_writable(&self) {
		match self.state {
			State::Open => {}
			State::Failed => panic!("stream failed; close is the only valid operation"),
			State::Closed => panic!("operation on a closed stream"),
		}
	}

	/// Returns a writable view of the first `n` bytes of the current span.
	pub(crate) fn span_bytes_mut(&mut self, n: usize) -> &mut [u8] {
		debug_assert!(n <= self.span.len());
		let start = self.span.start;
		match &mut self.backing {
			Backing::Paged(buffers) => {
				let index = buffers.index_of_last().expect("a non-empty span implies a page");
				&mut buffers.page_mut(index).data[start..start + n]
			}
			Backing::Fixed(region) => &mut region[start..start + n],
		}
	}

	/// Replaces an exhausted span with a fresh window; `pos` is unchanged.
	pub(crate) fn set_span(&mut self, span: Span) {
		debug_assert!(self.span.is_empty());
		self.span_end_pos += span.len();
		self.span = span;
	}

	/// Gives the unused tail of the current span back and syncs the last
	/// page's live region, ahead of any whole-page operation.
	fn seal_span(&mut self) {
		self.span_end_pos -= self.span.len();
		self.span.end = self.span.start;
		if let Backing::Paged(buffers) = &mut self.backing {
			buffers.end_last_page_at(self.span.start);
		}
	}

	fn sync_drainable(&self) -> bool {
		self.cursors == 0 && self.sink.as_deref().map_or(false, |sink| sink.is_sync())
	}

	/// Makes the span non-empty: drains into the sink when possible, else
	/// claims a page of at least `min` bytes.
	fn grow(&mut self, min: usize) -> Result {
		debug_assert!(self.span.is_empty());
		if matches!(self.backing, Backing::Fixed(_)) {
			panic!("write past the end of a fixed-capacity stream");
		}
		if self.sync_drainable() {
			self.drain_sync(None).context(Write)?;
		}
		if self.span.is_empty() {
			let Backing::Paged(buffers) = &mut self.backing else { unreachable!() };
			buffers.end_last_page_at(self.span.start);
			let span = buffers.add_writable_page(min);
			self.set_span(span);
		}
		Ok(())
	}

	/// Seals the current span, writes every completed page to the sink, then
	/// `extra` (bytes too large to be worth paging), and re-spans from a
	/// recycled page.
	fn drain_sync(&mut self, extra: Option<&[u8]>) -> Result {
		debug_assert_eq!(self.cursors, 0);
		self.seal_span();
		let result = self.drain_sync_inner(extra);
		if result.is_err() {
			self.state = State::Failed;
		}
		result
	}

	fn drain_sync_inner(&mut self, extra: Option<&[u8]>) -> Result {
		let Self { backing, sink, span, span_end_pos, .. } = self;
		let (Backing::Paged(buffers), Some(sink)) = (backing, sink.as_deref_mut()) else {
			unreachable!("drain requires pages and a sink")
		};
		let mut drained = 0;
		let mut recycled = None;
		while let Some(page) = buffers.pop_front_page() {
			if page.len() > 0 {
				sink.write(page.live()).context(Drain)?;
				drained += page.len();
			}
			recycled = Some(page);
		}
		if let Some(extra) = extra {
			sink.write(extra).context(Drain)?;
			*span_end_pos += extra.len();
			drained += extra.len();
		}
		log::debug!("drained {drained} bytes to sink");
		let fresh = match recycled {
			Some(page) => buffers.recycle(page),
			None => buffers.writable_span(),
		};
		debug_assert!(span.is_empty());
		*span_end_pos += fresh.len();
		*span = fresh;
		Ok(())
	}

	/// Asynchronous mirror of [`drain_sync`](Self::drain_sync), awaiting each
	/// sink write. Falls back to the synchronous slots when the sink has no
	/// asynchronous half.
	async fn drain_async(&mut self, extra: Option<&[u8]>) -> Result {
		debug_assert_eq!(self.cursors, 0);
		self.seal_span();
		let result = self.drain_async_inner(extra).await;
		if result.is_err() {
			self.state = State::Failed;
		}
		result
	}

	async fn drain_async_inner(&mut self, extra: Option<&[u8]>) -> Result {
		let Self { backing, sink, span, span_end_pos, .. } = self;
		let (Backing::Paged(buffers), Some(sink)) = (backing, sink.as_deref_mut()) else {
			unreachable!("drain requires pages and a sink")
		};
		let asynchronous = sink.is_async();
		let mut drained = 0;
		let mut recycled = None;
		while let Some(page) = buffers.pop_front_page() {
			if page.len() > 0 {
				if asynchronous {
					poll_fn(|cx| sink.poll_write(cx, page.live())).await.context(Drain)?;
				} else {
					sink.write(page.live()).context(Drain)?;
				}
				drained += page.len();
			}
			recycled = Some(page);
		}
		if let Some(extra) = extra {
			if asynchronous {
				poll_fn(|cx| sink.poll_write(cx, extra)).await.context(Drain)?;
			} else {
				sink.write(extra).context(Drain)?;
			}
			*span_end_pos += extra.len();
			drained += extra.len();
		}
		log::debug!("drained {drained} bytes to sink");
		let fresh = match recycled {
			Some(page) => buffers.recycle(page),
			None => buffers.writable_span(),
		};
		debug_assert!(span.is_empty());
		*span_end_pos += fresh.len();
		*span = fresh;
		Ok(())
	}

	fn begin_extraction(&mut self) {
		self.check_writable();
		assert_eq!(self.cursors, 0, "output extraction with outstanding reservations");
		assert!(self.sink.is_none(), "output extraction requires a sink-less memory stream");
		assert!(
			matches!(self.backing, Backing::Paged(_)),
			"output extraction requires a stream that owns its pages",
		);
		self.seal_span();
	}

	fn reset_after_extraction(&mut self) {
		self.span = Span::default();
		self.span_end_pos = 0;
	}
}

impl fmt::Debug for OutputStream<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let pages = match &self.backing {
			Backing::Paged(buffers) => buffers.page_count(),
			Backing::Fixed(_) => 0,
		};
		f.debug_struct("OutputStream")
			.field("pos", &self.pos())
			.field("runway", &self.runway())
			.field("pages", &pages)
			.field("reservations", &self.cursors)
			.field("state", &self.state)
			.finish_non_exhaustive()
	}
}

impl Drop for OutputStream<'_> {
	fn drop(&mut self) {
		let _ = self.close();
	}
}

#[cfg(test)]
mod test {
	use quickcheck::{Arbitrary, Gen};
	use quickcheck_macros::quickcheck;
	use crate::{OutputStream, StreamOptions};

	/// A script mixing plain writes with fixed and variable reservations,
	/// against a deliberately tiny page size so everything straddles.
	#[derive(Clone, Debug)]
	enum Op {
		Write(Vec<u8>),
		ReserveFixed(Vec<u8>),
		ReserveVar { max: usize, actual: Vec<u8> },
	}

	impl Arbitrary for Op {
		fn arbitrary(g: &mut Gen) -> Self {
			let len = 1 + usize::arbitrary(g) % 48;
			let fill = u8::arbitrary(g);
			let bytes = vec![fill; len];
			match u8::arbitrary(g) % 4 {
				0 => Self::ReserveFixed(bytes),
				1 => {
					let slack = usize::arbitrary(g) % 16;
					Self::ReserveVar { max: len + slack, actual: bytes }
				}
				_ => Self::Write(bytes),
			}
		}
	}

	#[quickcheck]
	fn scripted_writes_match_reference(script: Vec<Op>, rotation: usize) {
		let mut out = OutputStream::memory_with(StreamOptions::default().set_page_size(32));
		let mut reference = Vec::new();
		let mut fixed = Vec::new();
		let mut var = Vec::new();
		// Until its finalization, a var reservation counts at its upper bound.
		let mut expected_pos = 0;

		for op in &script {
			match op {
				Op::Write(bytes) => {
					out.write_slice(bytes).unwrap();
					reference.extend_from_slice(bytes);
					expected_pos += bytes.len();
				}
				Op::ReserveFixed(bytes) => {
					fixed.push((out.reserve_fixed(bytes.len()), bytes));
					reference.extend_from_slice(bytes);
					expected_pos += bytes.len();
				}
				Op::ReserveVar { max, actual } => {
					var.push((out.reserve_var(*max), actual));
					reference.extend_from_slice(actual);
					expected_pos += max;
				}
			}
			assert_eq!(out.pos(), expected_pos, "pos after {op:?}");
		}

		// Finalization order must not matter.
		if !fixed.is_empty() {
			let fixed_len = fixed.len();
			fixed.rotate_left(rotation % fixed_len);
		}
		for (cursor, bytes) in fixed {
			cursor.final_write(&mut out, bytes);
		}
		for (cursor, bytes) in var {
			cursor.final_write(&mut out, bytes);
		}

		// Var overestimates are given back once finalized.
		assert_eq!(out.pos(), reference.len());
		assert_eq!(out.take_output(), reference);
	}

	#[quickcheck]
	fn extraction_resets_the_stream(chunks: Vec<Vec<u8>>) {
		let mut out = OutputStream::memory_with(StreamOptions::default().set_page_size(32));
		let mut reference = Vec::new();
		for chunk in &chunks {
			out.write_slice(chunk).unwrap();
			reference.extend_from_slice(chunk);
		}
		assert_eq!(out.take_output(), reference);
		assert_eq!(out.pos(), 0);

		out.write_slice(b"after").unwrap();
		assert_eq!(out.take_output(), b"after");
	}
}
