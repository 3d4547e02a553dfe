// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;

/// A writable window into the tail of a page, or into a caller-supplied fixed
/// region. Spans carry offsets, not addresses, and own no memory.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Span {
	/// Offset of the next writable byte.
	pub start: usize,
	/// One past the last writable byte.
	pub end: usize,
}

impl Span {
	pub fn new(start: usize, end: usize) -> Self {
		debug_assert!(start <= end);
		Self { start, end }
	}

	/// Returns the remaining writable length, the stream's *runway*.
	pub fn len(&self) -> usize { self.end - self.start }
	/// Returns `true` if the span is exhausted.
	pub fn is_empty(&self) -> bool { self.start == self.end }

	/// Consumes `n` bytes from the front of the window.
	pub fn advance(&mut self, n: usize) {
		debug_assert!(n <= self.len());
		self.start += n;
	}
}

/// A fixed-size contiguous byte region carrying a live sub-range
/// `[start, end)`. Owned by [`PageBuffers`].
pub(crate) struct Page {
	pub data: Vec<u8>,
	/// Offset of the first live byte.
	pub start: usize,
	/// One past the last live byte. Stale on the last page while the stream's
	/// span is ahead of it; resynced by [`PageBuffers::end_last_page_at`].
	pub end: usize,
	/// Bytes at the front of `data` reserved by a cursor that began on the
	/// previous page. Claimed (reset to zero) when the cursor crosses over.
	pub reserved_prefix: usize,
}

impl Page {
	fn new(size: usize) -> Self {
		Self {
			data: vec![0; size],
			start: 0,
			end: 0,
			reserved_prefix: 0,
		}
	}

	/// Returns the size of the backing region.
	pub fn capacity(&self) -> usize { self.data.len() }
	/// Returns the length of the live region.
	pub fn len(&self) -> usize { self.end - self.start }
	/// Returns the live region.
	pub fn live(&self) -> &[u8] { &self.data[self.start..self.end] }

	fn reset(&mut self) {
		self.start = 0;
		self.end = 0;
		self.reserved_prefix = 0;
	}
}

/// An ordered queue of [`Page`]s whose live regions, read front-to-back, form
/// the logical byte stream. All pages but the last have a final `end`.
pub(crate) struct PageBuffers {
	pages: VecDeque<Page>,
	page_size: usize,
	/// Set once the writing side of a pipe has closed. Unused outside pipes.
	pub eof: bool,
}

impl PageBuffers {
	pub fn new(page_size: usize) -> Self {
		assert!(page_size > 0, "page size must be positive");
		Self {
			pages: VecDeque::new(),
			page_size,
			eof: false,
		}
	}

	pub fn page_size(&self) -> usize { self.page_size }
	pub fn page_count(&self) -> usize { self.pages.len() }

	/// Returns the total number of live bytes across all pages. Callers must
	/// sync the last page first if a span is ahead of its `end`.
	pub fn count(&self) -> usize {
		self.pages.iter().map(Page::len).sum()
	}

	pub fn index_of_last(&self) -> Option<usize> {
		self.pages.len().checked_sub(1)
	}

	pub fn page_mut(&mut self, index: usize) -> &mut Page {
		&mut self.pages[index]
	}

	/// Appends a new page at least `size` bytes long, its full region
	/// writable, and returns that window. `size` is rounded up to the
	/// configured page size.
	pub fn add_writable_page(&mut self, size: usize) -> Span {
		let size = size.max(self.page_size);
		self.pages.push_back(Page::new(size));
		Span::new(0, size)
	}

	/// Returns the remaining window of the last page, or a fresh page's full
	/// window if the queue is empty or the last page is exhausted.
	pub fn writable_span(&mut self) -> Span {
		match self.pages.back() {
			Some(page) if page.end < page.capacity() => {
				Span::new(page.end, page.capacity())
			}
			_ => self.add_writable_page(self.page_size),
		}
	}

	/// Guarantees a trailing writable window of at least `extra` bytes.
	/// Only valid before any byte has been written; the stream enforces that.
	pub fn ensure_runway(&mut self, extra: usize) -> Span {
		if let Some(page) = self.pages.back() {
			debug_assert_eq!(page.len(), 0);
			if page.capacity() >= extra {
				return Span::new(0, page.capacity());
			}
			self.pages.pop_back();
		}
		self.add_writable_page(extra)
	}

	/// Seals the last page's live region at `offset`. Idempotent when
	/// `offset` equals the current end; a no-op on an empty queue.
	pub fn end_last_page_at(&mut self, offset: usize) {
		if let Some(page) = self.pages.back_mut() {
			debug_assert!(page.end <= offset && offset <= page.capacity());
			page.end = offset;
		}
	}

	/// Seals the last page at `offset` and begins a new page for whatever
	/// follows, so the sealed tail can later shrink without leaving a gap
	/// between neighbors. Returns the new page's window.
	pub fn split_last_page_at(&mut self, offset: usize) -> Span {
		self.end_last_page_at(offset);
		self.add_writable_page(self.page_size)
	}

	/// Pops the front page. Used when draining.
	pub fn pop_front_page(&mut self) -> Option<Page> {
		let page = self.pages.pop_front();
		debug_assert!(page.as_ref().map_or(true, |p| p.reserved_prefix == 0));
		page
	}

	/// Returns a drained page to the back of the queue for reuse.
	pub fn recycle(&mut self, mut page: Page) -> Span {
		page.reset();
		let span = Span::new(0, page.capacity());
		self.pages.push_back(page);
		span
	}

	/// Invokes `f` with each page's live region front-to-back, dropping the
	/// pages as it goes. Leaves the queue empty.
	pub fn consume_all_pages(&mut self, mut f: impl FnMut(&[u8])) {
		while let Some(page) = self.pop_front_page() {
			if page.len() > 0 {
				f(page.live());
			}
		}
	}

	/// Appends `bytes` through the trailing writable capacity, claiming new
	/// pages as needed. Pipe-side helper; never sees reservations.
	pub fn push_slice(&mut self, mut bytes: &[u8]) {
		while !bytes.is_empty() {
			let span = self.writable_span();
			let n = bytes.len().min(span.len());
			let page = self.pages.back_mut().expect("writable span implies a page");
			page.data[span.start..span.start + n].copy_from_slice(&bytes[..n]);
			page.end = span.start + n;
			bytes = &bytes[n..];
		}
	}

	/// Moves up to `dst.len()` bytes from the front pages into `dst`,
	/// returning the number moved. Pipe-side consuming read.
	pub fn consume_into(&mut self, dst: &mut [u8]) -> usize {
		let mut read = 0;
		while read < dst.len() {
			let Some(page) = self.pages.front_mut() else { break };
			let n = (dst.len() - read).min(page.len());
			dst[read..read + n].copy_from_slice(&page.data[page.start..page.start + n]);
			page.start += n;
			read += n;
			if page.len() == 0 {
				self.pages.pop_front();
			}
		}
		read
	}

	/// Takes the single page's backing wholesale. Only valid when one page
	/// holds the whole stream from its front; the caller checks that.
	pub fn detach_single_page(&mut self) -> Option<Vec<u8>> {
		if self.pages.len() != 1 {
			return None;
		}
		let page = &self.pages[0];
		if page.start != 0 || page.reserved_prefix != 0 {
			return None;
		}
		let mut page = self.pages.pop_front().expect("checked non-empty");
		let mut data = std::mem::take(&mut page.data);
		data.truncate(page.end);
		Some(data)
	}
}

#[cfg(test)]
mod test {
	use quickcheck::{Arbitrary, Gen};
	use quickcheck_macros::quickcheck;
	use super::PageBuffers;

	/// A write script of arbitrary chunk sizes against a small page size, so
	/// page boundaries are crossed often.
	#[derive(Clone, Debug)]
	struct Script {
		chunks: Vec<Vec<u8>>,
	}

	impl Arbitrary for Script {
		fn arbitrary(g: &mut Gen) -> Self {
			let count = usize::arbitrary(g) % 12;
			let chunks = (0..count)
				.map(|i| {
					let len = usize::arbitrary(g) % 40;
					(0..len).map(|j| (i * 31 + j) as u8).collect()
				})
				.collect();
			Self { chunks }
		}
	}

	#[quickcheck]
	fn push_then_consume_preserves_bytes(script: Script) {
		let mut buffers = PageBuffers::new(16);
		let mut expected = Vec::new();
		for chunk in &script.chunks {
			buffers.push_slice(chunk);
			expected.extend_from_slice(chunk);
		}
		assert_eq!(buffers.count(), expected.len());

		let mut read = Vec::new();
		let mut dst = [0; 7];
		loop {
			let n = buffers.consume_into(&mut dst);
			if n == 0 { break }
			read.extend_from_slice(&dst[..n]);
		}
		assert_eq!(read, expected);
		assert_eq!(buffers.count(), 0);
	}

	#[quickcheck]
	fn consume_all_pages_in_order(script: Script) {
		let mut buffers = PageBuffers::new(16);
		let mut expected = Vec::new();
		for chunk in &script.chunks {
			buffers.push_slice(chunk);
			expected.extend_from_slice(chunk);
		}

		let mut read = Vec::new();
		buffers.consume_all_pages(|live| read.extend_from_slice(live));
		assert_eq!(read, expected);
		assert_eq!(buffers.page_count(), 0);
	}

	#[test]
	fn page_sizes_round_up() {
		let mut buffers = PageBuffers::new(64);
		let span = buffers.add_writable_page(1);
		assert_eq!(span.len(), 64);
		let span = buffers.add_writable_page(100);
		assert_eq!(span.len(), 100);
	}

	#[test]
	fn split_pages_stay_contiguous() {
		let mut buffers = PageBuffers::new(16);
		buffers.push_slice(b"abcd");
		// Two reserved bytes at the sealed tail, back-filled afterwards.
		let span = buffers.split_last_page_at(6);
		buffers.page_mut(0).data[4..6].copy_from_slice(b"ef");
		let page = buffers.page_mut(1);
		page.data[span.start..span.start + 2].copy_from_slice(b"gh");
		page.end = span.start + 2;

		let mut read = Vec::new();
		buffers.consume_all_pages(|live| read.extend_from_slice(live));
		assert_eq!(read, b"abcdefgh");
	}

	#[test]
	fn detach_requires_a_lone_front_page() {
		let mut buffers = PageBuffers::new(8);
		buffers.push_slice(b"12345678");
		buffers.push_slice(b"9");
		assert!(buffers.detach_single_page().is_none());

		let mut buffers = PageBuffers::new(8);
		buffers.push_slice(b"1234");
		assert_eq!(buffers.detach_single_page().unwrap(), b"1234");
		assert_eq!(buffers.page_count(), 0);
	}
}
