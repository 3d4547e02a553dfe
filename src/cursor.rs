// SPDX-License-Identifier: Apache-2.0

use crate::output::{Backing, OutputStream};

/// Where a reservation's bytes live.
#[derive(Copy, Clone, Debug)]
enum Place {
	/// Inside the page at this queue index. Queue indices are stable for the
	/// cursor's lifetime: pages are only appended, never dropped, while a
	/// reservation is outstanding.
	Page(usize),
	/// Inside the stream's fixed region.
	Fixed,
}

/// Which end of its page a variable-size reservation occupies.
#[derive(Copy, Clone, Debug)]
enum Placement {
	Tail,
	Head,
}

/// A fixed-size reservation: a window carved out of the stream to be
/// back-filled exactly once, after any amount of further writing.
///
/// The window may straddle one page boundary. Back-fill it incrementally with
/// [`write`] and close it with [`finalize`], or do both at once with
/// [`final_write`]. Every method takes the stream the reservation was made
/// on; using a different stream is a logic error the cursor cannot detect.
///
/// [`write`]: WriteCursor::write
/// [`finalize`]: WriteCursor::finalize
/// [`final_write`]: WriteCursor::final_write
#[must_use = "an unfinalized reservation blocks draining, flushing and extraction"]
pub struct WriteCursor {
	place: Place,
	/// Offset of the first unwritten reserved byte within its region.
	start: usize,
	/// One past the last reserved byte of the current fragment.
	end: usize,
	/// Reserved bytes continuing at the head of the following page.
	carry: usize,
}

/// A variable-size reservation: up to `reserved` bytes at the head or tail
/// of a single page, so the unused part of an overestimate can be given back
/// without disturbing neighboring bytes.
#[must_use = "an unfinalized reservation blocks draining, flushing and extraction"]
pub struct VarSizeCursor {
	page: usize,
	placement: Placement,
	/// Offset of the reservation within its page.
	start: usize,
	reserved: usize,
}

impl<'d> OutputStream<'d> {
	/// Carves `n` bytes out of the stream for a delayed write and moves the
	/// cursor past them. The window may straddle a page boundary. While any
	/// reservation is outstanding no page is drained, so the sink never sees
	/// a hole.
	///
	/// # Panics
	///
	/// Panics when `n` is zero, or on a fixed-region stream with fewer than
	/// `n` writable bytes left.
	pub fn reserve_fixed(&mut self, n: usize) -> WriteCursor {
		self.check_writable();
		assert!(n > 0, "empty reservation");
		if n <= self.span.len() {
			let start = self.span.start;
			let place = match &self.backing {
				Backing::Paged(buffers) => Place::Page(
					buffers.index_of_last().expect("a non-empty span implies a page"),
				),
				Backing::Fixed(_) => Place::Fixed,
			};
			self.span.advance(n);
			self.cursors += 1;
			return WriteCursor { place, start, end: start + n, carry: 0 };
		}
		if matches!(self.backing, Backing::Fixed(_)) {
			panic!(
				"reservation of {n} bytes exceeds the remaining fixed capacity of {}",
				self.span.len(),
			);
		}

		// Split: the first fragment takes the rest of the window, the
		// remainder claims the head of a fresh page.
		let first_len = self.span.len();
		let first_start = self.span.start;
		let deficit = n - first_len;
		self.span.advance(first_len);
		let Backing::Paged(buffers) = &mut self.backing else { unreachable!() };
		let first_page = buffers.index_of_last();
		buffers.end_last_page_at(self.span.start);
		let page_size = buffers.page_size();
		let span = buffers.add_writable_page(deficit.next_multiple_of(page_size));
		let cursor = if first_len > 0 {
			let index = first_page.expect("a non-empty span implies a page");
			buffers.page_mut(index + 1).reserved_prefix = deficit;
			WriteCursor {
				place: Place::Page(index),
				start: first_start,
				end: first_start + first_len,
				carry: deficit,
			}
		} else {
			// No first fragment; the whole window sits at the new page's head.
			let index = buffers.index_of_last().expect("page just added");
			WriteCursor { place: Place::Page(index), start: 0, end: deficit, carry: 0 }
		};
		self.set_span(span);
		self.span.advance(deficit);
		self.cursors += 1;
		cursor
	}

	/// Reserves up to `max_n` bytes for a delayed write whose final size is
	/// only known later; the unused part of the overestimate leaves no trace
	/// between neighbors.
	///
	/// # Panics
	///
	/// Panics when `max_n` is zero or the stream does not own its pages.
	pub fn reserve_var(&mut self, max_n: usize) -> VarSizeCursor {
		self.check_writable();
		assert!(max_n > 0, "empty reservation");
		assert!(
			matches!(self.backing, Backing::Paged(_)),
			"variable-size reservations require a stream that owns its pages",
		);
		if max_n <= self.span.len() {
			// Tail of the current page; whatever follows moves to a fresh one.
			let start = self.span.start;
			self.span_end_pos -= self.span.len();
			self.span.end = self.span.start;
			self.span_end_pos += max_n;
			let Backing::Paged(buffers) = &mut self.backing else { unreachable!() };
			let page = buffers.index_of_last().expect("a non-empty span implies a page");
			let span = buffers.split_last_page_at(start + max_n);
			self.set_span(span);
			self.cursors += 1;
			VarSizeCursor { page, placement: Placement::Tail, start, reserved: max_n }
		} else {
			// Head of a fresh page.
			self.span_end_pos -= self.span.len();
			self.span.end = self.span.start;
			let Backing::Paged(buffers) = &mut self.backing else { unreachable!() };
			buffers.end_last_page_at(self.span.start);
			let page_size = buffers.page_size();
			let span = buffers.add_writable_page(max_n.next_multiple_of(page_size));
			let page = buffers.index_of_last().expect("page just added");
			buffers.page_mut(page).end = max_n;
			self.set_span(span);
			self.span.advance(max_n);
			self.cursors += 1;
			VarSizeCursor { page, placement: Placement::Head, start: 0, reserved: max_n }
		}
	}
}

impl WriteCursor {
	/// Returns the number of reserved bytes not yet back-filled.
	pub fn remaining(&self) -> usize {
		self.end - self.start + self.carry
	}

	/// Back-fills the next `bytes.len()` reserved bytes.
	///
	/// # Panics
	///
	/// Panics when `bytes` outruns the reservation.
	pub fn write(&mut self, stream: &mut OutputStream<'_>, mut bytes: &[u8]) {
		stream.check_writable();
		while !bytes.is_empty() {
			if self.start == self.end {
				// First fragment exhausted; claim the next page's prefix.
				assert!(self.carry > 0, "write past the end of a reservation");
				let Place::Page(index) = self.place else {
					unreachable!("fixed-region reservations never split")
				};
				let Backing::Paged(buffers) = &mut stream.backing else { unreachable!() };
				let page = buffers.page_mut(index + 1);
				debug_assert_eq!(page.reserved_prefix, self.carry);
				page.reserved_prefix = 0;
				self.place = Place::Page(index + 1);
				self.start = 0;
				self.end = self.carry;
				self.carry = 0;
			}
			let n = bytes.len().min(self.end - self.start);
			let dst = match self.place {
				Place::Page(index) => {
					let Backing::Paged(buffers) = &mut stream.backing else { unreachable!() };
					&mut buffers.page_mut(index).data[self.start..self.start + n]
				}
				Place::Fixed => {
					let Backing::Fixed(region) = &mut stream.backing else { unreachable!() };
					&mut region[self.start..self.start + n]
				}
			};
			dst.copy_from_slice(&bytes[..n]);
			self.start += n;
			bytes = &bytes[n..];
		}
	}

	/// Closes a fully back-filled reservation, making its pages eligible for
	/// draining again once no other reservation is outstanding.
	///
	/// # Panics
	///
	/// Panics while any reserved byte is unwritten.
	pub fn finalize(self, stream: &mut OutputStream<'_>) {
		assert_eq!(
			self.remaining(), 0,
			"reservation finalized with {} bytes unwritten", self.remaining(),
		);
		debug_assert!(stream.cursors > 0);
		stream.cursors -= 1;
	}

	/// Back-fills the rest of the reservation with exactly `bytes` and
	/// finalizes it.
	///
	/// # Panics
	///
	/// Panics unless `bytes.len()` equals [`remaining`](Self::remaining).
	pub fn final_write(mut self, stream: &mut OutputStream<'_>, bytes: &[u8]) {
		assert_eq!(
			bytes.len(), self.remaining(),
			"a fixed reservation takes exactly {} more bytes, got {}",
			self.remaining(), bytes.len(),
		);
		self.write(stream, bytes);
		self.finalize(stream);
	}
}

impl VarSizeCursor {
	/// Returns the reserved upper bound.
	pub fn reserved(&self) -> usize {
		self.reserved
	}

	/// Back-fills the reservation with `bytes` and finalizes it; the
	/// `reserved − bytes.len()` unused bytes are given back to the stream.
	///
	/// # Panics
	///
	/// Panics when `bytes` outruns the reservation.
	pub fn final_write(self, stream: &mut OutputStream<'_>, bytes: &[u8]) {
		stream.check_writable();
		assert!(
			bytes.len() <= self.reserved,
			"reservation overrun: {} bytes into a reservation of up to {}",
			bytes.len(), self.reserved,
		);
		let over = self.reserved - bytes.len();
		let Backing::Paged(buffers) = &mut stream.backing else { unreachable!() };
		let page = buffers.page_mut(self.page);
		match self.placement {
			Placement::Tail => {
				// The live region now ends exactly where the actual bytes do;
				// the following bytes already live on the next page.
				debug_assert_eq!(page.end, self.start + self.reserved);
				page.data[self.start..self.start + bytes.len()].copy_from_slice(bytes);
				page.end = self.start + bytes.len();
			}
			Placement::Head => {
				// Actual bytes sit flush against the fixed continuation; the
				// live region starts where they do.
				debug_assert_eq!(page.start, 0);
				page.data[over..self.reserved].copy_from_slice(bytes);
				page.start = over;
			}
		}
		stream.span_end_pos -= over;
		debug_assert!(stream.cursors > 0);
		stream.cursors -= 1;
	}
}
