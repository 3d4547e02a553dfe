// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::future::poll_fn;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use crate::page::PageBuffers;
use crate::StreamContext::PipeWrite;
use crate::{Error, ErrorSource, OutputStream, Result, Sink, StreamOptions, DEFAULT_PAGE_SIZE};

/// The default backpressure threshold for [`pipe`]s: once this many bytes
/// are buffered, writes suspend until the reader catches up.
pub const DEFAULT_MAX_BUFFERED: usize = 4 * DEFAULT_PAGE_SIZE;

/// State shared by the two halves of a pipe. Single-producer single-consumer
/// and single-threaded; each wait slot parks at most one task and a signal
/// completes it exactly once.
struct Shared {
	buffers: PageBuffers,
	max_buffered: usize,
	waiting_reader: Option<Waker>,
	waiting_writer: Option<Waker>,
	reader_alive: bool,
}

impl Shared {
	fn wake_reader(&mut self) {
		if let Some(waker) = self.waiting_reader.take() {
			waker.wake();
		}
	}

	fn wake_writer(&mut self) {
		if let Some(waker) = self.waiting_writer.take() {
			waker.wake();
		}
	}
}

/// Connects a writing stream to a [`PipeReader`] over one shared page queue
/// with cooperative backpressure: writes suspend while the queue holds at
/// least `max_buffered` pending bytes, reads suspend while it is empty.
///
/// Closing the stream marks end-of-stream; the reader drains what is left
/// and then observes a zero-length read exactly once. Both halves are
/// single-threaded (`!Send`); drive them from one executor task pool.
pub fn pipe(options: StreamOptions, max_buffered: usize) -> (OutputStream<'static>, PipeReader) {
	assert!(max_buffered > 0, "backpressure threshold must be positive");
	let shared = Rc::new(RefCell::new(Shared {
		buffers: PageBuffers::new(options.page_size),
		max_buffered,
		waiting_reader: None,
		waiting_writer: None,
		reader_alive: true,
	}));
	let writer = OutputStream::with_sink(PipeSink { shared: shared.clone() }, options);
	(writer, PipeReader { shared })
}

/// The writer-side sink: appends drained bytes to the shared queue,
/// suspending on the writer slot while the pipe is over its threshold.
struct PipeSink {
	shared: Rc<RefCell<Shared>>,
}

impl Sink for PipeSink {
	fn is_async(&self) -> bool { true }

	fn poll_write(&mut self, cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result> {
		let mut shared = self.shared.borrow_mut();
		if !shared.reader_alive {
			return Poll::Ready(Err(Error::new(PipeWrite, ErrorSource::PipeClosed)));
		}
		let buffered = shared.buffers.count();
		// An empty pipe always accepts, so one block larger than the
		// threshold drains through instead of deadlocking.
		if buffered > 0 && buffered + buf.len() > shared.max_buffered {
			shared.waiting_writer = Some(cx.waker().clone());
			return Poll::Pending;
		}
		shared.buffers.push_slice(buf);
		shared.wake_reader();
		Poll::Ready(Ok(()))
	}

	/// Marks end-of-stream and lets the reader drain out. Present in both
	/// flavors so a pipe can be closed from synchronous code.
	fn close(&mut self) -> Result {
		let mut shared = self.shared.borrow_mut();
		shared.buffers.eof = true;
		shared.wake_reader();
		Ok(())
	}

	fn poll_close(&mut self, _: &mut Context<'_>) -> Poll<Result> {
		Poll::Ready(self.close())
	}
}

/// The reading half of a [`pipe`].
pub struct PipeReader {
	shared: Rc<RefCell<Shared>>,
}

impl PipeReader {
	/// Polls for buffered bytes: moves up to `dst.len()` of them into `dst`
	/// and returns the count, or parks on the reader slot while the pipe is
	/// empty. Ready with `0` exactly when the writer has closed and the
	/// queue is drained; end-of-stream is not an error.
	pub fn poll_read(&mut self, cx: &mut Context<'_>, dst: &mut [u8]) -> Poll<usize> {
		if dst.is_empty() {
			return Poll::Ready(0);
		}
		let mut shared = self.shared.borrow_mut();
		if shared.buffers.count() == 0 {
			if shared.buffers.eof {
				return Poll::Ready(0);
			}
			shared.waiting_reader = Some(cx.waker().clone());
			shared.wake_writer();
			return Poll::Pending;
		}
		let read = shared.buffers.consume_into(dst);
		shared.wake_writer();
		Poll::Ready(read)
	}

	/// Reads up to `dst.len()` bytes, suspending while the pipe is empty.
	/// Returns `0` once, at end-of-stream. Cancellation-safe: dropping the
	/// future consumes nothing.
	pub async fn read(&mut self, dst: &mut [u8]) -> usize {
		poll_fn(|cx| self.poll_read(cx, dst)).await
	}

	/// Reads everything up to end-of-stream into `out`, returning the number
	/// of bytes appended.
	pub async fn read_to_end(&mut self, out: &mut Vec<u8>) -> usize {
		let mut chunk = [0; 4096];
		let mut total = 0;
		loop {
			let read = self.read(&mut chunk).await;
			if read == 0 {
				break total;
			}
			out.extend_from_slice(&chunk[..read]);
			total += read;
		}
	}
}

impl Drop for PipeReader {
	fn drop(&mut self) {
		let mut shared = self.shared.borrow_mut();
		shared.reader_alive = false;
		// Fail a parked writer instead of leaving it suspended forever.
		shared.wake_writer();
	}
}
