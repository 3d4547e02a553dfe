// SPDX-License-Identifier: Apache-2.0

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::task::{Context, Poll};
use all_asserts::assert_le;
use futures::executor::{block_on, LocalPool};
use futures::task::{noop_waker, LocalSpawnExt};
use pretty_assertions::assert_eq;
use quire::{pipe, CloseBehaviour, ErrorSource, OutputStream, Result, Sink, StreamOptions};

const PAGE: usize = 256;

fn small_pipe() -> (OutputStream<'static>, quire::PipeReader) {
	pipe(StreamOptions::default().set_page_size(PAGE), 4 * PAGE)
}

fn chunk(index: usize) -> Vec<u8> {
	vec![index as u8; PAGE]
}

#[test]
fn backpressure_parks_the_writer_until_the_reader_drains() {
	let (mut out, mut reader) = small_pipe();
	let done = Rc::new(Cell::new(false));

	let mut pool = LocalPool::new();
	let spawner = pool.spawner();
	spawner
		.spawn_local({
			let done = done.clone();
			async move {
				for index in 0..10 {
					out.write_slice(&chunk(index)).unwrap();
					out.flush_async().await.unwrap();
				}
				out.close_async(CloseBehaviour::Wait).await.unwrap();
				done.set(true);
			}
		})
		.unwrap();

	// With the reader asleep the writer fills the pipe to its threshold and
	// parks; it cannot finish on its own.
	pool.run_until_stalled();
	assert!(!done.get(), "writer should be parked on backpressure");

	let read = pool.run_until(async {
		let mut read = Vec::new();
		reader.read_to_end(&mut read).await;
		read
	});

	assert!(done.get(), "writer resumes once the reader drains");
	let expected: Vec<u8> = (0..10).flat_map(chunk).collect();
	assert_eq!(read, expected);
}

#[test]
fn reads_deliver_exactly_the_writes_then_eof() {
	let (mut out, mut reader) = small_pipe();

	let read = block_on(async {
		out.write_slice(b"over the pipe").unwrap();
		out.flush_async().await.unwrap();
		out.close_async(CloseBehaviour::Wait).await.unwrap();

		let mut read = Vec::new();
		let mut buf = [0; 5];
		loop {
			let n = reader.read(&mut buf).await;
			if n == 0 {
				break;
			}
			assert_le!(n, buf.len());
			read.extend_from_slice(&buf[..n]);
		}
		read
	});
	assert_eq!(read, b"over the pipe".to_vec());
}

#[test]
fn one_block_larger_than_the_threshold_passes_through() {
	let (mut out, mut reader) = small_pipe();
	// Far over the threshold: without the empty-pipe escape this write could
	// never fit under it and the writer would park forever.
	let big = vec![b'B'; 3 * 4 * PAGE];

	let mut pool = LocalPool::new();
	let spawner = pool.spawner();
	spawner
		.spawn_local({
			let big = big.clone();
			async move {
				out.write_slice(&big).unwrap();
				out.flush_async().await.unwrap();
				out.close_async(CloseBehaviour::Wait).await.unwrap();
			}
		})
		.unwrap();

	let read = pool.run_until(async {
		let mut read = Vec::new();
		reader.read_to_end(&mut read).await;
		read
	});
	assert_eq!(read, big);
}

#[test]
fn dropping_the_reader_fails_the_writer() {
	let (mut out, reader) = small_pipe();
	drop(reader);

	let error = block_on(async {
		out.write_slice(b"nobody listens").unwrap();
		out.flush_async().await
	})
	.unwrap_err();
	assert!(matches!(error.source, ErrorSource::PipeClosed));
}

#[test]
fn cancelled_read_consumes_nothing() {
	let (mut out, mut reader) = small_pipe();
	let waker = noop_waker();
	let mut cx = Context::from_waker(&waker);
	let mut buf = [0; 16];

	// Park a read, then abandon it; the pipe must be untouched.
	assert!(reader.poll_read(&mut cx, &mut buf).is_pending());

	block_on(async {
		out.write_slice(b"hello").unwrap();
		out.flush_async().await.unwrap();
	});

	assert_eq!(reader.poll_read(&mut cx, &mut buf), Poll::Ready(5));
	assert_eq!(&buf[..5], b"hello");
}

#[test]
fn dropping_the_writer_closes_the_pipe() {
	let (out, mut reader) = small_pipe();
	drop(out);

	let read = block_on(async {
		let mut buf = [0; 8];
		reader.read(&mut buf).await
	});
	assert_eq!(read, 0, "an abandoned writer reads as end-of-stream");
}

/// A sink whose asynchronous close always fails, for observing how close
/// errors surface under each [`CloseBehaviour`].
struct FailingCloseSink;

impl Sink for FailingCloseSink {
	fn is_async(&self) -> bool { true }

	fn poll_write(&mut self, _: &mut Context<'_>, _: &[u8]) -> Poll<Result> {
		Poll::Ready(Ok(()))
	}

	fn poll_close(&mut self, _: &mut Context<'_>) -> Poll<Result> {
		Poll::Ready(Err(io::Error::other("backing store went away").into()))
	}
}

#[test]
fn waited_close_surfaces_the_sink_error() {
	let mut out = OutputStream::with_sink(FailingCloseSink, StreamOptions::default());
	let error = block_on(out.close_async(CloseBehaviour::Wait)).unwrap_err();
	assert!(error.is_io());
}

#[test]
fn fire_and_forget_close_reports_through_the_log_channel() {
	let mut out = OutputStream::with_sink(FailingCloseSink, StreamOptions::default());
	// The error is demoted to the log facade; the caller sees success.
	block_on(out.close_async(CloseBehaviour::DontWait)).unwrap();
}

#[test]
fn waited_close_drains_pending_pages_first() {
	let (mut out, mut reader) = small_pipe();
	let read = block_on(async {
		out.write_slice(b"still buffered").unwrap();
		// No flush: close itself must deliver the pages.
		out.close_async(CloseBehaviour::Wait).await.unwrap();

		let mut read = Vec::new();
		reader.read_to_end(&mut read).await;
		read
	});
	assert_eq!(read, b"still buffered".to_vec());
}
