// SPDX-License-Identifier: Apache-2.0

use std::task::{Context, Poll};
use crate::Result;

mod file;
mod void;

pub use file::*;
pub use void::*;

/// The downstream consumer of drained pages.
///
/// A sink is a set of six capability slots: write, flush and close, each in a
/// synchronous and an asynchronous flavor. Any slot may be absent: the
/// defaulted write slots panic and the defaulted flush/close slots are
/// no-ops. [`is_sync`] and [`is_async`] advertise which halves exist, so
/// the stream can decide whether a filled span drains inline or grows the
/// page queue until an explicit asynchronous flush.
///
/// `write` and `poll_write` have write-all semantics: a short write is an IO
/// error, not a partial success. The asynchronous slots are poll-shaped so
/// the trait stays object-safe and free of any executor choice; `Pending`
/// must only be returned with a waker registered.
///
/// [`is_sync`]: Sink::is_sync
/// [`is_async`]: Sink::is_async
pub trait Sink {
	/// Returns `true` if the synchronous slots are implemented.
	fn is_sync(&self) -> bool { false }
	/// Returns `true` if the asynchronous slots are implemented.
	fn is_async(&self) -> bool { false }

	/// Writes the whole of `buf` to the sink's target.
	///
	/// # Panics
	///
	/// The default slot is absent and panics.
	fn write(&mut self, buf: &[u8]) -> Result {
		let _ = buf;
		panic!("sink does not support synchronous writes")
	}

	/// Forces written bytes through to the sink's target.
	fn flush(&mut self) -> Result { Ok(()) }

	/// Releases the sink's target. Called at most once by the stream.
	fn close(&mut self) -> Result { Ok(()) }

	/// Writes the whole of `buf`, suspending while the sink cannot accept it.
	///
	/// # Panics
	///
	/// The default slot is absent and panics.
	fn poll_write(&mut self, cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result> {
		let _ = (cx, buf);
		panic!("sink does not support asynchronous writes")
	}

	/// Asynchronous flavor of [`flush`](Sink::flush).
	fn poll_flush(&mut self, cx: &mut Context<'_>) -> Poll<Result> {
		let _ = cx;
		Poll::Ready(Ok(()))
	}

	/// Asynchronous flavor of [`close`](Sink::close).
	fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result> {
		let _ = cx;
		Poll::Ready(Ok(()))
	}
}
