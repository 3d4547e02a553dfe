// SPDX-License-Identifier: Apache-2.0

//! ## How it works
//!
//! Data is written into fixed-size chunks of memory called *pages*, owned by an
//! ordered page queue. The stream writes through a *span*, a writable window
//! into the tail of the last page. When the span fills, the stream either
//! appends a new page or, when a synchronous sink is attached and no
//! reservation is outstanding, *drains*: completed pages are handed to the
//! sink front-to-back and one page is recycled for further writes.
//!
//! ### Delayed writes
//!
//! A *reservation* carves a window out of the span up front and returns a
//! cursor to be back-filled later, once its contents are known (a length
//! prefix, say, or a checksum). The stream keeps writing past the
//! reservation; pages holding unfinalized reservations are never drained, so
//! the sink only ever sees completed bytes in stream order. Fixed-size
//! reservations may straddle a page boundary; variable-size reservations sit
//! at the head or tail of a single page so an overestimate can be given back
//! without moving neighboring bytes.
//!
//! ### Two modes
//!
//! Sinks expose a capability set of six slots: write, flush and close, each in
//! a synchronous and an asynchronous (poll-based) flavor. Any slot may be
//! absent. A memory stream has no sink at all and buffers until
//! [`take_output`]; a file sink is synchronous; an async [`pipe`] connects a
//! writing stream to a [`PipeReader`] with cooperative backpressure.
//!
//! [`take_output`]: OutputStream::take_output

mod cursor;
mod error;
mod output;
mod page;
mod pipe;
pub mod sink;

pub use cursor::*;
pub use error::*;
pub use output::*;
pub use pipe::*;
pub use sink::Sink;

/// The default size of a page, in bytes. A small allowance is carved out of
/// the power of two so a page's backing allocation, header included, stays
/// within one allocator size class.
pub const DEFAULT_PAGE_SIZE: usize = 4096 - 32;
