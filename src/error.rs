// SPDX-License-Identifier: Apache-2.0

use std::{fmt, io, result};

/// The error type for stream, sink and pipe operations.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct Error {
	pub context: StreamContext,
	pub source: ErrorSource,
}

/// The source error encountered.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorSource {
	/// An IO error raised by a sink.
	#[error(transparent)]
	Io(#[from] io::Error),
	/// The reading half of a pipe was dropped before the writer finished.
	#[error("pipe reader disconnected")]
	PipeClosed,
}

/// The operation attempted when the error was encountered.
#[derive(Copy, Clone, Debug, Default, strum::EnumIs)]
#[non_exhaustive]
pub enum StreamContext {
	/// Unknown operation.
	#[default]
	Unknown,
	/// Writing to the stream.
	Write,
	/// Draining completed pages to the sink.
	Drain,
	/// Flushing the stream.
	Flush,
	/// Closing the stream.
	Close,
	/// Opening a sink.
	Open,
	/// Writing into a pipe.
	PipeWrite,
	/// Reading from a pipe.
	PipeRead,
}

pub type Result<T = (), E = Error> = result::Result<T, E>;

pub(crate) trait ResultExt<T> {
	fn context(self, context: StreamContext) -> crate::Result<T>;
}

impl Error {
	pub fn new(context: StreamContext, source: ErrorSource) -> Self {
		Self { context, source }
	}

	pub fn io(context: StreamContext, error: io::Error) -> Self {
		Self::new(context, error.into())
	}

	/// Returns `true` if the error came from the sink's underlying IO.
	pub fn is_io(&self) -> bool {
		matches!(self.source, ErrorSource::Io(_))
	}
}

impl From<ErrorSource> for Error {
	fn from(value: ErrorSource) -> Self {
		Self::new(StreamContext::Unknown, value)
	}
}

impl From<io::Error> for Error {
	fn from(value: io::Error) -> Self {
		<Self as From<ErrorSource>>::from(value.into())
	}
}

impl StreamContext {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Unknown   => "unknown operation",
			Self::Write     => "write to stream",
			Self::Drain     => "drain pages to sink",
			Self::Flush     => "flush stream",
			Self::Close     => "close stream",
			Self::Open      => "open sink",
			Self::PipeWrite => "write to pipe",
			Self::PipeRead  => "read from pipe",
		}
	}
}

impl fmt::Display for StreamContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl<T, E: Into<ErrorSource>> ResultExt<T> for Result<T, E> {
	fn context(self, context: StreamContext) -> crate::Result<T> {
		self.map_err(|err| Error::new(context, err.into()))
	}
}

impl<T> ResultExt<T> for crate::Result<T> {
	fn context(mut self, context: StreamContext) -> Self {
		if let Err(ref mut error) = self {
			error.context = context;
		}
		self
	}
}
