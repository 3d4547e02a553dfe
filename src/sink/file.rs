// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use crate::Result;
use super::Sink;

/// A [`Sink`] appending drained pages to a [file](File). Synchronous only;
/// the asynchronous slots are absent.
#[derive(Debug)]
pub struct FileSink {
	file: File,
}

impl FileSink {
	/// Creates the file at `path`, truncating an existing one.
	pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
		File::create(path).map(Into::into)
	}
}

impl From<File> for FileSink {
	fn from(file: File) -> Self {
		Self { file }
	}
}

impl Sink for FileSink {
	fn is_sync(&self) -> bool { true }

	fn write(&mut self, buf: &[u8]) -> Result {
		self.file.write_all(buf)?;
		Ok(())
	}

	fn flush(&mut self) -> Result {
		self.file.flush()?;
		Ok(())
	}

	/// Syncs file contents so write-back errors surface here rather than
	/// being swallowed by the handle's drop.
	fn close(&mut self) -> Result {
		self.file.sync_all()?;
		Ok(())
	}
}
