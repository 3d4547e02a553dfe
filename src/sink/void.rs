// SPDX-License-Identifier: Apache-2.0

use crate::Result;
use super::Sink;

/// Returns a [`Sink`] that writes to nowhere, dropping any data drained into
/// it.
pub fn void_sink() -> VoidSink { VoidSink }

/// A [`Sink`] that writes to nowhere, dropping any data drained into it.
#[derive(Copy, Clone, Debug, Default)]
pub struct VoidSink;

impl Sink for VoidSink {
	fn is_sync(&self) -> bool { true }

	/// Discards `buf`.
	fn write(&mut self, _: &[u8]) -> Result { Ok(()) }
}
