//! Call bookkeeping.
//!
//! The façade can be wired with a [`CollectorSink`] that receives one
//! [`CollectEntry`] per conversion step. [`ReissueDataCollector`] is the
//! bundled sink: it keeps the entries in memory for inspection by tooling
//! and profiling panels.

use crate::context::Context;
use parking_lot::RwLock;
use std::time::Duration;

/// The conversion step an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	Normalize,
	Denormalize,
	Encode,
	Decode,
}

/// One recorded conversion step.
#[derive(Debug, Clone)]
pub struct CollectEntry {
	pub operation: Operation,
	/// Type name for normalization steps, format name for codec steps.
	pub subject: String,
	pub format: Option<String>,
	/// The options the step ran under, captured at record time.
	pub context: Context,
	pub duration: Duration,
	pub succeeded: bool,
}

/// Receives one entry per conversion step.
pub trait CollectorSink: Send + Sync {
	fn record(&self, entry: CollectEntry);
}

/// In-memory sink retaining every entry.
#[derive(Default)]
pub struct ReissueDataCollector {
	entries: RwLock<Vec<CollectEntry>>,
}

impl ReissueDataCollector {
	/// Creates an empty collector.
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of everything recorded so far.
	pub fn entries(&self) -> Vec<CollectEntry> {
		self.entries.read().clone()
	}

	/// Number of recorded steps for one operation.
	pub fn count(&self, operation: Operation) -> usize {
		self.entries
			.read()
			.iter()
			.filter(|e| e.operation == operation)
			.count()
	}

	/// Total time across all recorded steps.
	pub fn total_duration(&self) -> Duration {
		self.entries.read().iter().map(|e| e.duration).sum()
	}

	/// Mean step duration, zero when nothing was recorded.
	pub fn average_duration(&self) -> Duration {
		let entries = self.entries.read();
		if entries.is_empty() {
			return Duration::ZERO;
		}
		entries.iter().map(|e| e.duration).sum::<Duration>() / entries.len() as u32
	}

	/// The `n` slowest steps, slowest first.
	pub fn slowest(&self, n: usize) -> Vec<CollectEntry> {
		let mut entries = self.entries.read().clone();
		entries.sort_by(|a, b| b.duration.cmp(&a.duration));
		entries.truncate(n);
		entries
	}

	/// Steps recorded for one format.
	pub fn entries_for_format(&self, format: &str) -> Vec<CollectEntry> {
		self.entries
			.read()
			.iter()
			.filter(|e| e.format.as_deref() == Some(format))
			.cloned()
			.collect()
	}

	/// Drops everything recorded so far.
	pub fn reset(&self) {
		self.entries.write().clear();
	}
}

impl CollectorSink for ReissueDataCollector {
	fn record(&self, entry: CollectEntry) {
		self.entries.write().push(entry);
	}
}
