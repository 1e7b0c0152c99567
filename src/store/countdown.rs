//! Background countdown owned by one live credential record.

// std
use std::time::Duration;
// crates.io
use tokio::{
	task::JoinHandle,
	time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::{CredentialKind, Token, TokenSecret},
	obs,
};

const TICK: Duration = Duration::from_secs(1);

/// Value and lifetime of a record; empty value and zero lifetime always travel together.
#[derive(Debug)]
struct RecordState {
	value: TokenSecret,
	remaining: u64,
}
impl RecordState {
	fn clear(&mut self) {
		self.value = TokenSecret::default();
		self.remaining = 0;
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tick {
	Running,
	Expired,
	Cancelled,
}

/// Local credential record plus the one task counting its lifetime down.
///
/// Dropping a lease cancels its task; [`TokenLease::shutdown`] additionally waits for it.
pub(crate) struct TokenLease {
	kind: CredentialKind,
	state: Arc<Mutex<RecordState>>,
	cancel: CancellationToken,
	task: Option<JoinHandle<()>>,
}
impl TokenLease {
	/// Populates a record with `value` and starts counting `ttl` seconds down.
	///
	/// Must be called from within a Tokio runtime.
	pub(crate) fn start(kind: CredentialKind, value: TokenSecret, ttl: u64) -> Self {
		let state = Arc::new(Mutex::new(RecordState { value, remaining: ttl }));
		let cancel = CancellationToken::new();
		let task = tokio::spawn(countdown(kind, state.clone(), cancel.clone()));

		Self { kind, state, cancel, task: Some(task) }
	}

	/// Current record, or `None` once the countdown has cleared it.
	pub(crate) fn snapshot(&self) -> Option<Token> {
		let state = self.state.lock();

		if state.value.is_empty() {
			return None;
		}

		Some(Token { kind: self.kind, value: state.value.clone(), remaining_seconds: state.remaining })
	}

	/// Cancels the countdown, waits for the task to exit, then clears the record.
	pub(crate) async fn shutdown(mut self) {
		self.cancel.cancel();

		if let Some(task) = self.task.take() {
			// A panicked or aborted countdown has nothing left to clean up.
			let _ = task.await;
		}

		self.state.lock().clear();
	}
}
impl Drop for TokenLease {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}
impl Debug for TokenLease {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("TokenLease")
			.field("kind", &self.kind)
			.field("value", &state.value)
			.field("remaining", &state.remaining)
			.field("cancelled", &self.cancel.is_cancelled())
			.finish()
	}
}

async fn countdown(kind: CredentialKind, state: Arc<Mutex<RecordState>>, cancel: CancellationToken) {
	let mut ticks = time::interval_at(Instant::now() + TICK, TICK);

	// Missed ticks are replayed at once; after a stall the record expires early, never late.
	ticks.set_missed_tick_behavior(MissedTickBehavior::Burst);

	loop {
		tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			_ = ticks.tick() => match tick_once(&state, &cancel) {
				Tick::Running => {},
				Tick::Expired => {
					obs::log_countdown_expired(kind);

					break;
				},
				Tick::Cancelled => break,
			},
		}
	}
}

fn tick_once(state: &Mutex<RecordState>, cancel: &CancellationToken) -> Tick {
	let mut state = state.lock();

	// Checked under the record lock so a shutdown never races a decrement.
	if cancel.is_cancelled() {
		return Tick::Cancelled;
	}

	state.remaining = state.remaining.saturating_sub(1);

	if state.remaining == 0 {
		state.clear();

		Tick::Expired
	} else {
		Tick::Running
	}
}
