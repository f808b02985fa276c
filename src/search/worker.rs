use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::debug;

use super::pipeline::FetchRequest;
use crate::backend::RecordSource;
use crate::error::BackendError;
use crate::types::TranslationRecord;

pub(crate) enum FetchCommand {
	Fetch(FetchRequest),
	Shutdown,
}

pub(crate) struct FetchResult {
	pub id: u64,
	pub result: Result<Vec<TranslationRecord>, BackendError>,
}

/// Launch the background fetch thread.
///
/// Requests whose id no longer matches `latest` by the time the worker picks
/// them up are dropped without touching the backend.
pub(crate) fn spawn(
	source: Arc<dyn RecordSource>,
) -> (Sender<FetchCommand>, Receiver<FetchResult>, Arc<AtomicU64>) {
	let (command_tx, command_rx) = mpsc::channel();
	let (result_tx, result_rx) = mpsc::channel();
	let latest = Arc::new(AtomicU64::new(0));
	let thread_latest = Arc::clone(&latest);

	thread::spawn(move || worker_loop(source.as_ref(), command_rx, result_tx, thread_latest));

	(command_tx, result_rx, latest)
}

fn worker_loop(
	source: &dyn RecordSource,
	command_rx: Receiver<FetchCommand>,
	result_tx: Sender<FetchResult>,
	latest: Arc<AtomicU64>,
) {
	while let Ok(command) = command_rx.recv() {
		match command {
			FetchCommand::Fetch(request) => {
				if latest.load(Ordering::Acquire) != request.id {
					debug!("skipping superseded fetch {}", request.id);
					continue;
				}
				let result = source.query(&request.query);
				if result_tx
					.send(FetchResult {
						id: request.id,
						result,
					})
					.is_err()
				{
					break;
				}
			}
			FetchCommand::Shutdown => break,
		}
	}
}
