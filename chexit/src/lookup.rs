//! Orchestration of key lookups over one configuration file.

use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread;

use blockcfg_core::{run_capture, LineSource, RawBlock, SourceError};
use log::{debug, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::policy::Policy;
use crate::request::{Execution, Expander, LookupKey, LookupRequest};
use crate::resolve::AddressResolver;

/// Errors that abort a lookup run.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("scan worker for key {key} panicked")]
    WorkerPanicked { key: String },
}

/// Look up every key of `request`, returning one policy per key in request order.
///
/// Keys that match nothing yield `Policy::default()`.
pub fn lookup_policies(request: &LookupRequest) -> Result<Vec<Policy>, LookupError> {
    let blocks = match request.execution {
        Execution::Sequential => capture_sequential(&request.filename, &request.keys)?,
        Execution::FanOut => capture_fan_out(&request.filename, &request.keys)?,
    };

    let mut policies: Vec<Policy> = blocks
        .iter()
        .zip(&request.keys)
        .map(|(block, key)| match block {
            Some(block) => Policy::from_block(block),
            None => {
                warn!("no policy matches {key}");
                Policy::default()
            }
        })
        .collect();

    if request.expander == Expander::Addr {
        let resolver = AddressResolver::new(&request.filename);
        policies
            .par_iter_mut()
            .try_for_each(|policy| {
                let unresolved = resolver.expand_policy(policy)?;
                if !unresolved.is_empty() {
                    warn!(
                        "policy {}: unresolved addresses {}",
                        policy.id,
                        unresolved.join(", ")
                    );
                }
                Ok::<(), SourceError>(())
            })?;
    }

    Ok(policies)
}

/// Scan the file once per key.
pub fn capture_sequential(
    path: &Path,
    keys: &[LookupKey],
) -> Result<Vec<Option<RawBlock>>, SourceError> {
    keys.iter()
        .map(|key| {
            info!("Looking up {key}");
            let source = LineSource::open(path)?;
            debug!("scanning {} for {key}", source.label());
            let mut capture = key.capture();
            run_capture(capture.as_mut(), source)
        })
        .collect()
}

/// Scan the file once, broadcasting each line to a worker per key.
///
/// Each worker owns the receiving end of its channel and drops it as soon as its
/// block is captured; the reader then stops sending to it. Reading stops early once
/// every worker is done.
pub fn capture_fan_out(
    path: &Path,
    keys: &[LookupKey],
) -> Result<Vec<Option<RawBlock>>, LookupError> {
    let source = LineSource::open(path)?;
    debug!("Number of keys: {}", keys.len());

    thread::scope(|scope| {
        let mut senders = Vec::with_capacity(keys.len());
        let mut workers = Vec::with_capacity(keys.len());

        for key in keys {
            let (tx, rx) = mpsc::channel::<String>();
            let mut capture = key.capture();
            senders.push(Some(tx));
            workers.push(scope.spawn(move || {
                for entry in rx {
                    capture.consume(&entry);
                    if capture.is_done() {
                        break;
                    }
                }
                capture.take_found()
            }));
        }

        let sent = broadcast(source, &mut senders);
        drop(senders);

        let blocks: Result<Vec<Option<RawBlock>>, LookupError> = workers
            .into_iter()
            .zip(keys)
            .map(|(worker, key)| {
                worker.join().map_err(|_| LookupError::WorkerPanicked {
                    key: key.to_string(),
                })
            })
            .collect();

        sent?;
        blocks
    })
}

/// Send every line to each still-active worker, in file order.
fn broadcast<I>(lines: I, senders: &mut [Option<Sender<String>>]) -> Result<(), SourceError>
where
    I: IntoIterator<Item = Result<String, SourceError>>,
{
    for entry in lines {
        let entry = entry?;
        let mut active = 0;
        for slot in senders.iter_mut() {
            let Some(tx) = slot.as_ref() else { continue };
            if tx.send(entry.clone()).is_ok() {
                active += 1;
            } else {
                *slot = None;
            }
        }
        if active == 0 {
            debug!("all workers done, stopping read");
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_stops_once_every_receiver_is_gone() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut senders = vec![Some(tx)];
        let lines = (0..3).map(|i| Ok(format!("line {i}")));
        broadcast(lines, &mut senders).expect("broadcast");
        assert!(senders[0].is_none());
    }

    #[test]
    fn broadcast_delivers_lines_in_order() {
        let (tx_a, rx_a) = mpsc::channel();
        let (tx_b, rx_b) = mpsc::channel();
        let mut senders = vec![Some(tx_a), Some(tx_b)];
        let lines = ["a", "b", "c"].into_iter().map(|l| Ok(l.to_string()));
        broadcast(lines, &mut senders).expect("broadcast");
        drop(senders);
        assert_eq!(rx_a.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(rx_b.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
