//! Collapse bursts of values into the last one after a quiet period.
//!
//! Used for the search term so the filter only re-runs once typing pauses.

use std::time::Duration;
use tokio::sync::mpsc;

/// Default quiet period before a search term is applied
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Sending half of a debouncer.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
  tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
  /// Spawn a debouncer and return it with the receiver of settled values.
  ///
  /// A value is forwarded once `delay` passes without a newer one. When every
  /// sender is dropped, a still-pending value is flushed immediately.
  pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
    let (in_tx, mut in_rx) = mpsc::unbounded_channel::<T>();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<T>();

    tokio::spawn(async move {
      let mut pending: Option<T> = None;
      loop {
        match pending.take() {
          Some(value) => {
            tokio::select! {
              next = in_rx.recv() => match next {
                Some(newer) => pending = Some(newer),
                None => {
                  let _ = out_tx.send(value);
                  break;
                }
              },
              _ = tokio::time::sleep(delay) => {
                if out_tx.send(value).is_err() {
                  break;
                }
              }
            }
          }
          None => match in_rx.recv().await {
            Some(value) => pending = Some(value),
            None => break,
          },
        }
      }
    });

    (Self { tx: in_tx }, out_rx)
  }

  /// Queue a value. Returns false once the receiving side is gone.
  pub fn push(&self, value: T) -> bool {
    self.tx.send(value).is_ok()
  }
}
