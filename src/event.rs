use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Browse-mode events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  /// A line typed on stdin
  Input(String),
  /// A search term that survived the debounce period
  Search(String),
  /// Stdin reached end of file
  Closed,
}

/// Event handler that merges stdin lines and settled search terms
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a handler without any input source attached
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self { tx, rx }
  }

  /// Create a handler reading lines from stdin
  pub fn with_stdin() -> Self {
    let handler = Self::new();
    let tx = handler.sender();

    // Spawn stdin line reader
    tokio::spawn(async move {
      let mut lines = BufReader::new(tokio::io::stdin()).lines();
      loop {
        match lines.next_line().await {
          Ok(Some(line)) => {
            if tx.send(Event::Input(line)).is_err() {
              break;
            }
          }
          Ok(None) | Err(_) => {
            let _ = tx.send(Event::Closed);
            break;
          }
        }
      }
    });

    handler
  }

  /// Get a sender for feeding events from other tasks
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Forward settled values from `settled` as search events
  pub fn forward_searches(&self, mut settled: mpsc::UnboundedReceiver<String>) {
    let tx = self.sender();
    tokio::spawn(async move {
      while let Some(term) = settled.recv().await {
        if tx.send(Event::Search(term)).is_err() {
          break;
        }
      }
    });
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use recipes::debounce::Debouncer;
  use std::time::Duration;

  #[tokio::test(start_paused = true)]
  async fn test_debounced_searches_arrive_as_events() {
    let mut events = EventHandler::new();
    let (debouncer, settled) = Debouncer::spawn(Duration::from_millis(300));
    events.forward_searches(settled);

    debouncer.push("s".to_string());
    debouncer.push("so".to_string());
    debouncer.push("soup".to_string());

    assert_eq!(events.next().await, Some(Event::Search("soup".to_string())));
  }

  #[tokio::test]
  async fn test_sender_feeds_input() {
    let mut events = EventHandler::new();
    events.sender().send(Event::Input("q".to_string())).unwrap();
    assert_eq!(events.next().await, Some(Event::Input("q".to_string())));
  }
}
