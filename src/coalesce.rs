//! Latest-value channel for high frequency pointer events.
//!
//! The producer pushes every position it sees. The consumer drains the
//! channel on its own schedule and only acts on the newest value, so a slow
//! render never builds up a backlog of stale positions.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Result of draining the channel once.
#[derive(Clone, Debug, PartialEq)]
pub enum Drained<T> {
    /// A new value different from the last one handed out.
    Value(T),
    /// Nothing new since the previous drain.
    Empty,
    /// The sender is gone. Carries the final value if it hasn't been seen.
    Closed(Option<T>),
}

#[derive(Debug)]
pub struct LatestSender<T> {
    tx: Sender<T>,
}

impl<T> LatestSender<T> {
    /// Queues `value`. Returns `false` once the consumer has gone away.
    pub fn send(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

#[derive(Debug)]
pub struct LatestReceiver<T> {
    rx: Receiver<T>,
    last: Option<T>,
}

impl<T: Clone + PartialEq> LatestReceiver<T> {
    /// Takes everything queued and keeps only the newest value.
    ///
    /// A value equal to the previously returned one is reported as
    /// [`Drained::Empty`].
    pub fn drain(&mut self) -> Drained<T> {
        let mut newest = None;
        let mut closed = false;
        loop {
            match self.rx.try_recv() {
                Ok(value) => newest = Some(value),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }

        let fresh = newest.filter(|value| self.last.as_ref() != Some(value));
        if let Some(value) = &fresh {
            self.last = Some(value.clone());
        }
        match (fresh, closed) {
            (fresh, true) => Drained::Closed(fresh),
            (Some(value), false) => Drained::Value(value),
            (None, false) => Drained::Empty,
        }
    }
}

/// Creates a connected sender/receiver pair.
pub fn latest<T>() -> (LatestSender<T>, LatestReceiver<T>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (LatestSender { tx }, LatestReceiver { rx, last: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_only_newest_value_is_seen() {
        let (tx, mut rx) = latest();
        assert_eq!(rx.drain(), Drained::Empty);
        for i in 0..10 {
            assert!(tx.send(i));
        }
        assert_eq!(rx.drain(), Drained::Value(9));
        assert_eq!(rx.drain(), Drained::Empty);
    }

    #[test]
    fn test_repeats_are_skipped() {
        let (tx, mut rx) = latest();
        tx.send((1.0, 2.0));
        assert_eq!(rx.drain(), Drained::Value((1.0, 2.0)));
        tx.send((1.0, 2.0));
        assert_eq!(rx.drain(), Drained::Empty);
        tx.send((3.0, 2.0));
        assert_eq!(rx.drain(), Drained::Value((3.0, 2.0)));
    }

    #[test]
    fn test_close_delivers_final_value() {
        let (tx, mut rx) = latest();
        tx.send(1);
        tx.send(2);
        drop(tx);
        assert_eq!(rx.drain(), Drained::Closed(Some(2)));
        assert_eq!(rx.drain(), Drained::Closed(None));
    }

    #[test]
    fn test_send_fails_without_receiver() {
        let (tx, rx) = latest::<u32>();
        drop(rx);
        assert!(!tx.send(1));
    }

    #[test]
    fn test_producer_thread() {
        let (tx, mut rx) = latest();
        let producer = thread::spawn(move || {
            for i in 0..1000u32 {
                tx.send(i);
            }
        });
        producer.join().expect("producer thread");

        let mut seen = Vec::new();
        loop {
            match rx.drain() {
                Drained::Value(v) => seen.push(v),
                Drained::Closed(v) => {
                    seen.extend(v);
                    break;
                }
                Drained::Empty => {}
            }
        }
        assert_eq!(seen.last(), Some(&999));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }
}
