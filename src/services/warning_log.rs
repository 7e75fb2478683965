//! Warning capture layer for tracing
//!
//! This module provides a tracing layer that captures WARN and ERROR events
//! and hands them to the host as timestamped lines over a channel, so the
//! page can show non-fatal problems (an unreachable knowledge base, say)
//! without failing. Repeats of one message are suppressed for a while.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Deduplication state for warning messages
struct DeduplicationState {
    /// Map from message to (last_seen_time, count)
    recent_messages: HashMap<String, (Instant, usize)>,
    window: Duration,
    max_entries: usize,
}

impl DeduplicationState {
    fn new(window: Duration) -> Self {
        Self {
            recent_messages: HashMap::new(),
            window,
            max_entries: 100,
        }
    }

    /// Returns (should_report, suppressed_count); suppressed_count is the
    /// number of repeats swallowed since the message was last reported
    fn check_message(&mut self, message: &str) -> (bool, usize) {
        let now = Instant::now();

        if self.recent_messages.len() > self.max_entries {
            let window = self.window.saturating_mul(2);
            self.recent_messages
                .retain(|_, (time, _)| now.duration_since(*time) < window);
        }

        match self.recent_messages.get_mut(message) {
            Some((last_seen, count)) if now.duration_since(*last_seen) < self.window => {
                *count += 1;
                *last_seen = now;
                (false, 0)
            }
            Some((last_seen, count)) => {
                let suppressed = count.saturating_sub(1);
                *count = 1;
                *last_seen = now;
                (true, suppressed)
            }
            None => {
                self.recent_messages.insert(message.to_string(), (now, 1));
                (true, 0)
            }
        }
    }
}

/// A tracing layer that forwards WARN+ events to the host
pub struct WarningLogLayer {
    sender: mpsc::Sender<String>,
    dedup: Arc<Mutex<DeduplicationState>>,
}

/// Receiving end of the warning channel, held by the host
pub struct WarningLogHandle {
    pub receiver: mpsc::Receiver<String>,
}

impl WarningLogHandle {
    /// Take every warning reported so far
    pub fn drain(&self) -> Vec<String> {
        self.receiver.try_iter().collect()
    }
}

/// Create a warning layer and the handle the host reads from
pub fn create(dedup_window: Duration) -> (WarningLogLayer, WarningLogHandle) {
    let (sender, receiver) = mpsc::channel();

    let layer = WarningLogLayer {
        sender,
        dedup: Arc::new(Mutex::new(DeduplicationState::new(dedup_window))),
    };

    (layer, WarningLogHandle { receiver })
}

impl<S> Layer<S> for WarningLogLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::WARN {
            return;
        }

        let mut visitor = StringVisitor::default();
        event.record(&mut visitor);

        let (should_report, suppressed_count) = match self.dedup.lock() {
            Ok(mut dedup) => dedup.check_message(&visitor.0),
            Err(_) => (true, 0),
        };
        if !should_report {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let line = if suppressed_count > 0 {
            format!(
                "{} {}: {} (suppressed {} similar messages)",
                timestamp, level, visitor.0, suppressed_count
            )
        } else {
            format!("{} {}: {}", timestamp, level, visitor.0)
        };

        let _ = self.sender.send(line);
    }
}

/// Simple visitor to extract message from event
#[derive(Default)]
struct StringVisitor(String);

impl StringVisitor {
    fn push_field(&mut self, name: &str, value: String) {
        if name == "message" {
            self.0 = value;
        } else if self.0.is_empty() {
            self.0 = format!("{name}={value}");
        } else {
            self.0.push_str(&format!(" {name}={value}"));
        }
    }
}

impl tracing::field::Visit for StringVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.push_field(field.name(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push_field(field.name(), value.to_string());
    }
}
