//! Test helpers shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts this crate's WARN and ERROR events.
#[derive(Clone, Default)]
pub struct LevelCounter {
    errors: Arc<AtomicUsize>,
    warnings: Arc<AtomicUsize>,
}

impl LevelCounter {
    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("gemini_ocr") {
            return;
        }
        match *metadata.level() {
            Level::ERROR => {
                self.errors.fetch_add(1, Ordering::SeqCst);
            }
            Level::WARN => {
                self.warnings.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
    }
}

/// Installs a thread-local subscriber that counts log levels until the guard drops.
///
/// Works with the default current-thread `#[tokio::test]` runtime.
pub fn capture_levels() -> (LevelCounter, tracing::subscriber::DefaultGuard) {
    let counter = LevelCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (counter, guard)
}
