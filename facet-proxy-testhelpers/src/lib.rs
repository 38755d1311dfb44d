#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

use core::cell::Cell;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::rc::Rc;
use std::sync::LazyLock;
use std::time::Instant;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

static PROXY_EVENTS: AtomicUsize = AtomicUsize::new(0);

/// Counts events emitted under the `facet_proxy` target.
struct ProxyEvents;

impl<S: tracing::Subscriber> Layer<S> for ProxyEvents {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target().starts_with("facet_proxy") {
            PROXY_EVENTS.fetch_add(1, Ordering::Relaxed);
        }
    }
}

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;

    let filter = std::env::var("FACET_PROXY_LOG")
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::TRACE));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_timer(Uptime)
                .with_target(false)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .with(filter)
        .with(ProxyEvents)
        .try_init()
        .ok();
});

/// Sets up a tracing subscriber for tests.
///
/// Safe to call from every test: the subscriber is installed once per
/// process. `FACET_PROXY_LOG` takes a target filter such as
/// `facet_proxy=debug`; everything is logged at `TRACE` otherwise.
pub fn setup() {
    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}

/// Events from `facet_proxy` seen by the subscriber [`setup`] installs.
///
/// The count is shared by every test in the process and only grows, so
/// compare it before and after an operation. Events dropped by the
/// `FACET_PROXY_LOG` filter are not counted.
pub fn proxy_events() -> usize {
    PROXY_EVENTS.load(Ordering::Relaxed)
}

#[derive(Debug, Default)]
struct Counts {
    clones: Cell<usize>,
    drops: Cell<usize>,
}

/// Counts clone and drop events of the [`Tracked`] values it hands out.
///
/// Cloning a ledger shares the counts.
#[derive(Debug, Clone, Default)]
pub struct Ledger(Rc<Counts>);

impl Ledger {
    /// A ledger with zero events.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new value, recorded in this ledger.
    pub fn track(&self, id: u32) -> Tracked {
        Tracked {
            id,
            ledger: self.clone(),
        }
    }

    /// Clones recorded so far.
    pub fn clones(&self) -> usize {
        self.0.clones.get()
    }

    /// Drops recorded so far.
    pub fn drops(&self) -> usize {
        self.0.drops.get()
    }
}

/// A value whose clones and drops are recorded in a [`Ledger`].
#[derive(Debug)]
pub struct Tracked {
    id: u32,
    ledger: Ledger,
}

impl Tracked {
    /// The id given at creation (or by [`Tracked::set_id`]).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Changes the id; clones keep their own.
    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        let clones = &self.ledger.0.clones;
        clones.set(clones.get() + 1);
        tracing::trace!(id = self.id, "tracked value cloned");
        Tracked {
            id: self.id,
            ledger: self.ledger.clone(),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        let drops = &self.ledger.0.drops;
        drops.set(drops.get() + 1);
        tracing::trace!(id = self.id, "tracked value dropped");
    }
}
