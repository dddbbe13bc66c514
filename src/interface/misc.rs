// Misc functions for interface
// Locks, collections, logging setup, etc.

use std::io::Write;

use tracing_subscriber::filter::LevelFilter;

pub use std::collections::{BTreeSet as RustBTreeSet, HashMap as RustHashMap};
pub use std::sync::atomic::{
    AtomicBool as RustAtomicBool, AtomicI32 as RustAtomicI32, Ordering as RustAtomicOrdering,
};
pub use std::sync::Arc as RustRfc;

pub use dashmap::DashMap as RustDashMap;
pub use parking_lot::{Condvar as RustCondvar, Mutex as RustMutex, RwLock as RustLock};

pub fn new_hashmap<K, V>() -> RustHashMap<K, V> {
    RustHashMap::new()
}

pub fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

pub fn verbosity_to_filter(verbosity: isize) -> LevelFilter {
    match verbosity {
        v if v < 0 => LevelFilter::OFF,
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install a stderr subscriber filtered by `verbosity`. Records from the
/// `log` facade are forwarded to it, tagged with the host thread name, which
/// is `pid-<n>` for threads running user programs. Returns false if a
/// subscriber or logger was already installed, which is left in place.
pub fn init_logging(verbosity: isize) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(verbosity_to_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .with_target(false)
        .try_init()
        .is_ok()
}
