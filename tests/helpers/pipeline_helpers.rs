//! Helpers for driving an `AnalysisHost` from tests.

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use msbuild::base::{DocumentSnapshot, DocumentVersion};
use msbuild::ide::{AnalysisConfig, AnalysisHost};

const TIMEOUT: Duration = Duration::from_secs(10);

pub fn host() -> AnalysisHost {
    host_with(AnalysisConfig::default().with_worker_threads(4))
}

pub fn host_with(config: AnalysisConfig) -> AnalysisHost {
    AnalysisHost::with_config(config).expect("thread pool")
}

pub fn snapshot(text: &str, version: u64) -> DocumentSnapshot {
    DocumentSnapshot::new(text, DocumentVersion::new(version))
}

/// Poll `condition` until it holds, failing the test after a timeout.
pub fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + TIMEOUT;
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Receive versions until `last` arrives; returns everything received.
pub fn versions_until(rx: &Receiver<u64>, last: u64) -> Vec<u64> {
    let mut seen = Vec::new();
    while seen.last() != Some(&last) {
        seen.push(rx.recv_timeout(TIMEOUT).expect("notification"));
    }
    seen
}

/// Assert a sequence of versions is strictly increasing.
pub fn assert_strictly_increasing(versions: &[u64]) {
    assert!(
        versions.windows(2).all(|w| w[0] < w[1]),
        "versions went backwards: {versions:?}"
    );
}
