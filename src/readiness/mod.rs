//! Readiness polling for freshly created clusters
//!
//! A cluster is ready once `kubectl cluster-info` succeeds and `kubectl get
//! nodes` lists at least one node whose status is `Ready`. Polling runs on a
//! fixed interval until the overall timeout; only read-only commands are
//! retried.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::backend::KindBackend;
use crate::config::WaitConfig;
use crate::runner::CommandRunner;
use crate::{Error, Result};

/// Source of time for the poll loop
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
    /// Block for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Polls a cluster until it is ready or the timeout passes
pub struct ReadinessWaiter<'a, R: CommandRunner + ?Sized, C: Clock + ?Sized> {
    backend: &'a KindBackend<'a, R>,
    clock: &'a C,
    wait: WaitConfig,
}

impl<'a, R: CommandRunner + ?Sized, C: Clock + ?Sized> ReadinessWaiter<'a, R, C> {
    /// Create a waiter using the backend's wait bounds
    pub fn new(backend: &'a KindBackend<'a, R>, clock: &'a C) -> Self {
        let wait = backend.config().wait;
        Self {
            backend,
            clock,
            wait,
        }
    }

    /// Block until `name` is ready, or fail with [`Error::Timeout`]
    ///
    /// Bounds that fail [`WaitConfig::validate`] are rejected before the
    /// first poll.
    pub fn wait_ready(&self, name: &str) -> Result<()> {
        self.wait.validate()?;
        let start = self.clock.now();
        let deadline = start
            .checked_add(self.wait.timeout)
            .ok_or_else(|| Error::validation("readiness timeout overflows the clock"))?;
        let mut attempt = 0u32;

        info!(
            cluster = %name,
            timeout_secs = self.wait.timeout.as_secs(),
            "Waiting for cluster to be ready"
        );

        loop {
            attempt += 1;
            if self.poll(name) {
                info!(cluster = %name, attempt, "Cluster is ready");
                return Ok(());
            }

            let now = self.clock.now();
            if now >= deadline {
                warn!(cluster = %name, attempt, "Cluster did not become ready in time");
                return Err(Error::timeout(name, now.duration_since(start)));
            }

            debug!(cluster = %name, attempt, "Cluster not ready yet");
            self.clock.sleep(self.wait.interval.min(deadline - now));
        }
    }

    /// One readiness check; any failure reads as "not yet"
    fn poll(&self, name: &str) -> bool {
        match self.backend.cluster_info(name) {
            Ok((_, output)) if output.success => {}
            _ => return false,
        }
        match self.backend.get_nodes(name) {
            Ok((_, output)) if output.success => any_node_ready(&output.stdout),
            _ => false,
        }
    }
}

/// Whether `kubectl get nodes` output lists a node in the `Ready` condition
///
/// The STATUS column may carry extra conditions (`Ready,SchedulingDisabled`);
/// `NotReady` does not count.
pub fn any_node_ready(nodes_output: &str) -> bool {
    nodes_output
        .lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let node = columns.next()?;
            let status = columns.next()?;
            (node != "NAME").then_some(status)
        })
        .any(|status| status.split(',').any(|condition| condition == "Ready"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::runner::{CommandOutput, MockCommandRunner};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Clock that advances only when slept on
    struct FakeClock {
        now: Mutex<Instant>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
                sleeps: Mutex::new(Vec::new()),
            }
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }

        fn sleep(&self, duration: Duration) {
            *self.now.lock().unwrap() += duration;
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    const READY: &str = "t1-control-plane   Ready    control-plane   2m   v1.28.0\n";
    const NOT_READY: &str = "t1-control-plane   NotReady   control-plane   10s   v1.28.0\n";

    fn config(interval: u64, timeout: u64) -> ProviderConfig {
        ProviderConfig::default().with_wait(WaitConfig {
            interval: Duration::from_secs(interval),
            timeout: Duration::from_secs(timeout),
        })
    }

    // ==========================================================================
    // Story Tests: Waiting for a New Cluster
    // ==========================================================================

    /// Story: A cluster that is ready on the first poll returns immediately
    #[test]
    fn story_ready_on_first_poll() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|inv| {
            if inv.starts_with(&["cluster-info"]) {
                Ok(CommandOutput::ok("Kubernetes control plane is running"))
            } else {
                Ok(CommandOutput::ok(READY))
            }
        });
        let config = config(5, 300);
        let backend = KindBackend::new(&runner, &config);
        let clock = FakeClock::new();

        ReadinessWaiter::new(&backend, &clock).wait_ready("t1").unwrap();
        assert!(clock.sleeps.lock().unwrap().is_empty());
    }

    /// Story: The API server comes up first, nodes go Ready a few polls later
    #[test]
    fn story_ready_after_nodes_settle() {
        let node_polls = Arc::new(AtomicU32::new(0));
        let polls = node_polls.clone();

        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(move |inv| {
            if inv.starts_with(&["cluster-info"]) {
                return Ok(CommandOutput::ok("running"));
            }
            if polls.fetch_add(1, Ordering::SeqCst) < 2 {
                Ok(CommandOutput::ok(NOT_READY))
            } else {
                Ok(CommandOutput::ok(READY))
            }
        });
        let config = config(5, 300);
        let backend = KindBackend::new(&runner, &config);
        let clock = FakeClock::new();

        ReadinessWaiter::new(&backend, &clock).wait_ready("t1").unwrap();
        assert_eq!(node_polls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *clock.sleeps.lock().unwrap(),
            vec![Duration::from_secs(5), Duration::from_secs(5)]
        );
    }

    /// Story: Nodes are not checked while the API server is unreachable
    #[test]
    fn story_cluster_info_gates_node_check() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.starts_with(&["cluster-info"]))
            .returning(|_| Ok(CommandOutput::failed("The connection to the server was refused")));
        runner
            .expect_run()
            .withf(|inv| inv.starts_with(&["get", "nodes"]))
            .never();
        let config = config(5, 15);
        let backend = KindBackend::new(&runner, &config);
        let clock = FakeClock::new();

        let err = ReadinessWaiter::new(&backend, &clock).wait_ready("t1").unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    /// Story: A cluster stuck in NotReady times out at the bound
    #[test]
    fn story_not_ready_times_out() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|inv| {
            if inv.starts_with(&["cluster-info"]) {
                Ok(CommandOutput::ok("running"))
            } else {
                Ok(CommandOutput::ok(NOT_READY))
            }
        });
        let config = config(5, 12);
        let backend = KindBackend::new(&runner, &config);
        let clock = FakeClock::new();

        match ReadinessWaiter::new(&backend, &clock).wait_ready("t1") {
            Err(Error::Timeout { name, waited }) => {
                assert_eq!(name, "t1");
                assert_eq!(waited, Duration::from_secs(12));
            }
            other => panic!("Expected Timeout, got {:?}", other),
        }
        // The last sleep is clipped to the deadline
        assert_eq!(
            *clock.sleeps.lock().unwrap(),
            vec![
                Duration::from_secs(5),
                Duration::from_secs(5),
                Duration::from_secs(2)
            ]
        );
    }

    /// Story: Unusable bounds fail fast instead of spinning or overflowing
    ///
    /// A zero interval would poll kubectl back to back, and an enormous
    /// timeout cannot be added to the clock. Neither reaches the runner.
    #[test]
    fn story_unusable_bounds_are_rejected_before_polling() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let clock = FakeClock::new();

        for wait in [
            WaitConfig {
                interval: Duration::ZERO,
                timeout: Duration::from_millis(200),
            },
            WaitConfig {
                interval: Duration::from_secs(5),
                timeout: Duration::from_secs(u64::MAX),
            },
        ] {
            let config = ProviderConfig::default().with_wait(wait);
            let backend = KindBackend::new(&runner, &config);

            let err = ReadinessWaiter::new(&backend, &clock).wait_ready("t1").unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{:?}", err);
        }
        assert!(clock.sleeps.lock().unwrap().is_empty());
    }

    #[test]
    fn test_any_node_ready() {
        assert!(any_node_ready(READY));
        assert!(!any_node_ready(NOT_READY));
        assert!(!any_node_ready(""));
        assert!(!any_node_ready("No resources found\n"));
        assert!(any_node_ready(
            "NAME STATUS ROLES AGE VERSION\nt1-control-plane Ready control-plane 1m v1.28.0\n"
        ));
        assert!(any_node_ready(
            "t1-worker NotReady <none> 1m v1.28.0\nt1-control-plane Ready,SchedulingDisabled control-plane 1m v1.28.0\n"
        ));
        assert!(!any_node_ready("NAME STATUS ROLES AGE VERSION\n"));
    }
}
