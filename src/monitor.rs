use crate::report::UsageReporter;
use crate::status::{self, Snapshot};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Usernames present in `previous` but absent from `current`.
///
/// Pure key-set difference. A user present in both snapshots is still
/// connected even if its counters changed; a user only in `current` is a
/// new connection and needs no action.
pub fn disconnected_usernames(previous: &Snapshot, current: &Snapshot) -> HashSet<String> {
    previous
        .keys()
        .filter(|username| !current.contains_key(*username))
        .cloned()
        .collect()
}

/// Watches one status log and reports final usage for sessions that ended.
///
/// Keeps two generations of snapshots: the one just read and the one from
/// the previous cycle. Both are exclusively owned by this monitor, so two
/// monitors never share state.
pub struct Monitor {
    label: &'static str,
    status_file: PathBuf,
    period: Duration,
    reporter: UsageReporter,
    previous: Snapshot,
    current: Snapshot,
}

impl Monitor {
    pub fn new(
        label: &'static str,
        status_file: PathBuf,
        period: Duration,
        reporter: UsageReporter,
    ) -> Self {
        Self {
            label,
            status_file,
            period,
            reporter,
            previous: Snapshot::new(),
            current: Snapshot::new(),
        }
    }

    pub async fn run(mut self) {
        info!(
            "Watching {} status log: {}",
            self.label,
            self.status_file.display()
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.period).await;
        }
    }

    /// One read -> diff -> report -> rotate pass.
    async fn run_cycle(&mut self) {
        self.current = match status::read_snapshot(&self.status_file) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // The daemon rewrites the status file on its own period; a
                // transiently unreadable file must not turn every connected
                // user into a disconnect report. Keep the previous snapshot
                // and try again next cycle.
                warn!(
                    "Cannot read {} status log {}, skipping cycle: {}",
                    self.label,
                    self.status_file.display(),
                    e
                );
                return;
            }
        };

        for username in disconnected_usernames(&self.previous, &self.current) {
            debug!("User disconnected from {}: {}", self.label, username);

            // Last-known counters are the ones observed before the user
            // disappeared.
            if let Some(session) = self.previous.get(&username) {
                if let Err(e) = self.reporter.report(session).await {
                    error!("Cannot update bandwidth for user {}: {}", username, e);
                }
            }
        }

        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.clear();
    }
}
