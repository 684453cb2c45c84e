//! Retention policy engine.
//!
//! One pass runs two independent sweeps:
//! 1. Rule sweep: every configured directory is scanned, each entry is checked
//!    against its rule's period, and all expired paths are removed in one batch.
//! 2. Job sweep: `J######` directories under the job root are checked against
//!    the fixed 30-day period and removed.
//!
//! Neither sweep aborts on a per-directory or per-object failure. Failures are
//! logged and collected into the [`SweepReport`].

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Duration, Utc};

use super::{
    job::{DEFAULT_JOB_ROOT, JOB_MAX_AGE_DAYS, job_max_age, scan_job_directories},
    log::{SweepEvent, SweepKind, SweepLog},
    remover::ObjectRemover,
    scanner::{FilesystemObject, scan},
};
use crate::{
    config::{CleanserConfig, RetentionRule},
    error::CleanserError,
};

/// Paths found expired in one pass, in scan order.
pub type ExpiredSet = Vec<PathBuf>;

/// Expired paths plus the recoverable errors hit while finding them.
#[derive(Debug, Default)]
pub struct Evaluation {
    pub expired: ExpiredSet,
    pub errors: Vec<CleanserError>,
}

/// Result of one sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    pub sweep: SweepKind,
    pub expired: ExpiredSet,
    pub removed: u64,
    pub already_gone: u64,
    pub would_remove: u64,
    /// Recoverable errors only.
    pub errors: Vec<CleanserError>,
}

impl SweepOutcome {
    fn empty(sweep: SweepKind, errors: Vec<CleanserError>) -> Self {
        Self {
            sweep,
            expired: Vec::new(),
            removed: 0,
            already_gone: 0,
            would_remove: 0,
            errors,
        }
    }
}

/// Result of a full pass.
#[derive(Debug)]
pub struct SweepReport {
    pub rules: SweepOutcome,
    pub job_directories: SweepOutcome,
}

impl SweepReport {
    pub fn total_removed(&self) -> u64 {
        self.rules.removed + self.job_directories.removed
    }

    pub fn has_deletions(&self) -> bool {
        self.total_removed() > 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &CleanserError> {
        self.rules.errors.iter().chain(&self.job_directories.errors)
    }
}

/// Composes scanning, age evaluation and removal.
pub struct RetentionPolicyEngine {
    rules: Vec<RetentionRule>,
    job_root: PathBuf,
    dry_run: bool,
    log: Arc<dyn SweepLog>,
}

impl RetentionPolicyEngine {
    pub fn new(rules: Vec<RetentionRule>, log: Arc<dyn SweepLog>) -> Self {
        Self {
            rules,
            job_root: PathBuf::from(DEFAULT_JOB_ROOT),
            dry_run: false,
            log,
        }
    }

    pub fn from_config(config: &CleanserConfig, log: Arc<dyn SweepLog>) -> Self {
        Self::new(config.directories.clone(), log).with_dry_run(config.dry_run)
    }

    /// Scan job directories somewhere other than [`DEFAULT_JOB_ROOT`].
    pub fn with_job_root(mut self, job_root: impl Into<PathBuf>) -> Self {
        self.job_root = job_root.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn rules(&self) -> &[RetentionRule] {
        &self.rules
    }

    pub fn job_root(&self) -> &Path {
        &self.job_root
    }

    /// Run both sweeps against `now`.
    pub fn run(&self, now: DateTime<Utc>) -> SweepReport {
        SweepReport {
            rules: self.sweep_rules(now),
            job_directories: self.sweep_job_directories(now),
        }
    }

    pub fn sweep_rules(&self, now: DateTime<Utc>) -> SweepOutcome {
        self.log.info(&SweepEvent::SweepStarted {
            sweep: SweepKind::Rules,
            reference_time: now,
        });
        let evaluation = self.expired_by_rules(now);
        self.remove_expired(SweepKind::Rules, evaluation)
    }

    pub fn sweep_job_directories(&self, now: DateTime<Utc>) -> SweepOutcome {
        self.log.info(&SweepEvent::SweepStarted {
            sweep: SweepKind::JobDirectories,
            reference_time: now,
        });
        let evaluation = self.expired_job_directories(now);
        self.remove_expired(SweepKind::JobDirectories, evaluation)
    }

    /// Find expired entries across every configured directory. Removes nothing.
    pub fn expired_by_rules(&self, now: DateTime<Utc>) -> Evaluation {
        let log = self.log.as_ref();
        let scanned = scan(&self.rules, log);

        let mut evaluation = Evaluation {
            expired: Vec::new(),
            errors: scanned.errors.into_iter().map(CleanserError::from).collect(),
        };

        for entry in scanned.objects {
            let rule = entry.rule;
            self.evaluate(entry.object, rule.max_age(), rule.period, now, &mut evaluation);
        }

        evaluation
    }

    /// Find expired job directories under the job root. Removes nothing.
    pub fn expired_job_directories(&self, now: DateTime<Utc>) -> Evaluation {
        let log = self.log.as_ref();
        let mut evaluation = Evaluation::default();

        match scan_job_directories(&self.job_root, log) {
            Ok(candidates) => {
                let max_age = job_max_age();
                for object in candidates {
                    self.evaluate(object, max_age, JOB_MAX_AGE_DAYS, now, &mut evaluation);
                }
            }
            Err(e) => {
                log.error(&SweepEvent::ScanFailed {
                    directory: e.directory.clone(),
                    error: e.source.to_string(),
                });
                evaluation.errors.push(e.into());
            }
        }

        evaluation
    }

    fn evaluate(
        &self,
        object: FilesystemObject,
        max_age: Duration,
        max_age_days: u32,
        now: DateTime<Utc>,
        evaluation: &mut Evaluation,
    ) {
        match object.is_expired(now, max_age) {
            Ok(true) => {
                self.log.debug(&SweepEvent::Expired {
                    path: object.path().to_path_buf(),
                    max_age_days,
                });
                evaluation.expired.push(object.into_path());
            }
            Ok(false) => {}
            Err(e) => self.log.warn(&SweepEvent::EntrySkipped {
                path: object.into_path(),
                error: e.to_string(),
            }),
        }
    }

    fn remove_expired(&self, sweep: SweepKind, evaluation: Evaluation) -> SweepOutcome {
        let Evaluation {
            expired,
            mut errors,
        } = evaluation;

        if expired.is_empty() {
            self.log.info(&SweepEvent::NothingToDo { sweep });
            return SweepOutcome::empty(sweep, errors);
        }

        let summary = ObjectRemover::new(self.log.as_ref())
            .with_dry_run(self.dry_run)
            .remove(&expired);
        errors.extend(summary.failed.into_iter().map(CleanserError::from));

        self.log.info(&SweepEvent::SweepComplete {
            sweep,
            expired: expired.len(),
            removed: summary.removed,
            failed: errors.len(),
            dry_run: self.dry_run,
        });

        SweepOutcome {
            sweep,
            expired,
            removed: summary.removed,
            already_gone: summary.already_gone,
            would_remove: summary.would_remove,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::SubsecRound;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::LogLevel,
        retention::log::RecordingLog,
        test_utils::{aged_dir, aged_file, set_mtime},
    };

    struct Fixture {
        logs: TempDir,
        jobs: TempDir,
        log: Arc<RecordingLog>,
        now: DateTime<Utc>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                logs: TempDir::new().unwrap(),
                jobs: TempDir::new().unwrap(),
                log: Arc::new(RecordingLog::new()),
                // Whole seconds, so coarse filesystem timestamps cannot shift a boundary.
                now: Utc::now().trunc_subsecs(0),
            }
        }

        fn engine(&self, rules: Vec<RetentionRule>) -> RetentionPolicyEngine {
            RetentionPolicyEngine::new(rules, self.log.clone()).with_job_root(self.jobs.path())
        }

        fn daily_rule(&self) -> RetentionRule {
            RetentionRule::new(self.logs.path(), 1)
        }
    }

    #[test]
    fn test_rule_sweep_scenario() {
        let fx = Fixture::new();
        let two_days = aged_file(fx.logs.path(), "a.log", fx.now - Duration::days(2));
        let hours_25 = aged_file(fx.logs.path(), "b.log", fx.now - Duration::hours(25));
        let fresh = aged_file(fx.logs.path(), "c.log", fx.now - Duration::minutes(5));

        let engine = fx.engine(vec![fx.daily_rule()]);
        let outcome = engine.sweep_rules(fx.now);

        assert_eq!(outcome.expired, vec![two_days.clone(), hours_25.clone()]);
        assert_eq!(outcome.removed, 2);
        assert!(outcome.errors.is_empty());
        assert!(!two_days.exists());
        assert!(!hours_25.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn test_rule_sweep_is_idempotent() {
        let fx = Fixture::new();
        aged_file(fx.logs.path(), "old", fx.now - Duration::days(3));
        aged_file(fx.logs.path(), "new", fx.now);

        let engine = fx.engine(vec![fx.daily_rule()]);
        assert_eq!(engine.sweep_rules(fx.now).removed, 1);

        assert!(engine.expired_by_rules(fx.now).expired.is_empty());
        let second = engine.sweep_rules(fx.now);
        assert!(second.expired.is_empty());
        assert_eq!(second.removed, 0);
    }

    #[test]
    fn test_nothing_to_do_skips_removal() {
        let fx = Fixture::new();
        aged_file(fx.logs.path(), "fresh", fx.now);

        let engine = fx.engine(vec![fx.daily_rule()]);
        let outcome = engine.sweep_rules(fx.now);

        assert!(outcome.expired.is_empty());
        let info = fx.log.at(LogLevel::Info);
        assert!(info.contains(&SweepEvent::NothingToDo {
            sweep: SweepKind::Rules
        }));
        assert!(
            !info
                .iter()
                .any(|e| matches!(e, SweepEvent::SweepComplete { .. }))
        );
    }

    #[test]
    fn test_expired_set_spans_all_rules() {
        let fx = Fixture::new();
        let other = TempDir::new().unwrap();
        let a = aged_file(fx.logs.path(), "a", fx.now - Duration::days(2));
        let b = aged_file(other.path(), "b", fx.now - Duration::days(8));
        let c = aged_file(other.path(), "c", fx.now - Duration::days(6));

        let engine = fx.engine(vec![fx.daily_rule(), RetentionRule::new(other.path(), 7)]);
        let outcome = engine.sweep_rules(fx.now);

        assert_eq!(outcome.expired, vec![a, b]);
        assert!(c.exists());

        let completes: Vec<_> = fx
            .log
            .at(LogLevel::Info)
            .into_iter()
            .filter(|e| matches!(e, SweepEvent::SweepComplete { .. }))
            .collect();
        assert_eq!(completes.len(), 1);
    }

    #[test]
    fn test_bad_rule_does_not_stop_others() {
        let fx = Fixture::new();
        let old = aged_file(fx.logs.path(), "old", fx.now - Duration::days(2));
        let missing = fx.logs.path().join("missing");

        let engine = fx.engine(vec![RetentionRule::new(&missing, 1), fx.daily_rule()]);
        let outcome = engine.sweep_rules(fx.now);

        assert!(!old.exists());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors.iter().all(|e| !e.is_fatal()));
    }

    #[test]
    fn test_rule_sweep_removes_old_subdirectory_only_if_empty() {
        let fx = Fixture::new();
        let empty = aged_dir(fx.logs.path(), "empty", fx.now - Duration::days(5));
        let full = fx.logs.path().join("full");
        std::fs::create_dir(&full).unwrap();
        aged_file(&full, "keep", fx.now);
        set_mtime(&full, fx.now - Duration::days(5));

        let engine = fx.engine(vec![fx.daily_rule()]);
        let outcome = engine.sweep_rules(fx.now);

        assert!(!empty.exists());
        assert!(full.join("keep").exists());
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_job_sweep_scenario() {
        let fx = Fixture::new();
        let old_job = aged_dir(fx.jobs.path(), "J000001", fx.now - Duration::days(40));
        let new_job = aged_dir(fx.jobs.path(), "J000002", fx.now - Duration::days(5));
        let not_a_job = aged_dir(fx.jobs.path(), "notajob", fx.now - Duration::days(40));

        let engine = fx.engine(Vec::new());
        let outcome = engine.sweep_job_directories(fx.now);

        assert_eq!(outcome.expired, vec![old_job.clone()]);
        assert_eq!(outcome.removed, 1);
        assert!(!old_job.exists());
        assert!(new_job.exists());
        assert!(not_a_job.exists());
    }

    #[test]
    fn test_job_threshold_is_strict() {
        let fx = Fixture::new();
        let at_limit = aged_dir(fx.jobs.path(), "J000010", fx.now - Duration::days(30));
        let past_limit = aged_dir(
            fx.jobs.path(),
            "J000011",
            fx.now - Duration::days(30) - Duration::seconds(1),
        );

        let engine = fx.engine(Vec::new());
        let evaluation = engine.expired_job_directories(fx.now);

        assert_eq!(evaluation.expired, vec![past_limit]);
        assert!(at_limit.exists());
    }

    #[test]
    fn test_job_threshold_ignores_rule_periods() {
        let fx = Fixture::new();
        let job = aged_dir(fx.jobs.path(), "J000003", fx.now - Duration::days(10));

        // A 1-day rule pointed at the job root must not shorten the job policy.
        let engine = fx.engine(vec![RetentionRule::new(fx.jobs.path(), 1)]);
        assert!(engine.expired_job_directories(fx.now).expired.is_empty());
        assert!(job.exists());
    }

    #[test]
    fn test_non_empty_job_directory_survives() {
        let fx = Fixture::new();
        let job = fx.jobs.path().join("J000004");
        std::fs::create_dir(&job).unwrap();
        aged_file(&job, "core.dump", fx.now - Duration::days(40));
        set_mtime(&job, fx.now - Duration::days(40));

        let engine = fx.engine(Vec::new());
        let outcome = engine.sweep_job_directories(fx.now);

        assert_eq!(outcome.expired, vec![job.clone()]);
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.errors.len(), 1);
        assert!(job.join("core.dump").exists());
        assert_eq!(fx.log.at(LogLevel::Error).len(), 1);
    }

    #[test]
    fn test_missing_job_root_is_recoverable() {
        let fx = Fixture::new();
        let old = aged_file(fx.logs.path(), "old", fx.now - Duration::days(2));

        let engine = RetentionPolicyEngine::new(vec![fx.daily_rule()], fx.log.clone())
            .with_job_root(fx.jobs.path().join("absent"));
        let report = engine.run(fx.now);

        assert_eq!(report.rules.removed, 1);
        assert!(!old.exists());
        assert_eq!(report.job_directories.errors.len(), 1);
        assert_eq!(report.errors().count(), 1);
        assert!(report.errors().all(|e| !e.is_fatal()));
    }

    #[test]
    fn test_full_run_report() {
        let fx = Fixture::new();
        aged_file(fx.logs.path(), "old", fx.now - Duration::days(2));
        aged_dir(fx.jobs.path(), "J000001", fx.now - Duration::days(31));

        let engine = fx.engine(vec![fx.daily_rule()]);
        let report = engine.run(fx.now);

        assert_eq!(report.rules.sweep, SweepKind::Rules);
        assert_eq!(report.job_directories.sweep, SweepKind::JobDirectories);
        assert_eq!(report.total_removed(), 2);
        assert!(report.has_deletions());
        assert_eq!(report.errors().count(), 0);
    }

    #[test]
    fn test_dry_run_keeps_everything() {
        let fx = Fixture::new();
        let old = aged_file(fx.logs.path(), "old", fx.now - Duration::days(2));
        let job = aged_dir(fx.jobs.path(), "J000001", fx.now - Duration::days(31));

        let engine = fx.engine(vec![fx.daily_rule()]).with_dry_run(true);
        let report = engine.run(fx.now);

        assert!(old.exists());
        assert!(job.exists());
        assert!(!report.has_deletions());
        assert_eq!(report.rules.would_remove, 1);
        assert_eq!(report.job_directories.would_remove, 1);
    }

    #[test]
    fn test_from_config() {
        let config = CleanserConfig {
            directories: vec![RetentionRule::new("/tmp", 3)],
            dry_run: true,
            ..Default::default()
        };
        let engine = RetentionPolicyEngine::from_config(&config, Arc::new(RecordingLog::new()));

        assert_eq!(engine.rules(), config.directories.as_slice());
        assert!(engine.dry_run);
        assert_eq!(engine.job_root(), Path::new(DEFAULT_JOB_ROOT));
    }
}
