//! Drives a repository through the fixed operation sequence and times every
//! call.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{
    backends::{OrmAuthorRepository, SqlxAuthorRepository},
    config::Config,
    db::redact,
    error::Error,
    fixtures::AuthorFactory,
    report::{fmt_duration, BackendReport, Comparison, Operation, OperationStats},
    traits::AuthorRepository,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchSettings {
    pub iterations:  usize,
    pub seed:        Option<u64>,
    pub fresh_start: bool,
}

impl From<&Config> for BenchSettings {
    fn from(config: &Config) -> Self {
        Self {
            iterations:  config.iterations,
            seed:        config.seed,
            fresh_start: config.fresh_start,
        }
    }
}

/// Samples collected for one operation of one backend.
struct Phase {
    operation: Operation,
    samples:   Vec<Duration>,
    misses:    usize,
}

impl Phase {
    fn new(operation: Operation, capacity: usize) -> Self {
        Self {
            operation,
            samples: Vec::with_capacity(capacity),
            misses: 0,
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.samples.push(elapsed);
    }

    /// Records a probe call. A missing row counts as a miss, anything else
    /// ends the run.
    fn probe<T>(
        &mut self,
        backend: &str,
        elapsed: Duration,
        res: crate::Result<T>,
    ) -> Result<()> {
        self.record(elapsed);
        match res {
            Ok(_) => Ok(()),
            Err(Error::NotFound { id }) => {
                debug!("[{backend}] {} missed author {id}", self.operation);
                self.misses += 1;
                Ok(())
            }
            Err(e) => Err(e).with_context(|| failed(backend, self.operation)),
        }
    }

    fn finish(self, backend: &str) -> OperationStats {
        let stats = OperationStats::from_samples(self.operation, &self.samples, self.misses);
        info!(
            "[{backend}] {} took {}",
            self.operation,
            fmt_duration(stats.total)
        );
        stats
    }
}

fn failed(backend: &str, operation: Operation) -> String {
    format!("[{backend}] {operation} failed")
}

#[derive(Debug, Clone)]
pub struct Runner {
    settings: BenchSettings,
}

impl Runner {
    pub fn new(settings: BenchSettings) -> crate::Result<Self> {
        if settings.iterations == 0 {
            return Err(Error::Configuration(
                "iterations must be greater than zero".into(),
            ));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &BenchSettings {
        &self.settings
    }

    /// Runs every [`Operation`] `iterations` times against `repo`, in the
    /// order of [`Operation::ALL`].
    pub async fn run<R: AuthorRepository>(&self, repo: &R) -> Result<BackendReport> {
        let backend = repo.name();
        let n = self.settings.iterations;
        let mut factory = AuthorFactory::new(self.settings.seed);
        let mut operations = Vec::with_capacity(Operation::ALL.len());

        repo.create_table()
            .await
            .with_context(|| format!("[{backend}] creating table failed"))?;
        if self.settings.fresh_start {
            repo.reset()
                .await
                .with_context(|| format!("[{backend}] clearing table failed"))?;
        }
        info!("[{backend}] Running {n} iterations per operation.");

        let mut phase = Phase::new(Operation::CreateAuthor, n);
        let mut ids = Vec::with_capacity(n);
        for _ in 0..n {
            let author = factory.author();
            let start = Instant::now();
            let id = repo
                .create(&author)
                .await
                .with_context(|| failed(backend, phase.operation))?;
            phase.record(start.elapsed());
            ids.push(id);
        }
        operations.push(phase.finish(backend));

        let mut phase = Phase::new(Operation::GetAuthor, n);
        for id in &ids {
            let start = Instant::now();
            let res = repo.get(*id).await;
            phase.probe(backend, start.elapsed(), res)?;
        }
        operations.push(phase.finish(backend));

        let mut phase = Phase::new(Operation::ListAuthors, n);
        let mut listed_rows = 0;
        for _ in 0..n {
            let start = Instant::now();
            let authors = repo
                .list()
                .await
                .with_context(|| failed(backend, phase.operation))?;
            phase.record(start.elapsed());
            listed_rows = authors.len();
        }
        operations.push(phase.finish(backend));

        let mut phase = Phase::new(Operation::UpdateAuthor, n);
        for id in &ids {
            let author = factory.author();
            let start = Instant::now();
            repo.update(*id, &author)
                .await
                .with_context(|| failed(backend, phase.operation))?;
            phase.record(start.elapsed());
        }
        operations.push(phase.finish(backend));

        let mut phase = Phase::new(Operation::GetAuthorsByBirthdateRange, n);
        for _ in 0..n {
            let (from, to) = factory.birthdate_range();
            let start = Instant::now();
            repo.list_by_birthdate_range(from, to)
                .await
                .with_context(|| failed(backend, phase.operation))?;
            phase.record(start.elapsed());
        }
        operations.push(phase.finish(backend));

        let mut phase = Phase::new(Operation::DeleteAuthor, n);
        for id in &ids {
            let start = Instant::now();
            let res = repo.delete(*id).await;
            phase.probe(backend, start.elapsed(), res)?;
        }
        operations.push(phase.finish(backend));

        Ok(BackendReport {
            backend,
            operations,
            listed_rows,
        })
    }
}

/// Connects the backends `config` selects, benchmarks them one after the
/// other and closes them again.
pub async fn run(config: &Config) -> Result<Comparison> {
    let runner = Runner::new(BenchSettings::from(config))?;

    let mut sqlx = None;
    if config.backends.includes_sqlx() {
        let url = config.sqlx.connection_url();
        info!("[{}] Connecting to {}.", SqlxAuthorRepository::NAME, redact(&url));
        let repo = SqlxAuthorRepository::connect(&url)
            .await
            .context("Failed to connect the sqlx backend")?;
        sqlx = Some(repo);
    }
    let mut orm = None;
    if config.backends.includes_orm() {
        let url = config.orm.connection_url();
        info!("[{}] Connecting to {}.", OrmAuthorRepository::NAME, redact(&url));
        let repo = OrmAuthorRepository::connect(&url)
            .await
            .context("Failed to connect the orm backend")?;
        orm = Some(repo);
    }

    let mut reports = Vec::new();
    if let Some(repo) = &sqlx {
        let report = runner.run(repo).await;
        repo.close().await;
        reports.push(report?);
    }
    if let Some(repo) = orm {
        let report = runner.run(&repo).await;
        repo.close().await?;
        reports.push(report?);
    }
    Ok(Comparison::new(runner.settings().iterations, reports))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_iterations_is_rejected() {
        let settings = BenchSettings {
            iterations:  0,
            seed:        None,
            fresh_start: true,
        };
        assert!(matches!(
            Runner::new(settings),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn probe_counts_misses() {
        let mut phase = Phase::new(Operation::GetAuthor, 2);
        phase
            .probe::<()>("SQLX", Duration::from_millis(1), Err(Error::NotFound { id: 1 }))
            .unwrap();
        phase
            .probe("SQLX", Duration::from_millis(1), Ok(()))
            .unwrap();
        let stats = phase.finish("SQLX");
        assert_eq!(stats.calls, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn probe_fails_on_other_errors() {
        let mut phase = Phase::new(Operation::DeleteAuthor, 1);
        let err = phase
            .probe::<()>(
                "ORM",
                Duration::from_millis(1),
                Err(Error::Connection("refused".into())),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "[ORM] DeleteAuthor failed");
    }
}
