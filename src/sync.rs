use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::StoreError;
use crate::session::{NewSession, Session};
use crate::settings::TimerConfiguration;
use crate::store::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncJob {
    SaveSession(NewSession),
    SaveSettings(TimerConfiguration),
}

#[derive(Debug)]
pub enum SyncOutcome {
    SessionSaved(Session),
    SessionFailed(NewSession, StoreError),
    SettingsSaved(TimerConfiguration),
    SettingsFailed(TimerConfiguration, StoreError),
}

/// Runs store writes on a background thread. Submitting never blocks;
/// outcomes are collected later with `try_recv`.
pub struct SyncWorker {
    jobs: Option<Sender<SyncJob>>,
    outcomes: Receiver<SyncOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    pub fn spawn(store: Box<dyn SessionStore>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<SyncJob>();
        let (outcome_tx, outcome_rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            for job in job_rx {
                let outcome = run_job(store.as_ref(), job);
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
            }
        });

        Self {
            jobs: Some(job_tx),
            outcomes: outcome_rx,
            handle: Some(handle),
        }
    }

    /// Queue a job. Returns false if the worker has gone away.
    pub fn submit(&self, job: SyncJob) -> bool {
        match &self.jobs {
            Some(tx) => match tx.send(job) {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(job = ?e.0, "sync worker is gone, dropping job");
                    false
                }
            },
            None => false,
        }
    }

    pub fn try_recv(&self) -> Option<SyncOutcome> {
        self.outcomes.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SyncOutcome> {
        match self.outcomes.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        // closing the queue lets the worker finish what is already submitted
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("sync worker panicked");
            }
        }
    }
}

fn run_job(store: &dyn SessionStore, job: SyncJob) -> SyncOutcome {
    match job {
        SyncJob::SaveSession(new) => match store.write_session(&new) {
            Ok(saved) => {
                tracing::info!(id = %saved.id, date = %saved.date, duration = saved.duration,
                    overtime = saved.overtime, partial = saved.is_partial_completion, "session saved");
                SyncOutcome::SessionSaved(saved)
            }
            Err(e) => SyncOutcome::SessionFailed(new, e),
        },
        SyncJob::SaveSettings(config) => match store.write_settings(&config) {
            Ok(()) => {
                tracing::info!(?config, "timer settings saved");
                SyncOutcome::SettingsSaved(config)
            }
            Err(e) => SyncOutcome::SettingsFailed(config, e),
        },
    }
}
