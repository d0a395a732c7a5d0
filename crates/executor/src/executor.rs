//! The Executor - single entry point to the tcestore engine.
//!
//! The Executor is a stateless dispatcher that routes commands to the
//! database and converts results to outputs.

use std::sync::Arc;

use serde_json::Value;
use tcestore_core::Document;
use tcestore_engine::{Database, SubmitOutcome};
use tcestore_security::{AccessMode, Authorizer};
use tracing::debug;

use crate::{Command, Error, Output, Result};

/// The command executor - single entry point to the engine.
///
/// The Executor holds a database handle, the delete authorizer and the
/// access mode, and no state of its own.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use tcestore_executor::{Command, Executor};
/// use tcestore_security::DenyAll;
///
/// let executor = Executor::new(db, Arc::new(DenyAll));
/// let output = executor.execute(Command::GetLatest { key: "A".into() })?;
/// ```
pub struct Executor {
    db: Arc<Database>,
    authorizer: Arc<dyn Authorizer>,
    access_mode: AccessMode,
}

impl Executor {
    /// Create a read-write executor.
    pub fn new(db: Arc<Database>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self::new_with_mode(db, authorizer, AccessMode::ReadWrite)
    }

    /// Create an executor with an explicit access mode.
    pub fn new_with_mode(
        db: Arc<Database>,
        authorizer: Arc<dyn Authorizer>,
        access_mode: AccessMode,
    ) -> Self {
        Self {
            db,
            authorizer,
            access_mode,
        }
    }

    /// Access mode of this executor.
    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    /// Underlying database handle.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Execute a single command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        if self.access_mode == AccessMode::ReadOnly && cmd.is_write() {
            return Err(Error::AccessDenied {
                command: cmd.name().to_string(),
            });
        }
        debug!(target: "tcestore::executor", command = cmd.name(), "Executing command");

        match cmd {
            Command::Submit { document } => {
                let document = to_document(document)?;
                let key = document.record_key()?;
                let outcome = self.db.submit(key.as_str(), &document)?;
                Ok(submit_output(key.to_string(), outcome))
            }
            Command::SubmitKeyed { key, document } => {
                let document = to_document(document)?;
                let outcome = self.db.submit(&key, &document)?;
                Ok(submit_output(key, outcome))
            }
            Command::ListRecords => Ok(Output::Records(self.db.list_records()?)),
            Command::GetLatest { key } => {
                let snapshot = self.db.get_latest(&key)?;
                Ok(Output::Snapshot {
                    key,
                    version: snapshot.version,
                    document: snapshot.document.into_value(),
                })
            }
            Command::GetVersion { key, version } => {
                let snapshot = self.db.get_version(&key, version)?;
                Ok(Output::Snapshot {
                    key,
                    version: snapshot.version,
                    document: snapshot.document.into_value(),
                })
            }
            Command::ListVersions { key } => {
                let versions = self.db.list_versions(&key)?;
                Ok(Output::Versions { key, versions })
            }
            Command::Delete { key, credential } => {
                let existed =
                    self.db
                        .delete(&key, credential.as_deref(), self.authorizer.as_ref())?;
                Ok(Output::Deleted { key, existed })
            }
            Command::Repair => Ok(Output::Repaired(self.db.repair()?)),
        }
    }

    /// Execute several commands in order, collecting every result.
    ///
    /// A failing command does not stop the ones after it.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }
}

fn to_document(value: Value) -> Result<Document> {
    Ok(Document::new(value)?)
}

fn submit_output(key: String, outcome: SubmitOutcome) -> Output {
    match outcome {
        SubmitOutcome::Unchanged { version } => Output::Unchanged { key, version },
        SubmitOutcome::NewVersion { version, path } => Output::Saved { key, version, path },
    }
}
