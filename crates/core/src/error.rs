use tabshell_types::SessionId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
	/// A session store operation failed. The store is external; its error is
	/// carried as-is.
	#[error("session store {op} failed")]
	Store {
		op: &'static str,
		#[source]
		source: anyhow::Error,
	},

	/// The session factory could not materialize a live engine.
	#[error("session factory failed for {id}")]
	Factory {
		id: SessionId,
		#[source]
		source: anyhow::Error,
	},
}

impl ShellError {
	/// Wraps a store failure with the operation name for context.
	pub(crate) fn store(op: &'static str, source: anyhow::Error) -> Self {
		ShellError::Store { op, source }
	}
}
