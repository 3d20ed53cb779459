//! Error types for the lifecycle system

/// Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Which hook a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    /// The creation hook, fired after a value is stored
    Create,
    /// The destruction hook, fired before a value is replaced or cleared
    Destroy,
}

impl std::fmt::Display for HookStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookStage::Create => write!(f, "create"),
            HookStage::Destroy => write!(f, "destroy"),
        }
    }
}

/// Errors that can occur in the lifecycle system
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LifecycleError {
    /// A registered creation/destruction hook failed
    #[error("{stage} hook failed: {message}")]
    HookFailed {
        /// Which hook failed
        stage: HookStage,
        /// Error message
        message: String,
    },

    /// The creator hook failed while starting a worker
    #[error("worker '{owner}' failed to start: {source}")]
    StartFailed {
        /// Owner name the worker was started for
        owner: String,
        /// The underlying hook failure
        #[source]
        source: Box<LifecycleError>,
    },

    /// The destructor hook failed while stopping a worker
    #[error("worker failed to stop: {source}")]
    StopFailed {
        /// The underlying hook failure
        #[source]
        source: Box<LifecycleError>,
    },

    /// Failed to spawn the worker thread
    #[error("failed to spawn worker thread '{thread_name}': {message}")]
    Spawn {
        /// Name of the thread that failed to spawn
        thread_name: String,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// The lifecycle is already running
    #[error("worker '{owner}' is already running")]
    AlreadyRunning {
        /// Owner name of the running worker
        owner: String,
    },

    /// The message loop has been asked to quit or has exited
    #[error("message loop is stopped")]
    LoopStopped,

    /// A dispatched message panicked on the worker thread
    #[error("worker thread '{thread_name}' panicked: {message}")]
    WorkerPanic {
        /// Name of the panicked thread
        thread_name: String,
        /// Panic message
        message: String,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl LifecycleError {
    /// Create a hook failure error
    pub fn hook_failed(stage: HookStage, message: impl Into<String>) -> Self {
        LifecycleError::HookFailed {
            stage,
            message: message.into(),
        }
    }

    /// Create a start failure wrapping the hook error that caused it
    pub fn start_failed(owner: impl Into<String>, source: LifecycleError) -> Self {
        LifecycleError::StartFailed {
            owner: owner.into(),
            source: Box::new(source),
        }
    }

    /// Create a stop failure wrapping the hook error that caused it
    pub fn stop_failed(source: LifecycleError) -> Self {
        LifecycleError::StopFailed {
            source: Box::new(source),
        }
    }

    /// Create a spawn error
    pub fn spawn(thread_name: impl Into<String>, message: impl Into<String>) -> Self {
        LifecycleError::Spawn {
            thread_name: thread_name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        thread_name: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LifecycleError::Spawn {
            thread_name: thread_name.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an already running error
    pub fn already_running(owner: impl Into<String>) -> Self {
        LifecycleError::AlreadyRunning {
            owner: owner.into(),
        }
    }

    /// Create a worker panic error
    pub fn worker_panic(thread_name: impl Into<String>, message: impl Into<String>) -> Self {
        LifecycleError::WorkerPanic {
            thread_name: thread_name.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LifecycleError::Other(msg.into())
    }
}
