//! Application configuration: master URL parsing and engine settings.

use std::fmt;
use std::str::FromStr;
use wisp_common::error::{CommonError, Result};

/// Default application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "wisp-app";

/// Default master: local mode using every logical core.
pub const DEFAULT_MASTER: &str = "local[*]";

/// Default number of rows per batch in the SQL engine.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Where the engine runs. Only local, in-process execution is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Master {
    /// `local`: a single worker thread.
    Local,
    /// `local[N]`: N worker threads.
    LocalN(usize),
    /// `local[*]`: one worker thread per logical core.
    LocalAllCores,
}

impl Master {
    /// Number of worker threads this master asks for.
    pub fn num_threads(&self) -> usize {
        match self {
            Master::Local => 1,
            Master::LocalN(n) => *n,
            Master::LocalAllCores => num_cpus::get().max(1),
        }
    }
}

impl FromStr for Master {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "local" {
            return Ok(Master::Local);
        }

        let threads = s
            .strip_prefix("local[")
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| {
                CommonError::configuration_error(format!(
                    "Unsupported master '{}': expected local, local[N] or local[*]",
                    s
                ))
            })?;

        if threads == "*" {
            return Ok(Master::LocalAllCores);
        }

        match threads.parse::<usize>() {
            Ok(0) => Err(CommonError::configuration_error(format!(
                "Master '{}' must request at least one thread",
                s
            ))),
            Ok(n) => Ok(Master::LocalN(n)),
            Err(e) => Err(CommonError::configuration_error_with_source(
                format!("Invalid thread count in master '{}'", s),
                e,
            )),
        }
    }
}

impl fmt::Display for Master {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Master::Local => write!(f, "local"),
            Master::LocalN(n) => write!(f, "local[{}]", n),
            Master::LocalAllCores => write!(f, "local[*]"),
        }
    }
}

impl Default for Master {
    fn default() -> Self {
        Master::LocalAllCores
    }
}

/// Configuration for a Wisp application.
#[derive(Debug, Clone)]
pub struct FlowConf {
    /// Application name, shown in logs
    pub app_name: String,
    /// Master the application runs on
    pub master: Master,
    /// Default number of partitions for shuffles and `parallelize`
    pub default_parallelism: usize,
    /// Number of partitions the SQL engine plans for
    pub shuffle_partitions: usize,
    /// Rows per batch in the SQL engine
    pub batch_size: usize,
}

impl FlowConf {
    /// Creates a configuration for the given master, deriving parallelism from it.
    pub fn new(app_name: impl Into<String>, master: Master) -> Self {
        let parallelism = master.num_threads();
        Self {
            app_name: app_name.into(),
            master,
            default_parallelism: parallelism,
            shuffle_partitions: parallelism,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Sets the master. Parallelism settings follow the new master's thread count.
    pub fn with_master(mut self, master: Master) -> Self {
        self.master = master;
        self.default_parallelism = master.num_threads();
        self.shuffle_partitions = master.num_threads();
        self
    }

    pub fn with_default_parallelism(mut self, parallelism: usize) -> Self {
        self.default_parallelism = parallelism;
        self
    }

    pub fn with_shuffle_partitions(mut self, partitions: usize) -> Self {
        self.shuffle_partitions = partitions;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if self.app_name.trim().is_empty() {
            return Err(CommonError::configuration_error(
                "Application name must not be empty",
            ));
        }
        if self.default_parallelism == 0 {
            return Err(CommonError::configuration_error(
                "default_parallelism must be positive",
            ));
        }
        if u32::try_from(self.default_parallelism).is_err() {
            return Err(CommonError::configuration_error(format!(
                "default_parallelism must be at most {}, got {}",
                u32::MAX,
                self.default_parallelism
            )));
        }
        if self.shuffle_partitions == 0 {
            return Err(CommonError::configuration_error(
                "shuffle_partitions must be positive",
            ));
        }
        if self.batch_size == 0 {
            return Err(CommonError::configuration_error("batch_size must be positive"));
        }
        Ok(())
    }
}

impl Default for FlowConf {
    fn default() -> Self {
        Self::new(DEFAULT_APP_NAME, Master::default())
    }
}
