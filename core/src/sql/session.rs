//! Session entry point for the DataFrame API.

use crate::config::{FlowConf, Master};
use crate::context::FlowContext;
use crate::sql::reader::DataFrameReader;
use datafusion::execution::config::SessionConfig;
use datafusion::execution::context::SessionContext;
use std::fmt::Debug;
use tracing::info;
use wisp_common::error::{CommonError, Result};

/// A running session: the RDD context plus the SQL engine's session state.
///
/// The session is stopped by [`WispSession::stop`] or when it is dropped.
pub struct WispSession {
    flow_context: FlowContext,
    df_session_ctx: SessionContext,
}

impl WispSession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// The RDD entry point of this session
    pub fn flow_context(&self) -> &FlowContext {
        &self.flow_context
    }

    /// Returns a clone of the underlying DataFusion `SessionContext`.
    pub fn df_session_ctx(&self) -> SessionContext {
        self.df_session_ctx.clone()
    }

    pub fn app_name(&self) -> &str {
        self.flow_context.app_name()
    }

    pub fn conf(&self) -> &FlowConf {
        self.flow_context.conf()
    }

    /// Entry point for loading data as a DataFrame
    pub fn read(&self) -> DataFrameReader<'_> {
        DataFrameReader::new(self)
    }

    /// Stop the session. Safe to call more than once; returns true only for
    /// the call that stopped it.
    pub fn stop(&self) -> bool {
        self.flow_context.stop()
    }

    pub fn is_stopped(&self) -> bool {
        self.flow_context.is_stopped()
    }
}

impl Drop for WispSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Debug for WispSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WispSession")
            .field("flow_context", &self.flow_context)
            .field("session_id", &self.df_session_ctx.session_id())
            .finish()
    }
}

/// Builder for [`WispSession`].
///
/// Settings apply in call order: `config` replaces the whole configuration,
/// `master` resets parallelism to the new master's thread count.
#[derive(Debug, Default)]
pub struct SessionBuilder {
    conf: FlowConf,
    error: Option<CommonError>,
}

impl SessionBuilder {
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.conf = self.conf.with_app_name(app_name);
        self
    }

    /// Set the master from its string form (`local`, `local[N]`, `local[*]`).
    /// An invalid master is reported by [`SessionBuilder::create`].
    pub fn master(mut self, master: &str) -> Self {
        match master.parse::<Master>() {
            Ok(master) => self.conf = self.conf.with_master(master),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    pub fn config(mut self, conf: FlowConf) -> Self {
        self.conf = conf;
        self
    }

    /// Start a new session with the accumulated configuration
    pub fn create(self) -> Result<WispSession> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let flow_context = FlowContext::new(self.conf)?;
        let conf = flow_context.conf();
        let session_config = SessionConfig::new()
            .with_target_partitions(conf.shuffle_partitions)
            .with_batch_size(conf.batch_size);
        let df_session_ctx = SessionContext::new_with_config(session_config);

        info!(
            "Created session '{}' (sql target partitions: {}, batch size: {})",
            conf.app_name, conf.shuffle_partitions, conf.batch_size
        );

        Ok(WispSession {
            flow_context,
            df_session_ctx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_applies_settings() {
        let session = WispSession::builder()
            .app_name("SimpleWordCount")
            .master("local[2]")
            .create()
            .unwrap();

        assert_eq!(session.app_name(), "SimpleWordCount");
        assert_eq!(session.conf().master, Master::LocalN(2));
        assert_eq!(session.flow_context().default_parallelism(), 2);
        assert_eq!(
            session.df_session_ctx().state().config().target_partitions(),
            2
        );
    }

    #[test]
    fn test_builder_uses_config() {
        let conf = FlowConf::new("configured", Master::Local)
            .with_shuffle_partitions(3)
            .with_batch_size(16);
        let session = WispSession::builder().config(conf).create().unwrap();

        assert_eq!(session.app_name(), "configured");
        let state = session.df_session_ctx().state();
        assert_eq!(state.config().target_partitions(), 3);
        assert_eq!(state.config().batch_size(), 16);
    }

    #[test]
    fn test_invalid_master_fails_on_create() {
        let err = WispSession::builder()
            .app_name("bad")
            .master("yarn")
            .create()
            .unwrap_err();
        assert!(matches!(err, CommonError::ConfigurationError { .. }));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let session = WispSession::builder().master("local").create().unwrap();
        let context = session.flow_context().clone();
        assert!(session.stop());
        assert!(!session.stop());
        assert!(context.is_stopped());
    }

    #[test]
    fn test_drop_stops_session() {
        let context = {
            let session = WispSession::builder().master("local").create().unwrap();
            session.flow_context().clone()
        };
        assert!(context.is_stopped());
    }
}
