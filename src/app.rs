use crate::errors::NodeError;
use crate::managers::telegram::{ExecutionOutcome, TelegramNode};
use crate::runner::job::ExecuteJob;
use crate::services::binary_store::BinaryStore;
use crate::services::credentials::TelegramCredentials;
use crate::services::logger::Logger;
use crate::services::transport::{HttpTransport, TelegramTransport};
use crate::stores::file_binary_store::FileBinaryStore;
use crate::stores::memory_binary_store::MemoryBinaryStore;
use std::sync::Arc;

/// Builds a transport for the credentials of one execution.
pub type TransportFactory =
    Arc<dyn Fn(&Logger, TelegramCredentials) -> Arc<dyn TelegramTransport> + Send + Sync>;

pub struct App {
    pub logger: Logger,
    pub store: Arc<dyn BinaryStore>,
    default_credentials: Option<TelegramCredentials>,
    transport_factory: TransportFactory,
}

impl App {
    pub fn initialize() -> Result<Self, NodeError> {
        let logger = Logger::new("telegram");
        let store: Arc<dyn BinaryStore> = match FileBinaryStore::from_env() {
            Some(store) => Arc::new(store),
            None => Arc::new(MemoryBinaryStore::new()),
        };
        let default_credentials = match TelegramCredentials::from_env() {
            Ok(credentials) => Some(credentials),
            Err(err) => {
                logger.debug(
                    "No credentials in the environment; jobs must carry their own",
                    Some(&serde_json::json!({ "reason": err.message })),
                );
                None
            }
        };
        let factory: TransportFactory =
            Arc::new(|logger: &Logger, credentials: TelegramCredentials| {
                Arc::new(HttpTransport::new(logger.clone(), credentials))
                    as Arc<dyn TelegramTransport>
            });
        Ok(Self::with_parts(logger, store, default_credentials, factory))
    }

    pub fn with_parts(
        logger: Logger,
        store: Arc<dyn BinaryStore>,
        default_credentials: Option<TelegramCredentials>,
        transport_factory: TransportFactory,
    ) -> Self {
        Self {
            logger,
            store,
            default_credentials,
            transport_factory,
        }
    }

    fn resolve_credentials(&self, job: &ExecuteJob) -> Result<TelegramCredentials, NodeError> {
        match job.credentials.clone() {
            Some(credentials) => credentials.validate(),
            None => self.default_credentials.clone().ok_or_else(|| {
                NodeError::configuration("Telegram credentials are missing").with_hint(
                    "Pass credentials with the job or set TELEGRAM_ACCESS_TOKEN.",
                )
            }),
        }
    }

    pub async fn execute(&self, job: ExecuteJob) -> Result<ExecutionOutcome, NodeError> {
        let credentials = self.resolve_credentials(&job)?;
        let transport = (self.transport_factory)(&self.logger, credentials);
        let node = TelegramNode::new(self.logger.clone(), transport, self.store.clone());
        let context = job.context.clone().with_environment();
        let params = job.node_parameters();
        node.execute(&job.input_items(), &params, &context).await
    }
}
