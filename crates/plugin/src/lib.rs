//! Message webhook plugin lifecycle.
//!
//! The composition root the host talks to. [`MessageWebhookPlugin::start`]
//! resolves [`interceptor::Settings`] from the property file in the plugin's
//! working directory, acquires the [`webhook::WebhookDispatcher`], and
//! registers an [`interceptor::MessageWebhook`] with the host's
//! [`interceptor::InterceptorRegistry`]. [`MessageWebhookPlugin::stop`] undoes
//! both in reverse order.
//!
//! ## Architectural Layer
//!
//! **Composition.** No rules of its own: this crate only constructs concrete
//! adapters and injects them into the domain types.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use interceptor::{
    ConfigurationProvider, DispatchError, InMemoryPropertyStore, InterceptorRegistry,
    MessageWebhook, PropertyStore, RegistrationId, Settings, DEFAULT_URL,
};
use properties::FilePropertyStore;
use thiserror::Error;
use tracing::{info, warn};
use webhook::{parse_endpoint, WebhookConfig, WebhookDispatcher};

/// How long in-flight deliveries may run after [`MessageWebhookPlugin::stop`].
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Start-up failures. Configuration problems never end up here; only a worker
/// pool or HTTP client that cannot be built does. Once started, the plugin
/// never reports errors to the host.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("webhook dispatcher could not be started: {0}")]
    Dispatcher(#[from] DispatchError),
}

/// A started plugin instance.
///
/// Stopping is idempotent, and dropping a plugin that was never stopped
/// stops it.
pub struct MessageWebhookPlugin {
    settings: Arc<Settings>,
    dispatcher: Arc<WebhookDispatcher>,
    registry: Arc<dyn InterceptorRegistry>,
    registration: Option<RegistrationId>,
}

impl MessageWebhookPlugin {
    /// Starts the plugin with settings persisted under `working_dir`.
    ///
    /// An unreadable property file is left alone and the plugin runs on
    /// defaults held in memory until the file is fixed and the plugin restarted.
    pub fn start(
        working_dir: impl AsRef<Path>,
        registry: Arc<dyn InterceptorRegistry>,
    ) -> Result<Self, PluginError> {
        let working_dir = working_dir.as_ref();
        match FilePropertyStore::open(working_dir) {
            Ok(store) => Self::start_with_store(&store, registry),
            Err(error) => {
                warn!(
                    %error,
                    dir = %working_dir.display(),
                    "Property file unusable; starting with in-memory defaults"
                );
                Self::start_with_store(&InMemoryPropertyStore::new(), registry)
            }
        }
    }

    /// Starts the plugin against an arbitrary property store.
    pub fn start_with_store(
        store: &dyn PropertyStore,
        registry: Arc<dyn InterceptorRegistry>,
    ) -> Result<Self, PluginError> {
        let mut settings = Settings::load(&ConfigurationProvider::new(store));
        if let Err(error) = parse_endpoint(&settings.url) {
            // The stored value is kept so the operator can see and fix it.
            warn!(
                %error,
                default = DEFAULT_URL,
                "Configured webhook url is unusable; using default"
            );
            settings.url = DEFAULT_URL.to_string();
        }
        let settings = Arc::new(settings);
        info!(
            url = %settings.url,
            send_body = settings.send_body,
            debug = settings.debug,
            timeout_secs = settings.timeout.as_secs(),
            "Loaded message webhook settings"
        );

        let dispatcher = Arc::new(WebhookDispatcher::new(WebhookConfig::from_settings(&settings))?);
        let interceptor = Arc::new(MessageWebhook::new(
            Arc::clone(&settings),
            Arc::clone(&dispatcher) as _,
        ));
        let registration = registry.add_interceptor(interceptor);

        info!(registration = %registration, "Message webhook plugin started");
        Ok(Self {
            settings,
            dispatcher,
            registry,
            registration: Some(registration),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.registration.is_some()
    }

    /// Unregisters the interceptor, then releases the dispatcher.
    pub fn stop(&mut self) {
        let Some(registration) = self.registration.take() else {
            return;
        };

        if !self.registry.remove_interceptor(registration) {
            info!(registration = %registration, "Interceptor was already unregistered by the host");
        }
        self.dispatcher.shutdown(SHUTDOWN_GRACE);
        info!("Message webhook plugin stopped");
    }
}

impl Drop for MessageWebhookPlugin {
    fn drop(&mut self) {
        self.stop();
    }
}
