//! Builder for constructing a registry with optional collaborators.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::Config;
use crate::observers::Observe;
use crate::registry::registry::Registry;

/// Builder for a [`Registry`] with optional features.
pub struct RegistryBuilder<C, M> {
    cfg: Config,
    observer: Option<Arc<dyn Observe>>,
    _marker: PhantomData<fn() -> (C, M)>,
}

impl<C, M> RegistryBuilder<C, M>
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            observer: None,
            _marker: PhantomData,
        }
    }

    /// Sets the observer receiving registry notices.
    ///
    /// The observer is informational only: registration, pruning, and
    /// isolated dispatch failures are reported to it, and nothing it does
    /// feeds back into registry behavior.
    pub fn with_observer(mut self, observer: Arc<dyn Observe>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the registry.
    #[must_use]
    pub fn build(self) -> Registry<C, M> {
        Registry::from_parts(self.cfg, self.observer)
    }
}
