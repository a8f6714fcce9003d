use std::rc::Rc;

use crate::config::StorefrontConfig;
use crate::coordinator::Coordinator;
use crate::events::StoreBus;
use crate::transport::ShopApi;

/// Everything one storefront session needs, wired together at startup.
///
/// There are no globals: views get the bus from here, and dropping the context
/// (or calling [`AppContext::shutdown`]) tears every subscription down.
pub struct AppContext<A: ShopApi + 'static> {
    config: StorefrontConfig,
    bus: Rc<StoreBus>,
    coordinator: Rc<Coordinator<A>>,
}

impl<A: ShopApi + 'static> AppContext<A> {
    pub fn start(config: StorefrontConfig, api: A) -> Self {
        let bus = Rc::new(StoreBus::new());
        let coordinator = Coordinator::install(Rc::clone(&bus), Rc::new(api));
        tracing::debug!(api_origin = %config.api_origin, "storefront context started");
        Self {
            config,
            bus,
            coordinator,
        }
    }

    pub fn bus(&self) -> &Rc<StoreBus> {
        &self.bus
    }

    pub fn coordinator(&self) -> &Rc<Coordinator<A>> {
        &self.coordinator
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Detach the coordinator and drop every remaining subscriber.
    pub fn shutdown(self) {
        // Teardown happens in Drop.
    }
}

impl<A: ShopApi + 'static> Drop for AppContext<A> {
    fn drop(&mut self) {
        self.coordinator.detach();
        self.bus.off_all();
        tracing::debug!("storefront context shut down");
    }
}
