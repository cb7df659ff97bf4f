use config::Config;
use hub::Manager;
use log::info;
use std::sync::Arc;
use world::World;

pub mod config;
pub mod logging;

// Application context shared by every request handler and websocket session.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    world: Arc<World>,
    manager: Arc<Manager>,
}

impl AppState {
    /// Builds a fresh, empty world with its broadcast hub already listening.
    pub fn new(app_config: Config) -> Self {
        let world = Arc::new(World::new());
        let manager = Arc::new(Manager::with_max_pending(
            Arc::clone(&world),
            app_config.max_outbound_queue(),
        ));

        match app_config.max_outbound_queue() {
            Some(max) => info!("Websocket clients are disconnected after {max} undelivered messages"),
            None => info!("Websocket client queues are unbounded"),
        }

        Self {
            config: app_config,
            world,
            manager,
        }
    }

    pub fn world(&self) -> &World {
        self.world.as_ref()
    }

    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }
}
