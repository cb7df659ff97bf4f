pub(crate) mod entity_controller;
pub(crate) mod health_check_controller;
pub(crate) mod world_controller;
