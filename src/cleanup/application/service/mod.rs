pub(crate) mod cleanup_service;
pub(crate) mod planner_service;
