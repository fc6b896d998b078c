pub(crate) mod inventory_service;
