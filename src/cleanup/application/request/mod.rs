pub(crate) mod cleanup_plan;
