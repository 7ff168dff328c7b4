pub mod catalog_service;
pub mod explore_service;
pub mod export_service;
