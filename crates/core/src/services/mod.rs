pub mod analytics_service;
pub mod catalog_service;
pub mod chart_service;
pub mod market_data_service;
pub mod selection_service;
