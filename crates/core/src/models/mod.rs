pub mod chart;
pub mod performance;
pub mod price;
pub mod selection;
pub mod settings;
pub mod table;
pub mod view;
