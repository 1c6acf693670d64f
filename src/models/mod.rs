pub mod chart;
pub mod etf;
pub mod market;
pub mod settings;
pub mod stock;
