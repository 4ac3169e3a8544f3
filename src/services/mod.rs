pub mod clothing;
pub mod dataset;
pub mod detection;
pub mod history;
pub mod season;
