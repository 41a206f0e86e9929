mod contract;
pub mod environment;
