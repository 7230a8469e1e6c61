pub mod config;
pub mod logging;

pub mod control;
pub mod discovery;
pub mod fetch;
pub mod model;
pub mod orchestrator;
pub mod packager;
pub mod rate_limit;
pub mod retry;
pub mod scheduler;
pub mod storage;
pub mod url_model;
