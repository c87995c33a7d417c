pub mod scheduler_service;

pub use scheduler_service::{Partial, SchedulerService, SideFetch};
