pub mod notifier;
pub mod pipeline;
pub mod scheduler;
