pub mod availability;
pub mod booking;
pub mod locks;
pub mod notifier;
pub mod sweeper;
