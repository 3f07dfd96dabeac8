pub mod network;
pub mod session;
pub mod train;
pub mod train_sse;
