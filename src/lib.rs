pub mod batch;
pub mod config;
pub mod detector;
pub mod frame;
pub mod landmarks;
pub mod pipeline;
pub mod storage;

#[cfg(test)]
mod testing;
