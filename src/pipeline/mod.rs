mod assembler;
mod source;
mod video;

pub use assembler::assemble_frame;
pub use source::{OpenCvOpener, OpenCvVideo, VideoError, VideoOpener, VideoSource};
pub use video::{frame_timestamp_ms, PipelineError, VideoPipeline};
