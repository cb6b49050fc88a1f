pub mod accumulator;
pub mod decoder;

pub use accumulator::{AudioSegment, SegmentAccumulator, SegmentKind};
pub use decoder::{AudioPayload, FrameDecoder};
