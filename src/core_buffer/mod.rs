pub mod error;
pub mod line_accumulator;
pub mod out_buffer;

pub use error::LineError;
pub use line_accumulator::LineAccumulator;
pub use out_buffer::OutBuffer;
