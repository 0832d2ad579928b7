pub mod transfer;

pub use transfer::{throughput_kbps, Completion, Step, TransferJob};
