pub mod converter;
pub mod error;
pub mod sink;

pub use converter::{
    ConversionEvent, ConversionHandle, ConversionJob, ConversionOrchestrator, ConversionReport,
    Outcome, run_conversion, run_conversion_with,
};
pub use error::ConvertError;
pub use sink::RasterPageSink;
