use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, QueryDescriptor};
use crate::tissue::{TARGET_TISSUE_TYPES, TCGA_TISSUE_TYPES, TissueType};

pub struct JsonOutput;

#[derive(Debug, Serialize)]
struct SampleTypeTables {
    tcga: &'static [TissueType],
    target: &'static [TissueType],
}

impl JsonOutput {
    pub fn print_descriptor(descriptor: &QueryDescriptor) -> io::Result<()> {
        Self::print_json(descriptor)
    }

    pub fn print_descriptors(descriptors: &[QueryDescriptor]) -> io::Result<()> {
        Self::print_json(&descriptors)
    }

    pub fn print_sample_types() -> io::Result<()> {
        Self::print_json(&SampleTypeTables {
            tcga: TCGA_TISSUE_TYPES,
            target: TARGET_TISSUE_TYPES,
        })
    }

    fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Forwards progress events to the tracing subscriber.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => {
                tracing::info!("{} latency_ms={}", event.message, elapsed.as_millis())
            }
            None => tracing::info!("{}", event.message),
        }
    }
}
