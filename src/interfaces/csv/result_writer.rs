use crate::application::discovery::SearchResult;
use crate::error::Result;
use std::io::Write;

/// Writes search results as CSV to any `Write` sink.
///
/// Distances print with the single decimal search results carry; profiles
/// without a resolved distance leave the column empty.
pub struct ResultWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_results(&mut self, results: &[SearchResult]) -> Result<()> {
        self.writer
            .write_record(["name", "location", "rating", "available", "distance_km"])?;
        for result in results {
            self.writer.write_record([
                result.display_name.clone().unwrap_or_default(),
                result.location.clone(),
                result.rating.to_string(),
                result.available.to_string(),
                result
                    .distance_km
                    .map(|d| format!("{d:.1}"))
                    .unwrap_or_default(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
