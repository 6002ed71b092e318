use crate::domain::model::Row;
use crate::domain::ports::{RowSink, SinkError};
use std::io::Write;

/// Buffers every row in arrival order.
#[derive(Debug, Default)]
pub struct CollectSink {
    rows: Vec<Row>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl RowSink for CollectSink {
    fn accept(&mut self, row: Row) -> Result<(), SinkError> {
        self.rows.push(row);
        Ok(())
    }
}

/// Writes each row as one compact JSON document followed by a newline,
/// flushing before the next row is fetched.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    written: u64,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RowSink for JsonLinesSink<W> {
    fn accept(&mut self, row: Row) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, &row)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}
