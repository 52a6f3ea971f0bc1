//! Header-mapped row reading.
//!
//! [`RowMapper`] reads the first sheet of a source, takes the header row at the configured start
//! line, and turns every following row into a [`Record`] keyed by the [`FieldMap`]'s output
//! names. Records are either collected and returned, or handed to a [`RecordSink`] in batches.

use std::fmt;
use std::sync::Arc;

use crate::datetime;
use crate::error::{MapperError, MapperResult};
use crate::types::{FieldMap, Record};

use super::decoder::{Decoder, Sheet};
use super::observability::{ReadContext, ReadObserver, ReadSeverity, ReadStats};
use super::source::Source;

/// Receives batches of records during a batched read.
///
/// Returning an error stops the read; the error is returned from the read call unchanged.
/// Use [`MapperError::sink`] to wrap your own error types.
pub trait RecordSink {
    fn accept(&mut self, batch: Vec<Record>) -> MapperResult<()>;
}

impl<F> RecordSink for F
where
    F: FnMut(Vec<Record>) -> MapperResult<()>,
{
    fn accept(&mut self, batch: Vec<Record>) -> MapperResult<()> {
        self(batch)
    }
}

struct Batch<'s> {
    size: usize,
    sink: Box<dyn RecordSink + 's>,
}

/// Reads spreadsheet rows into keyed records.
///
/// Configure with the `set_*` methods, then call [`RowMapper::read_list`] once. Reading consumes
/// the mapper; build a fresh one per read.
///
/// ```no_run
/// use sheet_ingest::ingestion::RowMapper;
/// use sheet_ingest::types::FieldMap;
///
/// # fn main() -> Result<(), sheet_ingest::MapperError> {
/// let fields: FieldMap = [("name", "n"), ("age", "a")].into_iter().collect();
/// let records = RowMapper::new()
///     .set_source("people.xlsx")?
///     .set_field_map(fields)
///     .read_list()?;
/// println!("records={}", records.len());
/// # Ok(())
/// # }
/// ```
pub struct RowMapper<'s> {
    source: Option<Source>,
    field_map: FieldMap,
    start_line: usize,
    batch: Option<Batch<'s>>,
    observer: Option<Arc<dyn ReadObserver>>,
    alert_at_or_above: ReadSeverity,
}

impl Default for RowMapper<'_> {
    fn default() -> Self {
        Self {
            source: None,
            field_map: FieldMap::new(),
            start_line: 1,
            batch: None,
            observer: None,
            alert_at_or_above: ReadSeverity::Critical,
        }
    }
}

impl fmt::Debug for RowMapper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowMapper")
            .field("source", &self.source)
            .field("field_map", &self.field_map)
            .field("start_line", &self.start_line)
            .field("batch_size", &self.batch.as_ref().map(|b| b.size))
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl<'s> RowMapper<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source to read. Fails with [`MapperError::InvalidInput`] if it is empty.
    pub fn set_source(mut self, source: impl Into<Source>) -> MapperResult<Self> {
        let source = source.into();
        if source.is_empty() {
            return Err(MapperError::invalid_input("source is empty"));
        }
        self.source = Some(source);
        Ok(self)
    }

    /// Replace the header -> output key mapping. An empty map yields no records.
    pub fn set_field_map(mut self, field_map: FieldMap) -> Self {
        self.field_map = field_map;
        self
    }

    /// Deliver records to `sink` in batches of `size` instead of returning them.
    ///
    /// With batching enabled, [`RowMapper::read_list`] always returns an empty vector: every
    /// record goes to the sink, including the final short batch.
    pub fn set_batch(mut self, size: usize, sink: impl RecordSink + 's) -> MapperResult<Self> {
        if size == 0 {
            return Err(MapperError::invalid_input("batch size must be positive"));
        }
        self.batch = Some(Batch {
            size,
            sink: Box::new(sink),
        });
        Ok(self)
    }

    /// Set the 1-based header row. Data rows start on the next line.
    pub fn set_start_line(mut self, line: usize) -> MapperResult<Self> {
        if line == 0 {
            return Err(MapperError::invalid_input("start line must be at least 1"));
        }
        self.start_line = line;
        Ok(self)
    }

    pub fn set_observer(mut self, observer: Arc<dyn ReadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Severity at which failures are also reported through `on_alert`.
    pub fn set_alert_threshold(mut self, severity: ReadSeverity) -> Self {
        self.alert_at_or_above = severity;
        self
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Pick the decoder from the source extension (`csv`, `xls` or `xlsx`, case-sensitive).
    pub fn select_decoder(&self) -> MapperResult<Decoder> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| MapperError::invalid_input("no source configured"))?;
        Ok(Decoder::for_format(source.format()?))
    }

    /// Read all rows.
    ///
    /// Without batching, returns every non-empty record in row order. With batching (see
    /// [`RowMapper::set_batch`]) records are delivered to the sink and the returned vector is
    /// always empty.
    pub fn read_list(mut self) -> MapperResult<Vec<Record>> {
        match self.batch.take() {
            Some(Batch { size, mut sink }) => self.run(Some((size, &mut *sink))),
            None => self.run::<dyn RecordSink>(None),
        }
    }

    /// Batched read with the sink passed explicitly. Returns the (always empty) remainder.
    ///
    /// A sink configured with [`RowMapper::set_batch`] is ignored.
    pub fn read_batched<S>(self, size: usize, sink: &mut S) -> MapperResult<Vec<Record>>
    where
        S: RecordSink + ?Sized,
    {
        if size == 0 {
            return Err(MapperError::invalid_input("batch size must be positive"));
        }
        self.run(Some((size, sink)))
    }

    /// Unix timestamp for an Excel date serial, read as Asia/Shanghai wall-clock time.
    pub fn excel_to_timestamp(serial: f64) -> MapperResult<i64> {
        datetime::excel_to_timestamp(serial)
    }

    fn run<S>(&self, batch: Option<(usize, &mut S)>) -> MapperResult<Vec<Record>>
    where
        S: RecordSink + ?Sized,
    {
        let mut ctx = ReadContext {
            source: self.source.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            format: None,
        };
        let mut stats = ReadStats::default();
        let result = self.read_into(&mut ctx, &mut stats, batch);

        if let Some(obs) = self.observer.as_ref() {
            match &result {
                Ok(records) => {
                    stats.records += records.len();
                    obs.on_success(&ctx, stats);
                }
                Err(e) => {
                    let sev = ReadSeverity::for_error(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= self.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        result
    }

    fn read_into<S>(
        &self,
        ctx: &mut ReadContext,
        stats: &mut ReadStats,
        batch: Option<(usize, &mut S)>,
    ) -> MapperResult<Vec<Record>>
    where
        S: RecordSink + ?Sized,
    {
        let decoder = self.select_decoder()?;
        ctx.format = Some(decoder.format());
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| MapperError::invalid_input("no source configured"))?;
        let sheet = decoder.load_sheet(source)?;

        match batch {
            Some((size, sink)) => {
                let mut observed = ObservedSink {
                    inner: sink,
                    observer: self.observer.as_deref(),
                    ctx,
                    stats,
                };
                map_sheet(&sheet, &self.field_map, self.start_line, Some((size, &mut observed)))
            }
            None => map_sheet::<dyn RecordSink>(&sheet, &self.field_map, self.start_line, None),
        }
    }
}

/// Counts delivered batches and reports them to the observer.
struct ObservedSink<'a, S: ?Sized> {
    inner: &'a mut S,
    observer: Option<&'a dyn ReadObserver>,
    ctx: &'a ReadContext,
    stats: &'a mut ReadStats,
}

impl<S> RecordSink for ObservedSink<'_, S>
where
    S: RecordSink + ?Sized,
{
    fn accept(&mut self, batch: Vec<Record>) -> MapperResult<()> {
        let len = batch.len();
        self.inner.accept(batch)?;
        self.stats.batches += 1;
        self.stats.records += len;
        if let Some(obs) = self.observer {
            obs.on_batch(self.ctx, len);
        }
        Ok(())
    }
}

/// Map the rows of an already-decoded sheet.
///
/// The header row is `start_line` (1-based); rows `start_line + 1 ..= highest_row` are data.
/// For each data row, headers are paired with cells by position. A header that appears more
/// than once keeps its first position but takes the value of its last column. Empty headers and
/// headers missing from `field_map` are dropped, and rows that end up with no fields are
/// skipped. With `batch = Some((size, sink))`, full batches go to the sink as soon as they
/// fill up, the remainder goes after the last row, and the returned vector is empty.
pub fn map_sheet<S>(
    sheet: &Sheet,
    field_map: &FieldMap,
    start_line: usize,
    mut batch: Option<(usize, &mut S)>,
) -> MapperResult<Vec<Record>>
where
    S: RecordSink + ?Sized,
{
    if start_line == 0 {
        return Err(MapperError::invalid_input("start line must be at least 1"));
    }

    let projection = build_header_projection(sheet, field_map, start_line);

    let mut pending: Vec<Record> = Vec::new();
    for row in (start_line + 1)..=sheet.highest_row() {
        let mut record = Record::new();
        for (key, column) in &projection {
            record.insert(key.as_str(), sheet.cell_value(*column, row));
        }
        if !record.is_empty() {
            pending.push(record);
        }

        if let Some((size, sink)) = batch.as_mut() {
            if pending.len() == *size {
                sink.accept(std::mem::take(&mut pending))?;
            }
        }
    }

    if let Some((_, sink)) = batch.as_mut() {
        if !pending.is_empty() {
            sink.accept(std::mem::take(&mut pending))?;
        }
    }

    Ok(pending)
}

/// Resolve the header row into `(output key, 1-based column)` pairs, in first-occurrence order.
fn build_header_projection(sheet: &Sheet, field_map: &FieldMap, start_line: usize) -> Vec<(String, usize)> {
    // header -> last column carrying it, positioned at its first occurrence
    let mut headers: Vec<(String, usize)> = Vec::new();
    for column in 1..=sheet.highest_column() {
        let label = sheet.header_label(column, start_line);
        match headers.iter_mut().find(|(h, _)| *h == label) {
            Some(slot) => slot.1 = column,
            None => headers.push((label, column)),
        }
    }

    headers
        .into_iter()
        .filter(|(label, _)| !label.is_empty())
        .filter_map(|(label, column)| field_map.key_for(&label).map(|key| (key.to_string(), column)))
        .collect()
}
