use chrono::{DateTime, Utc};
use healthkey_core::VitalSigns;

/// In-memory log of vital readings.
///
/// Created by the host at start-up and passed to whoever needs it; `clear`
/// resets it between sessions or tests. Readings change only through
/// [`ReadingLog::update`].
#[derive(Debug, Default, Clone)]
pub struct ReadingLog {
    readings: Vec<VitalSigns>,
    next_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadingLogError {
    #[error("reading {0} already exists")]
    Duplicate(String),
    #[error("reading {0} not found")]
    NotFound(String),
}

impl ReadingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new reading, assigning an id when it has none.
    pub fn record(&mut self, mut reading: VitalSigns) -> Result<&VitalSigns, ReadingLogError> {
        if reading.id.trim().is_empty() {
            self.next_id += 1;
            reading.id = format!("reading-{}", self.next_id);
        }
        if self.get(&reading.id).is_some() {
            return Err(ReadingLogError::Duplicate(reading.id));
        }

        self.readings.push(reading);
        let last = self.readings.len() - 1;
        Ok(&self.readings[last])
    }

    /// Replace the stored reading with the same id.
    pub fn update(&mut self, reading: VitalSigns) -> Result<(), ReadingLogError> {
        let slot = self
            .readings
            .iter_mut()
            .find(|stored| stored.id == reading.id)
            .ok_or_else(|| ReadingLogError::NotFound(reading.id.clone()))?;
        *slot = reading;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&VitalSigns> {
        self.readings.iter().find(|reading| reading.id == id)
    }

    /// Most recent reading by timestamp; undated readings sort first.
    pub fn latest(&self) -> Option<&VitalSigns> {
        self.readings.iter().max_by_key(|reading| reading.recorded_at)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VitalSigns> {
        self.readings.iter()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.readings.iter().filter_map(|reading| reading.recorded_at)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn clear(&mut self) {
        self.readings.clear();
        self.next_id = 0;
    }
}
