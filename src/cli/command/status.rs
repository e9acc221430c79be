use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::{watermark::WatermarkStore, window::DayWindow};

/// Describes the watermark and the pending window. Makes no requests.
pub fn status(memory_file: &Path, today: NaiveDate) -> Result<String> {
    let watermark = WatermarkStore::new(memory_file).load()?;

    let pending = match DayWindow::between(watermark, today) {
        Ok(window) => match (window.first(), window.last()) {
            (Some(first), Some(last)) if first == last => format!("1 day pending ({})", first),
            (Some(first), Some(last)) => format!("{} days pending ({} to {})", window.len(), first, last),
            _ => "Up to date".to_string(),
        },
        // Inverted; `sync` refuses this record.
        Err(e) if e.watermark > e.today => return Err(e.into()),
        Err(_) => "Up to date".to_string(),
    };

    Ok(format!("Last completed day: {}\n{}", watermark, pending))
}

// -- Tests -------------------------------------------------------------------
