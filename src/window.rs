//! The run of calendar days not yet covered by the watermark.

use chrono::{Datelike, NaiveDate};

use crate::error::WindowError;

/// Every day after `watermark` up to and including `today`.
#[derive(Debug, Clone, PartialEq)]
pub struct DayWindow {
    days: Vec<NaiveDate>,
}

impl DayWindow {
    /// Refuses to build an empty or inverted window.
    pub fn between(watermark: NaiveDate, today: NaiveDate) -> Result<Self, WindowError> {
        if today <= watermark {
            return Err(WindowError { watermark, today });
        }

        let days = watermark
            .iter_days()
            .skip(1)
            .take_while(|day| *day <= today)
            .collect();

        Ok(DayWindow { days })
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }
}

impl<'a> IntoIterator for &'a DayWindow {
    type Item = &'a NaiveDate;
    type IntoIter = std::slice::Iter<'a, NaiveDate>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

/// `{year}/{day-of-year}`, the directory used both remotely and locally.
/// Day-of-year is not zero-padded.
pub fn day_path(day: NaiveDate) -> String {
    format!("{}/{}", day.year(), day.ordinal())
}

// -- Tests -------------------------------------------------------------------
