use chrono::NaiveDate;

use crate::domain::QualifiedMatch;

/// One calendar day (UTC) of qualifying matches, possibly none
#[derive(Debug, Clone, PartialEq)]
pub struct RatingPeriod {
    pub day: NaiveDate,
    pub matches: Vec<QualifiedMatch>,
}

impl RatingPeriod {
    pub fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            matches: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Split matches into one period per day from the first to the last match day, inclusive.
///
/// Days without play produce empty periods. Periods come out in increasing date order and
/// matches inside a period in increasing timestamp order.
pub fn segment(mut matches: Vec<QualifiedMatch>) -> Vec<RatingPeriod> {
    matches.sort_by_key(|m| m.timestamp);

    let (Some(first), Some(last)) = (matches.first(), matches.last()) else {
        return Vec::new();
    };
    let (first_day, last_day) = (first.day(), last.day());

    let mut periods: Vec<RatingPeriod> = days_from(first_day, last_day)
        .map(RatingPeriod::empty)
        .collect();

    for m in matches {
        let offset = (m.day() - first_day).num_days() as usize;
        periods[offset].matches.push(m);
    }

    periods
}

/// Days strictly after `after` and strictly before `before`
pub fn gap_days(after: NaiveDate, before: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    after.iter_days().skip(1).take_while(move |day| *day < before)
}

fn days_from(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    first.iter_days().take_while(move |day| *day <= last)
}
