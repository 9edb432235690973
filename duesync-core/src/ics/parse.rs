//! ICS feed parsing using the icalendar crate's parser.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use crate::error::{DueSyncError, DueSyncResult};
use crate::event::RawEvent;

/// Parse every VEVENT of a feed into a `RawEvent`.
///
/// Dates and floating times are read in `tz`. Events without a UID or
/// without any usable end time are skipped.
pub fn parse_feed(content: &str, tz: Tz) -> DueSyncResult<Vec<RawEvent>> {
    let unfolded = mark_category_separators(&unfold(content));
    let calendar = read_calendar(&unfolded).map_err(|e| DueSyncError::IcsParse(e.to_string()))?;

    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);

    Ok(vevents
        .into_iter()
        .filter_map(|vevent| parse_vevent(vevent, tz))
        .collect())
}

/// Feeds are not consistent about whether VEVENTs sit at the top level or
/// inside a VCALENDAR wrapper, so walk both.
fn collect_vevents<'a, 'c>(components: &'a [Component<'c>], out: &mut Vec<&'a Component<'c>>) {
    for component in components {
        if component.name == "VEVENT" {
            out.push(component);
        } else if component.name == "VCALENDAR" {
            collect_vevents(&component.components, out);
        }
    }
}

fn parse_vevent(vevent: &Component<'_>, tz: Tz) -> Option<RawEvent> {
    let Some(uid) = vevent.find_prop("UID").map(|p| p.val.to_string()) else {
        tracing::warn!("skipping feed event without UID");
        return None;
    };

    let title = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    let Some(end) = event_end(vevent, tz) else {
        tracing::warn!(%uid, %title, "skipping feed event without DTEND or DTSTART");
        return None;
    };

    let tags: BTreeSet<String> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "CATEGORIES")
        .flat_map(|p| split_categories(p.val.as_ref()))
        .collect();

    Some(RawEvent {
        uid,
        title,
        end,
        tags,
    })
}

/// DTEND, else DTSTART + DURATION, else DTSTART.
fn event_end(vevent: &Component<'_>, tz: Tz) -> Option<DateTime<Utc>> {
    if let Some(end) = vevent.find_prop("DTEND").and_then(|p| parse_time(p, tz)) {
        return Some(end);
    }

    let start = vevent.find_prop("DTSTART").and_then(|p| parse_time(p, tz))?;
    let duration = vevent
        .find_prop("DURATION")
        .and_then(|p| parse_duration(p.val.as_ref()))
        .unwrap_or_else(Duration::zero);

    Some(start + duration)
}

fn parse_time(prop: &Property<'_>, tz: Tz) -> Option<DateTime<Utc>> {
    let value = DatePerhapsTime::try_from(prop).ok()?;
    Some(match value {
        DatePerhapsTime::Date(date) => start_of_day(date, tz),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt,
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => resolve_local(naive, tz),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let zone = tzid.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!(%tzid, fallback = %tz, "unknown TZID, using configured timezone");
                tz
            });
            resolve_local(date_time, zone)
        }
    })
}

/// Midnight at the start of `date` in `tz`.
pub(crate) fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    resolve_local(date.and_time(chrono::NaiveTime::MIN), tz)
}

/// Map a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap are pushed forward by an hour.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Parse an ICS DURATION value (`PT1H`, `-P1D`, ...).
fn parse_duration(value: &str) -> Option<Duration> {
    let is_negative = value.starts_with('-');
    let unsigned = value.trim_start_matches(['-', '+']);

    let duration = iso8601::duration(unsigned).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let duration = Duration::from_std(std_duration).ok()?;

    Some(if is_negative { -duration } else { duration })
}

/// Stands in for the list separators of a CATEGORIES value. The parser
/// unescapes `\,` to `,`, so separators have to be told apart beforehand.
const CATEGORY_SEPARATOR: char = '\u{1f}';

/// Replace the unescaped commas of every CATEGORIES line with
/// `CATEGORY_SEPARATOR`. Input must already be unfolded.
fn mark_category_separators(unfolded: &str) -> String {
    let mut out = String::with_capacity(unfolded.len());

    for line in unfolded.split_inclusive('\n') {
        let Some(value_start) = categories_value_start(line) else {
            out.push_str(line);
            continue;
        };

        out.push_str(&line[..value_start]);
        let mut chars = line[value_start..].chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    out.push(c);
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                ',' => out.push(CATEGORY_SEPARATOR),
                _ => out.push(c),
            }
        }
    }

    out
}

/// Byte offset of the value of a CATEGORIES line, after the `:` that ends
/// the name and parameters.
fn categories_value_start(line: &str) -> Option<usize> {
    const NAME: &str = "CATEGORIES";
    let head = line.get(..NAME.len())?;
    if !head.eq_ignore_ascii_case(NAME) {
        return None;
    }

    let mut in_quotes = false;
    for (i, c) in line.char_indices().skip(NAME.len()) {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i + 1),
            ';' | ':' => {}
            _ if i == NAME.len() => return None,
            _ => {}
        }
    }
    None
}

fn split_categories(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(CATEGORY_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
