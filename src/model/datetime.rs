// File: ./src/model/datetime.rs
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Days ahead a task lands when no date expression is recognized.
pub const DEFAULT_DUE_DAYS: i64 = 7;

/// Result of a date extraction pass: the resolved point in time and the
/// input with the matched span cut out.
#[derive(Debug, Clone)]
pub struct DateExtraction {
    pub date: DateTime<Local>,
    pub remaining_text: String,
}

pub fn default_due(now: DateTime<Local>) -> DateTime<Local> {
    now + Duration::days(DEFAULT_DUE_DAYS)
}

// --- PATTERN TABLE ---
//
// Ordered first-match-wins rules. Rule order is the priority order: a later
// rule never fires when an earlier one matches anywhere in the text, even at
// a later position.

static RE_LEAD_TODAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:by|due|on|before|until)\s+(?:today|tonight)").unwrap());

static RE_LEAD_TOMORROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:by|due|on|before|until)\s+tomorrow(?:\s+at\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm)?)?",
    )
    .unwrap()
});

static RE_LEAD_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:by|due|on|before|until)\s+(?:next\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)",
    )
    .unwrap()
});

static RE_MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d{1,2})(?:st|nd|rd|th)?(?:\s+of)?\s+(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:tember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)(?:\s*,\s*(\d{4}))?",
    )
    .unwrap()
});

static RE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[/\-](\d{1,2})[/\-](\d{2,4})").unwrap());

static RE_CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)?").unwrap());

type Resolver = fn(&Captures, DateTime<Local>) -> Option<DateTime<Local>>;

struct DateRule {
    pattern: &'static Lazy<Regex>,
    resolve: Resolver,
}

static RULES: [DateRule; 6] = [
    DateRule {
        pattern: &RE_LEAD_TODAY,
        resolve: resolve_today,
    },
    DateRule {
        pattern: &RE_LEAD_TOMORROW,
        resolve: resolve_tomorrow,
    },
    DateRule {
        pattern: &RE_LEAD_WEEKDAY,
        resolve: resolve_weekday,
    },
    DateRule {
        pattern: &RE_MONTH_NAME,
        resolve: resolve_month_name,
    },
    DateRule {
        pattern: &RE_NUMERIC,
        resolve: resolve_numeric,
    },
    DateRule {
        pattern: &RE_CLOCK,
        resolve: resolve_clock,
    },
];

// Sunday-first, matching the weekday indexing the resolvers compute with.
const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

// --- RESOLVERS ---

fn resolve_today(_caps: &Captures, now: DateTime<Local>) -> Option<DateTime<Local>> {
    end_of_day(now.date_naive())
}

fn resolve_tomorrow(caps: &Captures, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let date = now.date_naive() + Duration::days(1);
    match caps.get(1) {
        Some(h) => {
            let hours = h.as_str().parse::<u32>().ok()?;
            let minutes = caps
                .get(2)
                .map_or(Ok(0), |m| m.as_str().parse::<u32>())
                .ok()?;
            let hours = to_24_hour(hours, caps.get(3).map(|p| p.as_str()));
            at_time(date, hours, minutes)
        }
        None => end_of_day(date),
    }
}

fn resolve_weekday(caps: &Captures, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let name = caps.get(1)?.as_str();
    let target = WEEKDAY_NAMES
        .iter()
        .position(|d| d.eq_ignore_ascii_case(name))? as i64;
    let current = now.date_naive().weekday().num_days_from_sunday() as i64;
    // Strictly after today: landing on the same weekday jumps a full week.
    let mut days_ahead = (target + 7 - current) % 7;
    if days_ahead == 0 {
        days_ahead = 7;
    }
    end_of_day(now.date_naive() + Duration::days(days_ahead))
}

fn resolve_month_name(caps: &Captures, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let day = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let prefix = caps.get(2)?.as_str().to_lowercase();
    let month0 = MONTH_NAMES.iter().position(|m| m.starts_with(&prefix))? as i64;
    let year = match caps.get(3) {
        Some(y) => y.as_str().parse::<i32>().ok()?,
        None => now.year(),
    };
    date_from_parts(year, month0, day)
}

fn resolve_numeric(caps: &Captures, _now: DateTime<Local>) -> Option<DateTime<Local>> {
    let first = caps.get(1)?.as_str().parse::<i64>().ok()?;
    let second = caps.get(2)?.as_str().parse::<i64>().ok()?;
    let third = caps.get(3)?.as_str();

    let (year, month0, day): (i32, i64, i64) = if third.len() == 4 {
        // A slash reads as DD/MM/YYYY, a dash as YYYY-MM-DD.
        if caps.get(0)?.as_str().contains('/') {
            (third.parse().ok()?, second - 1, first)
        } else {
            (i32::try_from(first).ok()?, second - 1, third.parse().ok()?)
        }
    } else {
        // Two-digit years are always 2000-based. Whichever of the first two
        // groups exceeds 12 must be the day; fully ambiguous input reads as
        // DD/MM/YY.
        let year = 2000 + third.parse::<i32>().ok()?;
        if first > 12 {
            (year, second - 1, first)
        } else if second > 12 {
            (year, first - 1, second)
        } else {
            (year, second - 1, first)
        }
    };
    date_from_parts(year, month0, u32::try_from(day).ok()?)
}

fn resolve_clock(caps: &Captures, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let hours = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let minutes = caps
        .get(2)
        .map_or(Ok(0), |m| m.as_str().parse::<u32>())
        .ok()?;
    let hours = to_24_hour(hours, caps.get(3).map(|p| p.as_str()));
    at_time(now.date_naive(), hours, minutes)
}

// --- CONSTRUCTION HELPERS ---

fn to_24_hour(hours: u32, period: Option<&str>) -> u32 {
    match period {
        Some(p) if p.eq_ignore_ascii_case("pm") && hours < 12 => hours + 12,
        Some(p) if p.eq_ignore_ascii_case("am") && hours == 12 => 0,
        _ => hours,
    }
}

/// Month-arithmetic date constructor pinned to 23:59:59. `month0` is
/// zero-indexed and values past December roll into following years. A day
/// the target month cannot hold resolves to the last day of the month
/// before it (Feb 30 -> Jan 31).
fn date_from_parts(year: i32, month0: i64, day: u32) -> Option<DateTime<Local>> {
    let year = year + month0.div_euclid(12) as i32;
    let month = (month0.rem_euclid(12) + 1) as u32;
    let date = match NaiveDate::from_ymd_opt(year, month, day) {
        Some(d) => d,
        None => NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()?,
    };
    end_of_day(date)
}

pub(crate) fn end_of_day(date: NaiveDate) -> Option<DateTime<Local>> {
    date.and_hms_opt(23, 59, 59)?.and_local_timezone(Local).single()
}

fn at_time(date: NaiveDate, hours: u32, minutes: u32) -> Option<DateTime<Local>> {
    date.and_hms_opt(hours, minutes, 0)?
        .and_local_timezone(Local)
        .single()
}

// --- ENTRY POINTS ---

/// Finds the first recognizable date/time expression under the fixed rule
/// order, cuts the matched span out of the text and returns the rest.
///
/// Always yields a date: a resolver producing an impossible calendar value
/// (hour 42, minute 99) is discarded and the next rule is tried; with no
/// usable match the date lands [`DEFAULT_DUE_DAYS`] ahead of `now` and the
/// text comes back untouched.
pub fn extract_at(text: &str, now: DateTime<Local>) -> DateExtraction {
    let remaining = text.trim();
    for rule in &RULES {
        let Some(caps) = rule.pattern.captures(remaining) else {
            continue;
        };
        if let Some(date) = (rule.resolve)(&caps, now) {
            let span = caps.get(0).map(|m| m.range()).unwrap_or_default();
            let mut rest = String::with_capacity(remaining.len());
            rest.push_str(&remaining[..span.start]);
            rest.push_str(&remaining[span.end..]);
            return DateExtraction {
                date,
                remaining_text: rest.trim().to_string(),
            };
        }
    }
    DateExtraction {
        date: default_due(now),
        remaining_text: remaining.to_string(),
    }
}

pub fn extract(text: &str) -> DateExtraction {
    extract_at(text, Local::now())
}

/// Long-form display rendering, e.g. "January 5, 2025, 11:59 PM". Display
/// only; not part of the parsing contract.
pub fn format_date(date: &DateTime<Local>) -> String {
    date.format("%B %-d, %Y, %I:%M %p").to_string()
}
