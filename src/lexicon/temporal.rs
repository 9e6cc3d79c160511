//! Temporal expression grammar.
//!
//! Nom combinators over the token slice. Each parser consumes a whole
//! expression ("from 2022 to 2024", "q3 2023", "last 6 months") and yields a
//! [`TemporalKind`]. [`scan`] walks the token stream and tries the grammar at
//! every position, longest form first.
//!
//! A four-digit number only becomes a year inside one of these forms; outside
//! them it stays a plain number.

use chrono::{Datelike, Days, Months, NaiveDate};
use nom::{
    branch::alt,
    combinator::{map, opt},
    error::ErrorKind,
    sequence::{preceded, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

use super::tokenizer::Token;
use crate::catalog::Granularity;

/// Parser input: a slice of tokens.
type Input<'a> = &'a [Token];

/// Parser result type.
type ParseResult<'a, T> = IResult<Input<'a>, T>;

// ============================================================================
// AST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemporalKind {
    Year { year: i32 },
    YearRange { start: i32, end: i32 },
    Quarter { year: i32, quarter: u32 },
    Month { year: i32, month: u32 },
    Since { year: i32 },
    Relative { count: u32, unit: Granularity },
    CurrentPeriod { unit: Granularity },
    YearToDate,
    /// Bucket word on its own ("monthly", "by quarter").
    Granularity { unit: Granularity },
    /// "over time", "timeline".
    OverTime,
}

/// A recognized temporal expression and the prompt words it covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalExpr {
    pub surface: String,
    /// Position of the first covered token.
    pub position: usize,
    pub kind: TemporalKind,
}

impl TemporalExpr {
    pub fn new(tokens: &[Token], kind: TemporalKind) -> Self {
        let surface = tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let position = tokens.first().map_or(0, |t| t.position);
        Self {
            surface,
            position,
            kind,
        }
    }

    /// Whether the expression asks for a series over time rather than a
    /// single period filter.
    pub fn implies_series(&self) -> bool {
        matches!(
            self.kind,
            TemporalKind::Granularity { .. }
                | TemporalKind::OverTime
                | TemporalKind::YearRange { .. }
                | TemporalKind::Relative { .. }
                | TemporalKind::Since { .. }
        )
    }

    /// Bucket size implied by the expression, if any.
    pub fn granularity(&self) -> Option<Granularity> {
        match self.kind {
            TemporalKind::Granularity { unit } => Some(unit),
            _ => None,
        }
    }

    /// Concrete date window. Relative forms need a reference date.
    pub fn resolve(&self, reference: Option<NaiveDate>) -> Option<DateRange> {
        match self.kind {
            TemporalKind::Year { year } => {
                DateRange::bounded(ymd(year, 1, 1)?, ymd(year.checked_add(1)?, 1, 1)?)
            }
            TemporalKind::YearRange { start, end } => {
                DateRange::bounded(ymd(start, 1, 1)?, ymd(end.checked_add(1)?, 1, 1)?)
            }
            TemporalKind::Quarter { year, quarter } => {
                let start = ymd(year, quarter * 3 - 2, 1)?;
                DateRange::bounded(start, start.checked_add_months(Months::new(3))?)
            }
            TemporalKind::Month { year, month } => {
                let start = ymd(year, month, 1)?;
                DateRange::bounded(start, start.checked_add_months(Months::new(1))?)
            }
            TemporalKind::Since { year } => Some(DateRange {
                start: ymd(year, 1, 1)?,
                end: None,
            }),
            TemporalKind::Relative { count, unit } => {
                let end = reference?.checked_add_days(Days::new(1))?;
                let start = step_back(end, unit, count)?;
                DateRange::bounded(start, end)
            }
            TemporalKind::CurrentPeriod { unit } => {
                let reference = reference?;
                DateRange::bounded(
                    period_start(reference, unit)?,
                    reference.checked_add_days(Days::new(1))?,
                )
            }
            TemporalKind::YearToDate => {
                let reference = reference?;
                DateRange::bounded(
                    ymd(reference.year(), 1, 1)?,
                    reference.checked_add_days(Days::new(1))?,
                )
            }
            TemporalKind::Granularity { .. } | TemporalKind::OverTime => None,
        }
    }
}

/// Half-open date window: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    fn bounded(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start < end).then_some(Self {
            start,
            end: Some(end),
        })
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn step_back(end: NaiveDate, unit: Granularity, count: u32) -> Option<NaiveDate> {
    match unit {
        Granularity::Day => end.checked_sub_days(Days::new(u64::from(count))),
        Granularity::Week => end.checked_sub_days(Days::new(u64::from(count) * 7)),
        Granularity::Month => end.checked_sub_months(Months::new(count)),
        Granularity::Quarter => end.checked_sub_months(Months::new(count.checked_mul(3)?)),
        Granularity::Year => end.checked_sub_months(Months::new(count.checked_mul(12)?)),
    }
}

fn period_start(date: NaiveDate, unit: Granularity) -> Option<NaiveDate> {
    match unit {
        Granularity::Day => Some(date),
        Granularity::Week => {
            date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        }
        Granularity::Month => ymd(date.year(), date.month(), 1),
        Granularity::Quarter => ymd(date.year(), (date.month0() / 3) * 3 + 1, 1),
        Granularity::Year => ymd(date.year(), 1, 1),
    }
}

// ============================================================================
// Token Matchers
// ============================================================================

fn fail<T>(input: Input, kind: ErrorKind) -> ParseResult<T> {
    Err(nom::Err::Error(nom::error::Error::new(input, kind)))
}

/// Match one of a fixed set of words.
fn word(choices: &'static [&'static str]) -> impl Fn(Input) -> ParseResult<&Token> {
    move |input: Input| match input.first() {
        Some(token) if choices.contains(&token.text.as_str()) => Ok((&input[1..], token)),
        Some(_) => fail(input, ErrorKind::Tag),
        None => fail(input, ErrorKind::Eof),
    }
}

fn year(input: Input) -> ParseResult<i32> {
    match input.first().and_then(Token::as_year) {
        Some(y) => Ok((&input[1..], y)),
        None => fail(input, ErrorKind::Digit),
    }
}

/// Small count ("last 3 months"); years are not counts.
fn count(input: Input) -> ParseResult<u32> {
    match input.first() {
        Some(token) if token.as_year().is_none() => match token.number {
            Some(n) if (1..=999).contains(&n) => Ok((&input[1..], n as u32)),
            _ => fail(input, ErrorKind::Digit),
        },
        Some(_) => fail(input, ErrorKind::Digit),
        None => fail(input, ErrorKind::Eof),
    }
}

fn unit(input: Input) -> ParseResult<Granularity> {
    match input.first().and_then(|t| Granularity::parse(&t.text)) {
        Some(g) => Ok((&input[1..], g)),
        None => fail(input, ErrorKind::Tag),
    }
}

fn quarter(input: Input) -> ParseResult<u32> {
    let q = match input.first().map(|t| t.text.as_str()) {
        Some("q1") => 1,
        Some("q2") => 2,
        Some("q3") => 3,
        Some("q4") => 4,
        Some(_) => return fail(input, ErrorKind::Tag),
        None => return fail(input, ErrorKind::Eof),
    };
    Ok((&input[1..], q))
}

fn month_name(input: Input) -> ParseResult<u32> {
    let m = match input.first().map(|t| t.text.as_str()) {
        Some("january" | "jan") => 1,
        Some("february" | "feb") => 2,
        Some("march" | "mar") => 3,
        Some("april" | "apr") => 4,
        Some("may") => 5,
        Some("june" | "jun") => 6,
        Some("july" | "jul") => 7,
        Some("august" | "aug") => 8,
        Some("september" | "sep" | "sept") => 9,
        Some("october" | "oct") => 10,
        Some("november" | "nov") => 11,
        Some("december" | "dec") => 12,
        Some(_) => return fail(input, ErrorKind::Tag),
        None => return fail(input, ErrorKind::Eof),
    };
    Ok((&input[1..], m))
}

// ============================================================================
// Expression Parsers
// ============================================================================

/// "from 2022 to 2024", "between 2021 and 2023", "2022 through 2024"
fn year_range(input: Input) -> ParseResult<TemporalKind> {
    map(
        tuple((
            opt(word(&["from", "between"])),
            year,
            word(&["to", "and", "through", "thru", "until", "till"]),
            year,
        )),
        |(_, a, _, b)| TemporalKind::YearRange {
            start: a.min(b),
            end: a.max(b),
        },
    )(input)
}

/// "q3 2023", "q1 of 2024"
fn quarter_of_year(input: Input) -> ParseResult<TemporalKind> {
    map(
        tuple((quarter, opt(word(&["of", "in"])), year)),
        |(quarter, _, year)| TemporalKind::Quarter { year, quarter },
    )(input)
}

/// "march 2024", "jan of 2023"
fn month_of_year(input: Input) -> ParseResult<TemporalKind> {
    map(
        tuple((month_name, opt(word(&["of", "in"])), year)),
        |(month, _, year)| TemporalKind::Month { year, month },
    )(input)
}

/// "since 2020", "after 2019"
fn since_year(input: Input) -> ParseResult<TemporalKind> {
    map(preceded(word(&["since", "after"]), year), |year| {
        TemporalKind::Since { year }
    })(input)
}

/// "last 6 months", "past year", "previous 2 quarters"
fn relative(input: Input) -> ParseResult<TemporalKind> {
    map(
        tuple((
            word(&["last", "past", "previous", "prior", "trailing"]),
            opt(count),
            unit,
        )),
        |(_, count, unit)| TemporalKind::Relative {
            count: count.unwrap_or(1),
            unit,
        },
    )(input)
}

/// "this month", "current quarter"
fn current_period(input: Input) -> ParseResult<TemporalKind> {
    map(
        preceded(word(&["this", "current"]), unit),
        |unit| TemporalKind::CurrentPeriod { unit },
    )(input)
}

/// "ytd", "year to date"
fn year_to_date(input: Input) -> ParseResult<TemporalKind> {
    map(
        alt((
            map(word(&["ytd"]), |_| ()),
            map(tuple((word(&["year"]), word(&["to"]), word(&["date"]))), |_| ()),
        )),
        |_| TemporalKind::YearToDate,
    )(input)
}

/// "in 2024", "for 2023", "fy 2022", or a year directly after such a word.
fn single_year(input: Input) -> ParseResult<TemporalKind> {
    map(
        preceded(
            word(&["in", "for", "during", "of", "throughout", "year", "fy", "through"]),
            year,
        ),
        |year| TemporalKind::Year { year },
    )(input)
}

/// One temporal expression at the head of the input.
pub fn temporal_expr(input: Input) -> ParseResult<TemporalKind> {
    alt((
        year_range,
        quarter_of_year,
        month_of_year,
        since_year,
        relative,
        current_period,
        year_to_date,
        single_year,
    ))(input)
}

/// Find every temporal expression in the stream.
///
/// Returns the expressions in prompt order and a per-token flag marking the
/// tokens they consumed.
pub fn scan(tokens: &[Token]) -> (Vec<TemporalExpr>, Vec<bool>) {
    let mut found = Vec::new();
    let mut consumed = vec![false; tokens.len()];
    let mut i = 0;

    while i < tokens.len() {
        match temporal_expr(&tokens[i..]) {
            Ok((rest, kind)) => {
                let end = tokens.len() - rest.len();
                found.push(TemporalExpr::new(&tokens[i..end], kind));
                consumed[i..end].iter_mut().for_each(|c| *c = true);
                i = end;
            }
            Err(_) => i += 1,
        }
    }

    (found, consumed)
}

// ============================================================================
// Tests
// ============================================================================
