//! COSEM date, time and date-time formats
//!
//! Fixed 5/4/12-byte layouts. Every sub-field may carry a "not
//! specified" sentinel (0xFF for byte fields, 0xFFFF for the year,
//! 0x8000 for the deviation) which is preserved losslessly through
//! encode/decode.

use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const NOT_SPECIFIED: u8 = 0xFF;
pub const YEAR_NOT_SPECIFIED: u16 = 0xFFFF;
pub const DEVIATION_NOT_SPECIFIED: i16 = 0x8000u16 as i16;

const LAST_DAY_OF_MONTH: u8 = 0xFE;
const SECOND_LAST_DAY_OF_MONTH: u8 = 0xFD;
const DAYLIGHT_SAVINGS_BEGIN: u8 = 0xFE;
const DAYLIGHT_SAVINGS_END: u8 = 0xFD;

/// Clock status flags carried in the last byte of a date-time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    InvalidValue = 0x01,
    DoubtfulValue = 0x02,
    DifferentClockBase = 0x04,
    InvalidClockStatus = 0x08,
    DaylightSavingActive = 0x80,
}

impl ClockStatus {
    pub fn to_byte(flags: &[ClockStatus]) -> u8 {
        flags.iter().fold(0, |byte, flag| byte | *flag as u8)
    }

    pub fn from_byte(byte: u8) -> Vec<ClockStatus> {
        [
            ClockStatus::InvalidValue,
            ClockStatus::DoubtfulValue,
            ClockStatus::DifferentClockBase,
            ClockStatus::InvalidClockStatus,
            ClockStatus::DaylightSavingActive,
        ]
        .into_iter()
        .filter(|flag| byte & *flag as u8 != 0)
        .collect()
    }
}

/// COSEM date: year, month, day of month, day of week (5 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosemDate {
    year: u16,
    month: u8,
    day_of_month: u8,
    day_of_week: u8,
}

impl CosemDate {
    pub const LENGTH: usize = 5;

    /// Month 1..=12 or 0xFF/0xFE/0xFD, day 1..=31 or 0xFF/0xFE/0xFD.
    pub fn new(year: u16, month: u8, day_of_month: u8) -> DlmsResult<Self> {
        Self::with_day_of_week(year, month, day_of_month, NOT_SPECIFIED)
    }

    /// Day of week 1..=7 (1 = Monday) or 0xFF
    pub fn with_day_of_week(
        year: u16,
        month: u8,
        day_of_month: u8,
        day_of_week: u8,
    ) -> DlmsResult<Self> {
        let month_special = matches!(
            month,
            NOT_SPECIFIED | DAYLIGHT_SAVINGS_BEGIN | DAYLIGHT_SAVINGS_END
        );
        if month < 1 || (month > 12 && !month_special) {
            return Err(DlmsError::InvalidData(format!(
                "Month out of range: {}",
                month
            )));
        }
        let day_special = matches!(
            day_of_month,
            NOT_SPECIFIED | LAST_DAY_OF_MONTH | SECOND_LAST_DAY_OF_MONTH
        );
        if day_of_month < 1 || (day_of_month > 31 && !day_special) {
            return Err(DlmsError::InvalidData(format!(
                "Day of month out of range: {}",
                day_of_month
            )));
        }
        if (day_of_week < 1 || day_of_week > 7) && day_of_week != NOT_SPECIFIED {
            return Err(DlmsError::InvalidData(format!(
                "Day of week out of range: {}",
                day_of_week
            )));
        }
        Ok(Self {
            year,
            month,
            day_of_month,
            day_of_week,
        })
    }

    pub fn decode(bytes: &[u8]) -> DlmsResult<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "Date must be {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }
        Ok(Self {
            year: u16::from_be_bytes([bytes[0], bytes[1]]),
            month: bytes[2],
            day_of_month: bytes[3],
            day_of_week: bytes[4],
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LENGTH);
        out.extend_from_slice(&self.year.to_be_bytes());
        out.push(self.month);
        out.push(self.day_of_month);
        out.push(self.day_of_week);
        out
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day_of_month(&self) -> u8 {
        self.day_of_month
    }

    pub fn day_of_week(&self) -> u8 {
        self.day_of_week
    }
}

impl fmt::Display for CosemDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year, self.month, self.day_of_month
        )
    }
}

/// COSEM time: hour, minute, second, hundredths (4 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosemTime {
    hour: u8,
    minute: u8,
    second: u8,
    hundredths: u8,
}

impl CosemTime {
    pub const LENGTH: usize = 4;

    pub fn new(hour: u8, minute: u8, second: u8) -> DlmsResult<Self> {
        Self::with_hundredths(hour, minute, second, NOT_SPECIFIED)
    }

    pub fn with_hundredths(hour: u8, minute: u8, second: u8, hundredths: u8) -> DlmsResult<Self> {
        Self::check(hour, 23, "hour")?;
        Self::check(minute, 59, "minute")?;
        Self::check(second, 59, "second")?;
        Self::check(hundredths, 99, "hundredths")?;
        Ok(Self {
            hour,
            minute,
            second,
            hundredths,
        })
    }

    fn check(value: u8, max: u8, name: &str) -> DlmsResult<()> {
        if value > max && value != NOT_SPECIFIED {
            return Err(DlmsError::InvalidData(format!(
                "{} out of range: {}",
                name, value
            )));
        }
        Ok(())
    }

    pub fn decode(bytes: &[u8]) -> DlmsResult<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "Time must be {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }
        Ok(Self {
            hour: bytes[0],
            minute: bytes[1],
            second: bytes[2],
            hundredths: bytes[3],
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        vec![self.hour, self.minute, self.second, self.hundredths]
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn hundredths(&self) -> u8 {
        self.hundredths
    }
}

impl fmt::Display for CosemTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// COSEM date-time: date, time, deviation, clock status (12 bytes)
///
/// The deviation is signed minutes from local time to GMT in -720..=720,
/// or [`DEVIATION_NOT_SPECIFIED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosemDateTime {
    date: CosemDate,
    time: CosemTime,
    deviation: i16,
    clock_status: u8,
}

impl CosemDateTime {
    pub const LENGTH: usize = 12;

    pub fn new(
        year: u16,
        month: u8,
        day_of_month: u8,
        hour: u8,
        minute: u8,
        second: u8,
        deviation: i16,
        clock_status: &[ClockStatus],
    ) -> DlmsResult<Self> {
        Self::from_parts(
            CosemDate::new(year, month, day_of_month)?,
            CosemTime::new(hour, minute, second)?,
            deviation,
            clock_status,
        )
    }

    pub fn from_parts(
        date: CosemDate,
        time: CosemTime,
        deviation: i16,
        clock_status: &[ClockStatus],
    ) -> DlmsResult<Self> {
        if !(-720..=720).contains(&deviation) && deviation != DEVIATION_NOT_SPECIFIED {
            return Err(DlmsError::InvalidData(format!(
                "Deviation out of range [-720, 720]: {}",
                deviation
            )));
        }
        Ok(Self {
            date,
            time,
            deviation,
            clock_status: ClockStatus::to_byte(clock_status),
        })
    }

    pub fn decode(bytes: &[u8]) -> DlmsResult<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "Date-time must be {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }
        Ok(Self {
            date: CosemDate::decode(&bytes[0..5])?,
            time: CosemTime::decode(&bytes[5..9])?,
            deviation: i16::from_be_bytes([bytes[9], bytes[10]]),
            clock_status: bytes[11],
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LENGTH);
        out.extend_from_slice(&self.date.encode());
        out.extend_from_slice(&self.time.encode());
        out.extend_from_slice(&self.deviation.to_be_bytes());
        out.push(self.clock_status);
        out
    }

    pub fn date(&self) -> &CosemDate {
        &self.date
    }

    pub fn time(&self) -> &CosemTime {
        &self.time
    }

    pub fn deviation(&self) -> i16 {
        self.deviation
    }

    pub fn clock_status(&self) -> Vec<ClockStatus> {
        ClockStatus::from_byte(self.clock_status)
    }

    /// Chronological field-wise comparison used for range selection.
    ///
    /// A field that is "not specified" on either side matches anything,
    /// so partially specified stamps compare by the remaining fields.
    /// Deviation and clock status do not take part in the ordering.
    pub fn cmp_calendar(&self, other: &Self) -> Ordering {
        let year = |v: u16| if v == YEAR_NOT_SPECIFIED { None } else { Some(u32::from(v)) };
        let byte = |v: u8| if v == NOT_SPECIFIED { None } else { Some(u32::from(v)) };

        let fields = [
            (year(self.date.year), year(other.date.year)),
            (byte(self.date.month), byte(other.date.month)),
            (byte(self.date.day_of_month), byte(other.date.day_of_month)),
            (byte(self.time.hour), byte(other.time.hour)),
            (byte(self.time.minute), byte(other.time.minute)),
            (byte(self.time.second), byte(other.time.second)),
            (byte(self.time.hundredths), byte(other.time.hundredths)),
        ];
        for (lhs, rhs) in fields {
            match (lhs, rhs) {
                (Some(a), Some(b)) => match a.cmp(&b) {
                    Ordering::Equal => continue,
                    order => return order,
                },
                // wildcard on either side
                _ => continue,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for CosemDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}
