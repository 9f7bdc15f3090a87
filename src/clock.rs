use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// First instant of `date` in local time. When midnight falls in a DST gap the
/// earliest valid instant after it is used.
pub fn start_of_day(date: NaiveDate) -> DateTime<Local> {
    let midnight = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            (1..=3)
                .filter_map(|hours| {
                    Local
                        .from_local_datetime(&(midnight + chrono::Duration::hours(hours)))
                        .earliest()
                })
                .next()
        })
        .unwrap_or_else(|| Local.from_utc_datetime(&midnight))
}
