use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// The current UTC offset of `canonical_timezone`, e.g. "Asia/Kolkata".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

#[cfg(test)]
mod tests {
    use time::{UtcOffset, macros::offset};

    use super::get_local_offset;

    #[test]
    fn kolkata_is_five_and_a_half_hours_ahead() {
        assert_eq!(get_local_offset("Asia/Kolkata"), Some(offset!(+05:30)));
    }

    #[test]
    fn utc_has_no_offset() {
        assert_eq!(get_local_offset("Etc/UTC"), Some(UtcOffset::UTC));
    }

    #[test]
    fn unknown_timezone_gives_none() {
        assert_eq!(get_local_offset("Kerala/Backwaters"), None);
    }
}
