use chrono::DateTime;

pub(crate) mod helper {
    #[cfg(not(test))]
    pub use super::get_utc_now;
    #[cfg(test)]
    pub use super::mock_chrono::get_utc_now;
    #[cfg(test)]
    pub use super::mock_chrono::set_mock_now;
}


#[cfg(not(test))]
pub fn get_utc_now() -> DateTime<chrono::Utc> {
    chrono::Utc::now()
}

/// render a timestamp the way every response carries it
pub(crate) fn format_timestamp(ts: &DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}
