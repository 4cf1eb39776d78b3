pub mod availability;
pub mod booking;
pub mod ledger;
pub mod slots;

use chrono::{Local, NaiveDate};

/// Today's date in clinic-local time. The whole system runs in the clinic's
/// single timezone; no conversion happens anywhere.
pub(crate) fn clinic_today() -> NaiveDate {
    Local::now().date_naive()
}
