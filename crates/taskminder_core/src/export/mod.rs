//! Calendar export.

pub mod ics;
