/// Run sequencing, failure policy and reports.
pub mod driver;
