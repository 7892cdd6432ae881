//! Exclusion list commands

use crate::output::{print_info, print_success};
use timeline_lib::{ExclusionFilter, StructuredLogger};

/// Print the exclusion decision for each locator
pub fn check_locators(filter: &ExclusionFilter, locators: &[String]) {
    let logger = StructuredLogger::new("command-line");
    for locator in locators {
        let excluded = filter.is_excluded(locator);
        logger.log_exclusion(locator, excluded);
        if excluded {
            print_success(&format!("excluded  {}", locator));
        } else {
            print_info(&format!("reported  {}", locator));
        }
    }
}
