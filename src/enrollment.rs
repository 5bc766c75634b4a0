//! Enrollment eligibility and enroll-form helpers.
//!
//! Eligibility is never cached: callers recompute it from the current
//! selection and catalog whenever they need it.

use std::collections::HashSet;

use crate::model::{Course, DEFAULT_VALIDITY_MONTHS, User, VALIDITY_MONTHS_RANGE};

/// Ids of courses the user holds an `unlocked` enrollment for.
pub fn enrolled_course_ids(user: &User) -> HashSet<&str> {
    user.active_enrollments().map(|c| c.id()).collect()
}

/// Catalog courses the user may still be enrolled into, in catalog order.
///
/// With no selected user the whole catalog is returned.
pub fn eligible_courses<'a>(user: Option<&User>, catalog: &'a [Course]) -> Vec<&'a Course> {
    match user {
        None => catalog.iter().collect(),
        Some(u) => {
            let enrolled = enrolled_course_ids(u);
            catalog.iter().filter(|c| !enrolled.contains(c.id.as_str())).collect()
        }
    }
}

/// Parse the validity field. Anything non-numeric or outside 1..=60 becomes 12.
pub fn parse_validity_months(input: &str) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(n) if VALIDITY_MONTHS_RANGE.contains(&n) => n,
        _ => DEFAULT_VALIDITY_MONTHS,
    }
}
