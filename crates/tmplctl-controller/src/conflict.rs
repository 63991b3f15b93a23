//! Operator-facing text for the attribute-in-use gate.

use crate::config::FORCE_UPDATE_ENV;

/// Joins names as `A`, `A and B` or `A, B, and C`.
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => "unspecified attributes".to_string(),
        [one] => one.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

pub fn destructive_change_warning(names: &[String]) -> String {
    format!(
        "You have made changes to the following observation attributes:\n{}\n\
         If you choose to apply these changes ALL observation data will be deleted \
         (including observations that were not changed). To apply the changes run:\n\n\
         {FORCE_UPDATE_ENV}=true terraform apply",
        join_names(names)
    )
}
