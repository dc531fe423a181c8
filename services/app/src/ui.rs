//! services/app/src/ui.rs
//!
//! Small presentation helpers: avatar initials, expiry badges, and the
//! watermark caption. Pure string formatting; no state.

use lms_core::catalog::ExpiryStatus;
use lms_core::domain::Student;

/// Avatar initials from the student's names; `??` when there is nothing to
/// draw from.
pub fn initials(first_name: &str, last_name: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(c) = first_name.trim().chars().next() {
        out.extend(c.to_uppercase());
    }
    if let Some(c) = last_name.and_then(|l| l.trim().chars().next()) {
        out.extend(c.to_uppercase());
    }
    if out.is_empty() {
        "??".to_string()
    } else {
        out
    }
}

/// The expiry badge shown on a course card.
pub fn expiry_label(status: ExpiryStatus) -> String {
    match status {
        ExpiryStatus::NoExpiry => "No Expiry".to_string(),
        ExpiryStatus::Expired => "Expired".to_string(),
        ExpiryStatus::ExpiresToday => "Expires Today".to_string(),
        ExpiryStatus::ExpiresTomorrow => "Expires Tomorrow".to_string(),
        ExpiryStatus::DaysLeft(days) => format!("{days} days left"),
        ExpiryStatus::Until(date) => format!("Until {}", date.format("%b %-d, %Y")),
    }
}

/// The caption rendered across the video surface.
pub fn watermark_text(student: &Student) -> String {
    format!("{} • {}", student.display_name(), student.email)
}
