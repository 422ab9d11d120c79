//! Student progress through a course's ordered lessons.
//!
//! Lessons (sub-activities) are passed in course order: activities by
//! position, then lessons by position within each activity.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::DbId;

/// Progress summary returned to the student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
    pub next_lesson_id: Option<DbId>,
    pub is_complete: bool,
}

/// Completion percentage, rounded to one decimal. An empty course is 0%.
pub fn course_progress_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = completed.min(total) as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// First lesson in course order that has not been completed.
pub fn next_lesson(ordered: &[DbId], completed: &HashSet<DbId>) -> Option<DbId> {
    ordered.iter().copied().find(|id| !completed.contains(id))
}

/// Whether `target` may be opened: every earlier lesson must be complete.
///
/// Unknown lessons are locked.
pub fn is_unlocked(ordered: &[DbId], completed: &HashSet<DbId>, target: DbId) -> bool {
    match ordered.iter().position(|id| *id == target) {
        Some(idx) => ordered[..idx].iter().all(|id| completed.contains(id)),
        None => false,
    }
}

/// Build the full progress summary for a course.
///
/// Completions of lessons no longer in the course are ignored.
pub fn summarize(ordered: &[DbId], completed: &HashSet<DbId>) -> CourseProgress {
    let done = ordered.iter().filter(|id| completed.contains(id)).count();
    let total = ordered.len();
    CourseProgress {
        completed: done,
        total,
        percent: course_progress_percent(done, total),
        next_lesson_id: next_lesson(ordered, completed),
        is_complete: total > 0 && done == total,
    }
}
