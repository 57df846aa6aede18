use serde::{Deserialize, Serialize};
use shared::domain::CourseId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: CourseId,
    pub completed_lessons: u32,
    pub total_lessons: u32,
}

impl CourseProgress {
    /// Whole-number percentage for a progress bar, in `0..=100`.
    pub fn percentage(&self) -> u8 {
        percentage_of(
            u64::from(self.completed_lessons.min(self.total_lessons)),
            u64::from(self.total_lessons),
        )
    }

    pub fn is_complete(&self) -> bool {
        self.total_lessons > 0 && self.completed_lessons >= self.total_lessons
    }
}

/// Weighted by lessons, so a long course counts for more than a short one.
pub fn overall_percentage(progress: &[CourseProgress]) -> u8 {
    let (completed, total) = progress.iter().fold((0u64, 0u64), |(done, all), p| {
        (
            done + u64::from(p.completed_lessons.min(p.total_lessons)),
            all + u64::from(p.total_lessons),
        )
    });
    percentage_of(completed, total)
}

fn percentage_of(completed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    // Round half up without going through floats.
    let scaled = (completed * 200 + total) / (total * 2);
    scaled.min(100) as u8
}
