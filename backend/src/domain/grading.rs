//! Grade derivation for the student grading tool.
//!
//! Grading is a pure function of the marks: the average is `total / count`,
//! and the grade is the first band (best first) whose inclusive lower bound
//! the raw average reaches. The stored average is rounded to 2 decimals.

use std::collections::BTreeMap;

use shared::{Grade, GradeResult, GradeStats, Marks, Student};

use super::error::StoreError;

pub const MAX_MARK: u8 = 100;

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map an average onto the grading scale
pub fn grade_for_average(average: f64) -> Grade {
    Grade::ALL
        .iter()
        .copied()
        .find(|grade| average >= f64::from(grade.min_score()))
        .unwrap_or(Grade::F)
}

/// Compute total, average and grade for a set of marks
pub fn calculate_grade(marks: &[u8]) -> GradeResult {
    let total: u32 = marks.iter().map(|m| u32::from(*m)).sum();
    let average = if marks.is_empty() {
        0.0
    } else {
        f64::from(total) / marks.len() as f64
    };
    let grade = grade_for_average(average);

    GradeResult {
        total,
        average: round2(average),
        grade,
        description: grade.description().to_string(),
    }
}

/// Reject marks outside 0..=100
pub fn validate_marks(marks: &Marks) -> Result<(), StoreError> {
    if let Some((index, mark)) = marks.iter().enumerate().find(|(_, m)| **m > MAX_MARK) {
        return Err(StoreError::InvalidMarks(format!(
            "mark {} at position {} exceeds {}",
            mark, index, MAX_MARK
        )));
    }
    Ok(())
}

/// Refresh the cached fields of a student from its marks
pub fn apply_grade(student: &mut Student) {
    let result = calculate_grade(&student.marks);
    student.total = result.total;
    student.average = result.average;
    student.grade = result.grade;
    student.description = result.description;
}

/// Dashboard aggregates over all graded students
pub fn grade_stats(students: &[Student]) -> GradeStats {
    let mut distribution: BTreeMap<Grade, usize> =
        Grade::ALL.iter().map(|grade| (*grade, 0)).collect();
    for student in students {
        *distribution.entry(student.grade).or_insert(0) += 1;
    }

    let total_students = students.len();
    if total_students == 0 {
        return GradeStats {
            total_students,
            average_score: 0.0,
            distribution,
            pass_rate: 0,
        };
    }

    let average_score =
        students.iter().map(|s| s.average).sum::<f64>() / total_students as f64;
    let top = distribution[&Grade::A] + distribution[&Grade::B];
    let pass_rate = (top as f64 / total_students as f64 * 100.0).round() as u32;

    GradeStats {
        total_students,
        average_score: round2(average_score),
        distribution,
        pass_rate,
    }
}
