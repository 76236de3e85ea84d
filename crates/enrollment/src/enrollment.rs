use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::{CourseId, DomainError, DomainResult, EnrollmentId, Entity, StudentId};

use crate::grading::{Average, EnrollmentStatus, Score};

/// Command: enroll a student in a course.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollStudent {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

/// Partial score update.
///
/// A present field overwrites the stored score; an absent field leaves the
/// stored score as it is. Scores can therefore be set one at a time but never
/// cleared through an update.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub score1: Option<Score>,
    pub score2: Option<Score>,
}

/// Enrollment (Matricula): one student in one course.
///
/// # Invariants
/// - `student_id`, `course_id` and `enrolled_at` never change after `open`.
/// - `average` is only ever written by [`recompute_grade_state`], and only
///   when both scores are present.
/// - `status` is `Cursando` until an average exists, then follows the average.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnrollmentRecord")]
pub struct Enrollment {
    id: EnrollmentId,
    student_id: StudentId,
    course_id: CourseId,
    score1: Option<Score>,
    score2: Option<Score>,
    average: Option<Average>,
    status: EnrollmentStatus,
    enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    /// Build a fresh enrollment: no scores, no average, `Cursando`.
    ///
    /// Callers must have passed [`validate_enrollment_uniqueness`] first.
    pub fn open(
        id: EnrollmentId,
        student_id: StudentId,
        course_id: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            student_id,
            course_id,
            score1: None,
            score2: None,
            average: None,
            status: EnrollmentStatus::Cursando,
            enrolled_at,
        }
    }

    pub fn id_typed(&self) -> EnrollmentId {
        self.id
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn score1(&self) -> Option<Score> {
        self.score1
    }

    pub fn score2(&self) -> Option<Score> {
        self.score2
    }

    pub fn average(&self) -> Option<Average> {
        self.average
    }

    pub fn status(&self) -> EnrollmentStatus {
        self.status
    }

    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }

    /// Write the present fields of `update` without recomputing anything.
    pub fn record_scores(&mut self, update: ScoreUpdate) {
        if let Some(score) = update.score1 {
            self.score1 = Some(score);
        }
        if let Some(score) = update.score2 {
            self.score2 = Some(score);
        }
    }

    /// Record `update` and recompute average and status.
    pub fn grade(&mut self, update: ScoreUpdate) {
        self.record_scores(update);
        self.recompute_grade_state();
    }

    /// See [`recompute_grade_state`].
    pub fn recompute_grade_state(&mut self) {
        if let (Some(score1), Some(score2)) = (self.score1, self.score2) {
            let average = Average::of(score1, score2);
            self.average = Some(average);
            self.status = average.status();
        }
    }
}

/// Stored shape of an [`Enrollment`], checked before it becomes one.
#[derive(Deserialize)]
struct EnrollmentRecord {
    id: EnrollmentId,
    student_id: StudentId,
    course_id: CourseId,
    score1: Option<Score>,
    score2: Option<Score>,
    average: Option<Average>,
    status: EnrollmentStatus,
    enrolled_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentRecord> for Enrollment {
    type Error = DomainError;

    /// Accepts only records `recompute_grade_state` could have produced: no
    /// average means CURSANDO, and an average must be the one derived from
    /// both stored scores, with the status it implies.
    fn try_from(record: EnrollmentRecord) -> Result<Self, Self::Error> {
        match (record.score1, record.score2, record.average) {
            (_, _, None) if record.status != EnrollmentStatus::Cursando => {
                return Err(DomainError::invariant(format!(
                    "enrollment {} is {} without an average",
                    record.id, record.status
                )));
            }
            (Some(score1), Some(score2), None) => {
                return Err(DomainError::invariant(format!(
                    "enrollment {} has scores {score1} and {score2} but no average",
                    record.id
                )));
            }
            (Some(score1), Some(score2), Some(average)) => {
                let expected = Average::of(score1, score2);
                if average != expected {
                    return Err(DomainError::invariant(format!(
                        "enrollment {} has average {average}, expected {expected}",
                        record.id
                    )));
                }
                if record.status != expected.status() {
                    return Err(DomainError::invariant(format!(
                        "enrollment {} is {} with average {expected}",
                        record.id, record.status
                    )));
                }
            }
            (_, _, Some(average)) => {
                return Err(DomainError::invariant(format!(
                    "enrollment {} has average {average} without both scores",
                    record.id
                )));
            }
            (_, _, None) => {}
        }

        Ok(Self {
            id: record.id,
            student_id: record.student_id,
            course_id: record.course_id,
            score1: record.score1,
            score2: record.score2,
            average: record.average,
            status: record.status,
            enrolled_at: record.enrolled_at,
        })
    }
}

impl Entity for Enrollment {
    type Id = EnrollmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Derive average and status from the current scores.
///
/// With both scores present the average is `round_half_up((s1 + s2) / 2, 2)`
/// and the status is APROVADO at or above 7.00, REPROVADO below. With either
/// score absent nothing changes: no partial average, and a graded record is
/// never moved back to CURSANDO. Idempotent; never fails.
pub fn recompute_grade_state(enrollment: &mut Enrollment) {
    enrollment.recompute_grade_state();
}

/// Precondition gate for [`Enrollment::open`].
///
/// `exists` answers whether an enrollment for the pair is already stored.
pub fn validate_enrollment_uniqueness<F>(
    student_id: StudentId,
    course_id: CourseId,
    exists: F,
) -> DomainResult<()>
where
    F: FnOnce(StudentId, CourseId) -> bool,
{
    if exists(student_id, course_id) {
        return Err(DomainError::conflict(format!(
            "student {student_id} is already enrolled in course {course_id}"
        )));
    }
    Ok(())
}
