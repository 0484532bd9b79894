//! `cbc-tutor prompt`: print the compiled system prompt.

use cbc_tutor::compile_system_prompt;
use cbc_tutor_core::curriculum::{self, GradeLevel, LearnerRole};
use cbc_tutor_core::error::CurriculumError;

pub fn run(grade: GradeLevel, subject: &str, role: LearnerRole) -> Result<(), Box<dyn std::error::Error>> {
    let tier = grade.tier();
    let subject = curriculum::canonical_subject(subject, tier).ok_or_else(|| {
        CurriculumError::SubjectNotInTier {
            subject: subject.trim().to_string(),
            tier: tier.name().to_string(),
        }
    })?;

    println!("{}", compile_system_prompt(grade, subject, role));
    Ok(())
}
