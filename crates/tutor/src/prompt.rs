//! System prompt compilation.
//!
//! Compiles the session selections into a single system prompt built from
//! five sections, always in this order:
//!
//! 1. **CBC context**: identity line, core competencies, values, assessment bands
//! 2. **Current context**: grade label, subject, uppercased role
//! 3. **Key topics**: from the curriculum knowledge table (omitted when none)
//! 4. **Role block**: teacher or student framing
//! 5. **Response guidelines**: localisation, CBC alignment, material formats
//!
//! # Determinism
//!
//! Compilation is a pure function of its inputs: identical selections always
//! produce byte-identical prompts.

use cbc_tutor_core::curriculum::{self, GradeLevel, LearnerRole, Topics};
use cbc_tutor_core::error::CurriculumError;
use tracing::debug;

const IDENTITY_LINE: &str =
    "You are an expert Kenyan CBC (Competency-Based Curriculum) educational assistant.";

/// Curriculum background shared by every prompt.
pub const CBC_CURRICULUM_CONTEXT: &str = concat!(
    "KENYAN CBC (COMPETENCY-BASED CURRICULUM) CONTEXT:\n",
    "\n",
    "CORE COMPETENCIES:\n",
    "1. Communication and Collaboration\n",
    "2. Critical Thinking and Problem Solving\n",
    "3. Imagination and Creativity\n",
    "4. Citizenship\n",
    "5. Digital Literacy\n",
    "6. Learning to Learn\n",
    "7. Self-Efficacy\n",
    "\n",
    "VALUES:\n",
    "- Love, Responsibility, Respect, Unity, Peace, Patriotism, Integrity\n",
    "\n",
    "ASSESSMENT LEVELS:\n",
    "- Exceeds Expectations (80-100%)\n",
    "- Meets Expectations (60-79%)\n",
    "- Approaches Expectations (40-59%)\n",
    "- Below Expectations (<40%)\n",
    "\n",
    "KENYAN EDUCATIONAL CONTEXT:\n",
    "- Use Kenyan examples (Kenyan currency, local environments, Kenyan history)\n",
    "- Include cultural relevance (Kenyan communities, traditions)\n",
    "- Reference local resources and materials\n",
    "- Use Kenyan English spellings and terminology\n",
    "- Consider urban and rural school contexts",
);

const TEACHER_BLOCK: &str = concat!(
    "You are assisting a TEACHER. Focus on:\n",
    "- Creating comprehensive teaching materials\n",
    "- Providing lesson planning support\n",
    "- Generating assessments with marking schemes\n",
    "- Offering pedagogical strategies\n",
    "- Including differentiation techniques\n",
    "- Providing classroom management tips",
);

const STUDENT_BLOCK: &str = concat!(
    "You are assisting a STUDENT. Focus on:\n",
    "- Clear, simple explanations\n",
    "- Step-by-step problem solving\n",
    "- Encouraging and supportive tone\n",
    "- Making concepts relatable\n",
    "- Providing practice opportunities\n",
    "- Building confidence",
);

const RESPONSE_GUIDELINES: &str = concat!(
    "RESPONSE GUIDELINES:\n",
    "1. Use Kenyan context and examples (KES currency, Kenyan cities, local environment)\n",
    "2. Align with CBC competencies and values\n",
    "3. Provide culturally relevant content\n",
    "4. Use appropriate difficulty level for the grade\n",
    "5. Include practical, hands-on elements when possible\n",
    "6. Be encouraging and supportive\n",
    "7. Format responses clearly with headings and structure\n",
    "8. For mathematics, show step-by-step working\n",
    "9. For assessments, include marking schemes\n",
    "10. Use Kenyan English spelling (e.g., \"organisation\" not \"organization\")\n",
    "\n",
    "When creating materials:\n",
    "- Worksheets: Include instructions, questions, and answer spaces\n",
    "- Lesson plans: Follow 40-minute structure (intro, development, conclusion)\n",
    "- Quizzes: Provide questions and answers\n",
    "- Explanations: Break down concepts simply\n",
    "- Assignments: Make them practical and relevant\n",
    "\n",
    "Always be helpful, accurate, and aligned with CBC standards.",
);

/// The role-specific instruction block.
pub fn role_block(role: LearnerRole) -> &'static str {
    match role {
        LearnerRole::Teacher => TEACHER_BLOCK,
        LearnerRole::Student => STUDENT_BLOCK,
    }
}

/// Render the key-topics section, or `None` when the table has nothing.
fn topics_block(subject: &str, grade: GradeLevel) -> Option<String> {
    match curriculum::topics_for(subject, grade) {
        Topics::ForTier(topics) => Some(format!(
            "KEY TOPICS FOR {subject} ({grade}):\n{}",
            topics.join(", ")
        )),
        Topics::AllGrades(topics) => Some(format!(
            "KEY TOPICS FOR {subject}:\n{}",
            topics.join(", ")
        )),
        Topics::None => None,
    }
}

/// Compile the system prompt for a grade, subject, and role.
pub fn compile_system_prompt(grade: GradeLevel, subject: &str, role: LearnerRole) -> String {
    let current_context = format!(
        "CURRENT CONTEXT:\n- Grade Level: {grade}\n- Subject: {subject}\n- User Role: {}",
        role.as_str().to_uppercase()
    );

    let mut sections: Vec<String> = Vec::with_capacity(6);
    sections.push(IDENTITY_LINE.to_string());
    sections.push(CBC_CURRICULUM_CONTEXT.to_string());
    sections.push(current_context);
    if let Some(topics) = topics_block(subject, grade) {
        sections.push(topics);
    }
    sections.push(role_block(role).to_string());
    sections.push(RESPONSE_GUIDELINES.to_string());

    let prompt = sections.join("\n\n");
    debug!(
        grade = grade.number(),
        subject,
        role = role.as_str(),
        chars = prompt.len(),
        "Compiled system prompt"
    );
    prompt
}

/// Compile from raw selector labels, validating grade and role first.
///
/// Subject tier membership is not checked here; the session enforces it.
pub fn compile_from_labels(
    grade_label: &str,
    subject: &str,
    role_label: &str,
) -> Result<String, CurriculumError> {
    let grade: GradeLevel = grade_label.parse()?;
    let role: LearnerRole = role_label.parse()?;
    Ok(compile_system_prompt(grade, subject, role))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(n: u8) -> GradeLevel {
        GradeLevel::new(n).unwrap()
    }

    #[test]
    fn compilation_is_deterministic() {
        for g in GradeLevel::all() {
            for role in [LearnerRole::Teacher, LearnerRole::Student] {
                let subject = g.tier().default_subject();
                assert_eq!(
                    compile_system_prompt(g, subject, role),
                    compile_system_prompt(g, subject, role)
                );
            }
        }
    }

    #[test]
    fn prompt_contains_uppercased_role_and_grade_label() {
        for g in GradeLevel::all() {
            let teacher = compile_system_prompt(g, "English", LearnerRole::Teacher);
            assert!(teacher.contains("TEACHER"));
            assert!(teacher.contains(&g.label()));

            let student = compile_system_prompt(g, "English", LearnerRole::Student);
            assert!(student.contains("STUDENT"));
            assert!(student.contains(&g.label()));
        }
    }

    #[test]
    fn grade_four_maths_teacher_scenario() {
        let prompt = compile_from_labels("Grade 4", "Mathematics", "teacher").unwrap();
        assert!(prompt.contains("KEY TOPICS FOR Mathematics (Grade 4):"));
        assert!(prompt.contains("Fractions, Decimals, Multiplication, Division"));
        assert!(prompt.contains("You are assisting a TEACHER"));
        assert!(!prompt.contains("You are assisting a STUDENT"));
        assert!(!prompt.contains("Quadratic equations"));
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let prompt = compile_system_prompt(grade(5), "Mathematics", LearnerRole::Student);
        let positions: Vec<usize> = [
            "You are an expert Kenyan CBC",
            "CORE COMPETENCIES:",
            "CURRENT CONTEXT:",
            "KEY TOPICS FOR",
            "You are assisting a STUDENT",
            "RESPONSE GUIDELINES:",
        ]
        .iter()
        .map(|needle| prompt.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn all_grades_topics_have_no_grade_suffix() {
        let prompt = compile_system_prompt(grade(2), "Kiswahili", LearnerRole::Student);
        assert!(prompt.contains("KEY TOPICS FOR Kiswahili:\nKusoma, Kuandika"));
    }

    #[test]
    fn topics_block_omitted_when_unknown() {
        let prompt = compile_system_prompt(grade(8), "Agriculture", LearnerRole::Teacher);
        assert!(!prompt.contains("KEY TOPICS"));
        assert!(prompt.contains("- Subject: Agriculture"));
        assert!(!prompt.contains("\n\n\n"));
    }

    #[test]
    fn label_validation() {
        assert_eq!(
            compile_from_labels("Grade 11", "Mathematics", "teacher"),
            Err(CurriculumError::InvalidGrade("Grade 11".into()))
        );
        assert_eq!(
            compile_from_labels("Grade 4", "Mathematics", "principal"),
            Err(CurriculumError::InvalidRole("principal".into()))
        );
    }
}
