//! Fixed guidance texts: welcome messages, example requests, capabilities.

use cbc_tutor_core::curriculum::{GradeLevel, LearnerRole};

/// What the tutor advertises it can do.
pub const CAPABILITIES: &[&str] = &[
    "📝 Create worksheets",
    "📋 Generate lesson plans",
    "✅ Make quizzes & tests",
    "💡 Explain concepts",
    "🎯 Design activities",
    "📊 Help with homework",
    "🎴 Create flashcards",
    "📖 Provide study notes",
];

const TEACHER_EXAMPLES: &[&str] = &[
    "Create a worksheet on fractions for Grade 4",
    "Write a lesson plan about photosynthesis",
    "Generate a quiz on Kenyan history",
    "Make flashcards for Kiswahili verbs",
];

const STUDENT_EXAMPLES: &[&str] = &[
    "Help me understand fractions",
    "Explain photosynthesis simply",
    "Give me practice problems for multiplication",
    "How do I solve this math problem?",
];

/// Ready-made prompts for the given role.
pub fn example_requests(role: LearnerRole) -> &'static [&'static str] {
    match role {
        LearnerRole::Teacher => TEACHER_EXAMPLES,
        LearnerRole::Student => STUDENT_EXAMPLES,
    }
}

/// Greeting shown while the conversation is empty.
pub fn welcome_message(role: LearnerRole, grade: GradeLevel, subject: &str) -> String {
    match role {
        LearnerRole::Teacher => format!(
            concat!(
                "👋 **Welcome, Teacher!**\n\n",
                "I'm your CBC AI Tutor, ready to help you create amazing learning materials for {grade} {subject}.\n\n",
                "**I can help you:**\n",
                "- 📝 Create custom worksheets\n",
                "- 📋 Generate comprehensive lesson plans\n",
                "- ✅ Make quizzes and assessments\n",
                "- 🎯 Design engaging activities\n",
                "- 🎴 Create flashcards\n",
                "- 💡 Explain teaching strategies\n\n",
                "**Just ask me!** For example:\n",
                "- \"Create a worksheet on fractions\"\n",
                "- \"Write a lesson plan about photosynthesis\"\n",
                "- \"Generate a quiz on Kenyan history\"\n\n",
                "What would you like me to create today?",
            ),
            grade = grade,
            subject = subject,
        ),
        LearnerRole::Student => format!(
            concat!(
                "👋 **Hello, Student!**\n\n",
                "I'm here to help you learn {subject} for {grade}!\n\n",
                "**I can help you:**\n",
                "- 💡 Understand difficult concepts\n",
                "- 📝 Practice with worksheets\n",
                "- ✅ Prepare for tests\n",
                "- 📖 Study and revise\n",
                "- 🎯 Do your homework\n\n",
                "**Just ask me!** For example:\n",
                "- \"Help me understand fractions\"\n",
                "- \"Explain photosynthesis simply\"\n",
                "- \"Give me practice problems\"\n\n",
                "What topic are you studying today?",
            ),
            grade = grade,
            subject = subject,
        ),
    }
}
