//! Curriculum domain: grades, tiers, subjects, roles, and the topic table.
//!
//! Everything here is a pure function of static data. The Kenyan CBC groups
//! grades 1-9 into three tiers, each with its own subject list, and a small
//! knowledge table maps subjects to the topics taught at each stage.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::CurriculumError;

/// A grade level between 1 and 9 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GradeLevel(u8);

impl GradeLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 9;

    /// Validate a grade number.
    pub fn new(number: u8) -> Result<Self, CurriculumError> {
        if (Self::MIN..=Self::MAX).contains(&number) {
            Ok(Self(number))
        } else {
            Err(CurriculumError::InvalidGrade(number.to_string()))
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// The curriculum tier this grade belongs to.
    pub fn tier(&self) -> CurriculumTier {
        match self.0 {
            1..=3 => CurriculumTier::LowerPrimary,
            4..=6 => CurriculumTier::UpperPrimary,
            _ => CurriculumTier::JuniorSecondary,
        }
    }

    /// Display label, e.g. `"Grade 4"`.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Every valid grade in ascending order.
    pub fn all() -> impl Iterator<Item = GradeLevel> {
        (Self::MIN..=Self::MAX).map(GradeLevel)
    }
}

impl std::fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grade {}", self.0)
    }
}

impl TryFrom<u8> for GradeLevel {
    type Error = CurriculumError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GradeLevel> for u8 {
    fn from(grade: GradeLevel) -> Self {
        grade.0
    }
}

/// Accepts `"Grade 4"`, `"grade 4"`, or a bare `"4"`.
impl FromStr for GradeLevel {
    type Err = CurriculumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = match trimmed.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("grade") => trimmed[5..].trim_start(),
            _ => trimmed,
        };
        digits
            .parse::<u8>()
            .ok()
            .and_then(|n| Self::new(n).ok())
            .ok_or_else(|| CurriculumError::InvalidGrade(trimmed.to_string()))
    }
}

/// Map a raw grade number to its tier.
pub fn resolve_tier(grade: u8) -> Result<CurriculumTier, CurriculumError> {
    GradeLevel::new(grade).map(|g| g.tier())
}

/// One of the three CBC curriculum bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurriculumTier {
    LowerPrimary,
    UpperPrimary,
    JuniorSecondary,
}

const LOWER_PRIMARY_SUBJECTS: &[&str] = &[
    "Mathematics",
    "English",
    "Kiswahili",
    "Environmental Activities",
    "Hygiene and Nutrition",
    "Religious Education",
    "Movement and Creative Activities",
];

const UPPER_PRIMARY_SUBJECTS: &[&str] = &[
    "Mathematics",
    "English",
    "Kiswahili",
    "Science and Technology",
    "Social Studies",
    "Religious Education",
    "Creative Arts",
    "Physical Education",
];

const JUNIOR_SECONDARY_SUBJECTS: &[&str] = &[
    "Mathematics",
    "English",
    "Kiswahili",
    "Integrated Science",
    "Social Studies",
    "Religious Education",
    "Creative Arts and Sports",
    "Pre-Technical Studies",
    "Business Studies",
    "Agriculture",
];

impl CurriculumTier {
    pub const ALL: [CurriculumTier; 3] = [
        CurriculumTier::LowerPrimary,
        CurriculumTier::UpperPrimary,
        CurriculumTier::JuniorSecondary,
    ];

    /// Human-readable name including the grade span.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LowerPrimary => "Lower Primary (Grade 1-3)",
            Self::UpperPrimary => "Upper Primary (Grade 4-6)",
            Self::JuniorSecondary => "Junior Secondary (Grade 7-9)",
        }
    }

    pub fn grades(&self) -> RangeInclusive<u8> {
        match self {
            Self::LowerPrimary => 1..=3,
            Self::UpperPrimary => 4..=6,
            Self::JuniorSecondary => 7..=9,
        }
    }

    /// Subjects offered in this tier, in display order.
    pub fn subjects(&self) -> &'static [&'static str] {
        match self {
            Self::LowerPrimary => LOWER_PRIMARY_SUBJECTS,
            Self::UpperPrimary => UPPER_PRIMARY_SUBJECTS,
            Self::JuniorSecondary => JUNIOR_SECONDARY_SUBJECTS,
        }
    }

    /// The subject a fresh selection in this tier starts on.
    pub fn default_subject(&self) -> &'static str {
        self.subjects()[0]
    }
}

impl std::fmt::Display for CurriculumTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact membership test.
pub fn subject_in_tier(subject: &str, tier: CurriculumTier) -> bool {
    tier.subjects().contains(&subject)
}

/// Case-insensitive lookup returning the canonical spelling.
pub fn canonical_subject(subject: &str, tier: CurriculumTier) -> Option<&'static str> {
    let wanted = subject.trim();
    tier.subjects()
        .iter()
        .copied()
        .find(|s| s.eq_ignore_ascii_case(wanted))
}

/// Who the tutor is talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearnerRole {
    Teacher,
    Student,
}

impl LearnerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    /// Capitalised form for display headers.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Teacher => "Teacher",
            Self::Student => "Student",
        }
    }
}

impl std::fmt::Display for LearnerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearnerRole {
    type Err = CurriculumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            _ => Err(CurriculumError::InvalidRole(s.trim().to_string())),
        }
    }
}

// --- Topic knowledge table ---

#[derive(Debug, Clone, Copy)]
enum GradeSpan {
    Range(u8, u8),
    AllGrades,
}

struct TopicEntry {
    subject: &'static str,
    span: GradeSpan,
    topics: &'static [&'static str],
}

static SUBJECT_KNOWLEDGE: &[TopicEntry] = &[
    TopicEntry {
        subject: "Mathematics",
        span: GradeSpan::Range(1, 3),
        topics: &[
            "Numbers 0-1000",
            "Addition",
            "Subtraction",
            "Shapes",
            "Measurement",
            "Money (KES)",
            "Time",
            "Data handling",
        ],
    },
    TopicEntry {
        subject: "Mathematics",
        span: GradeSpan::Range(4, 6),
        topics: &[
            "Fractions",
            "Decimals",
            "Multiplication",
            "Division",
            "Geometry",
            "Perimeter",
            "Area",
            "Graphs",
            "Algebra basics",
            "Ratio",
        ],
    },
    TopicEntry {
        subject: "Mathematics",
        span: GradeSpan::Range(7, 9),
        topics: &[
            "Algebra",
            "Linear equations",
            "Quadratic equations",
            "Geometry",
            "Trigonometry",
            "Statistics",
            "Probability",
            "Financial math",
        ],
    },
    TopicEntry {
        subject: "Science and Technology",
        span: GradeSpan::Range(4, 6),
        topics: &[
            "Living things",
            "Plants",
            "Animals",
            "Human body",
            "Health",
            "Matter",
            "Forces",
            "Energy",
            "Technology",
            "Environment",
        ],
    },
    TopicEntry {
        subject: "Science and Technology",
        span: GradeSpan::Range(7, 9),
        topics: &[
            "Biology",
            "Chemistry",
            "Physics",
            "Scientific method",
            "Cells",
            "Chemical reactions",
            "Motion",
            "Electricity",
            "Magnetism",
        ],
    },
    TopicEntry {
        subject: "English",
        span: GradeSpan::AllGrades,
        topics: &[
            "Reading comprehension",
            "Writing skills",
            "Grammar",
            "Vocabulary",
            "Speaking",
            "Listening",
            "Literature",
            "Composition",
        ],
    },
    TopicEntry {
        subject: "Kiswahili",
        span: GradeSpan::AllGrades,
        topics: &["Kusoma", "Kuandika", "Sarufi", "Mazungumzo", "Fasihi", "Insha"],
    },
    TopicEntry {
        subject: "Social Studies",
        span: GradeSpan::Range(4, 9),
        topics: &[
            "Kenyan history",
            "Geography of Kenya",
            "Government",
            "Counties",
            "Culture",
            "Trade",
            "Transportation",
            "Maps",
            "Resources",
        ],
    },
];

/// Result of a topic lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topics {
    /// Topics specific to the grade's stage.
    ForTier(&'static [&'static str]),
    /// Topics shared by every grade.
    AllGrades(&'static [&'static str]),
    /// The subject has no entry in the knowledge table.
    None,
}

impl Topics {
    pub fn as_slice(&self) -> &'static [&'static str] {
        match self {
            Self::ForTier(t) | Self::AllGrades(t) => t,
            Self::None => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// Look up the topics taught for `subject` at `grade`.
///
/// A grade-ranged entry covering the grade wins over an all-grades entry.
/// Subject names match exactly.
pub fn topics_for(subject: &str, grade: GradeLevel) -> Topics {
    let entries = || SUBJECT_KNOWLEDGE.iter().filter(|e| e.subject == subject);

    let ranged = entries().find(|e| match e.span {
        GradeSpan::Range(lo, hi) => (lo..=hi).contains(&grade.number()),
        GradeSpan::AllGrades => false,
    });
    if let Some(entry) = ranged {
        return Topics::ForTier(entry.topics);
    }

    match entries().find(|e| matches!(e.span, GradeSpan::AllGrades)) {
        Some(entry) => Topics::AllGrades(entry.topics),
        None => Topics::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(n: u8) -> GradeLevel {
        GradeLevel::new(n).unwrap()
    }

    #[test]
    fn tier_mapping_is_total_and_monotonic() {
        let mut last = 0usize;
        for g in GradeLevel::all() {
            let tier = g.tier();
            let idx = CurriculumTier::ALL.iter().position(|t| *t == tier).unwrap();
            assert!(idx >= last, "tier went backwards at {g}");
            last = idx;
        }
        assert_eq!(resolve_tier(3).unwrap(), CurriculumTier::LowerPrimary);
        assert_eq!(resolve_tier(4).unwrap(), CurriculumTier::UpperPrimary);
        assert_eq!(resolve_tier(6).unwrap(), CurriculumTier::UpperPrimary);
        assert_eq!(resolve_tier(7).unwrap(), CurriculumTier::JuniorSecondary);
        assert_eq!(resolve_tier(9).unwrap(), CurriculumTier::JuniorSecondary);
    }

    #[test]
    fn out_of_range_grades_rejected() {
        assert_eq!(
            resolve_tier(0),
            Err(CurriculumError::InvalidGrade("0".into()))
        );
        assert!(resolve_tier(10).is_err());
        assert!(GradeLevel::new(255).is_err());
    }

    #[test]
    fn grade_parses_from_labels() {
        assert_eq!("Grade 4".parse::<GradeLevel>().unwrap(), grade(4));
        assert_eq!("grade 9".parse::<GradeLevel>().unwrap(), grade(9));
        assert_eq!(" 2 ".parse::<GradeLevel>().unwrap(), grade(2));
        assert!("Grade 10".parse::<GradeLevel>().is_err());
        assert!("Form 1".parse::<GradeLevel>().is_err());
        assert!("".parse::<GradeLevel>().is_err());
    }

    #[test]
    fn grade_label_roundtrips() {
        for g in GradeLevel::all() {
            assert_eq!(g.label().parse::<GradeLevel>().unwrap(), g);
        }
    }

    #[test]
    fn grade_deserialization_validates() {
        let ok: GradeLevel = serde_json::from_str("5").unwrap();
        assert_eq!(ok.number(), 5);
        assert!(serde_json::from_str::<GradeLevel>("12").is_err());
    }

    #[test]
    fn role_parsing() {
        assert_eq!("teacher".parse::<LearnerRole>().unwrap(), LearnerRole::Teacher);
        assert_eq!("Student".parse::<LearnerRole>().unwrap(), LearnerRole::Student);
        assert_eq!(
            "parent".parse::<LearnerRole>(),
            Err(CurriculumError::InvalidRole("parent".into()))
        );
    }

    #[test]
    fn tier_subject_lists() {
        assert_eq!(CurriculumTier::LowerPrimary.subjects().len(), 7);
        assert_eq!(CurriculumTier::UpperPrimary.subjects().len(), 8);
        assert_eq!(CurriculumTier::JuniorSecondary.subjects().len(), 10);
        for tier in CurriculumTier::ALL {
            assert_eq!(tier.default_subject(), "Mathematics");
        }
        assert!(subject_in_tier("Agriculture", CurriculumTier::JuniorSecondary));
        assert!(!subject_in_tier("Agriculture", CurriculumTier::LowerPrimary));
    }

    #[test]
    fn canonical_subject_is_case_insensitive() {
        assert_eq!(
            canonical_subject("science and technology", CurriculumTier::UpperPrimary),
            Some("Science and Technology")
        );
        assert_eq!(canonical_subject("Chemistry", CurriculumTier::UpperPrimary), None);
    }

    #[test]
    fn tier_specific_topics() {
        let topics = topics_for("Mathematics", grade(4));
        assert!(matches!(topics, Topics::ForTier(_)));
        assert_eq!(&topics.as_slice()[..4], &["Fractions", "Decimals", "Multiplication", "Division"]);

        let junior = topics_for("Mathematics", grade(8));
        assert!(junior.as_slice().contains(&"Trigonometry"));
    }

    #[test]
    fn all_grades_topics() {
        let topics = topics_for("Kiswahili", grade(1));
        assert_eq!(topics, Topics::AllGrades(&["Kusoma", "Kuandika", "Sarufi", "Mazungumzo", "Fasihi", "Insha"]));
    }

    #[test]
    fn social_studies_range_spans_two_tiers() {
        assert!(matches!(topics_for("Social Studies", grade(5)), Topics::ForTier(_)));
        assert!(matches!(topics_for("Social Studies", grade(9)), Topics::ForTier(_)));
    }

    #[test]
    fn unknown_subject_has_no_topics() {
        let topics = topics_for("Agriculture", grade(8));
        assert_eq!(topics, Topics::None);
        assert!(topics.is_empty());
        // ranged entry exists but not for this grade, and no all-grades fallback
        assert_eq!(topics_for("Science and Technology", grade(2)), Topics::None);
    }
}
