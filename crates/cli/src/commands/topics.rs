//! `cbc-tutor topics`: browse the curriculum knowledge table.

use cbc_tutor_core::curriculum::{self, CurriculumTier, GradeLevel, Topics};

pub fn run(grade: Option<GradeLevel>) -> Result<(), Box<dyn std::error::Error>> {
    let tiers: Vec<CurriculumTier> = match grade {
        Some(grade) => vec![grade.tier()],
        None => CurriculumTier::ALL.to_vec(),
    };

    println!("🎓 Kenyan CBC Subjects & Topics");
    println!("==============================");

    for tier in tiers {
        // Ranged topic entries are keyed by grade, so look up the tier's
        // first grade unless a specific one was asked for.
        let sample = match grade {
            Some(grade) => grade,
            None => GradeLevel::new(*tier.grades().start())?,
        };

        println!("\n📚 {tier}");
        for subject in tier.subjects() {
            match curriculum::topics_for(subject, sample) {
                Topics::None => println!("  • {subject}"),
                topics => println!("  • {subject}: {}", topics.as_slice().join(", ")),
            }
        }
    }
    println!();

    Ok(())
}
