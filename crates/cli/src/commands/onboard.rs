//! `cbc-tutor onboard`: first-time setup.

use std::path::Path;

use cbc_tutor_config::TutorConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => TutorConfig::config_path(),
    };

    println!("🎓 CBC Tutor: First-Time Setup");
    println!("==============================\n");

    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    TutorConfig::write_default(&config_path)?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Pick your default grade, subject, and role under [session]");
    println!("   2. For real answers set provider = \"anthropic\" and add an API key");
    println!("      (or export ANTHROPIC_API_KEY)");
    println!("   3. Run: cbc-tutor chat\n");

    println!("🎉 Setup complete! Run `cbc-tutor chat` to start.\n");
    Ok(())
}
