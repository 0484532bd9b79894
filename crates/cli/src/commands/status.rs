//! `cbc-tutor status`: show the effective configuration.

use std::path::Path;

use cbc_tutor_config::TutorConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = TutorConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => TutorConfig::config_path(),
    };

    println!("🎓 CBC Tutor Status");
    println!("==================");
    println!("  Config file:  {}", path.display());
    println!("  Provider:     {}", config.provider);
    println!("  Model:        {}", config.model);
    println!("  Max tokens:   {}", config.max_tokens);
    println!("  Timeout:      {}s", config.request_timeout_secs);
    println!("  History:      last {} turns", config.history_window);
    println!("  API key:      {}", if config.has_api_key() { "configured" } else { "not set" });
    println!(
        "  Session:      Grade {} · {} · {}",
        config.session.grade, config.session.subject, config.session.role
    );
    println!(
        "  Typing:       {}",
        if config.typing.enabled {
            format!("{} words / {}ms", config.typing.words_per_chunk, config.typing.interval_ms)
        } else {
            "off".to_string()
        }
    );

    match cbc_tutor_providers::build_from_config(&config) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("\n  ✅ Provider '{}' ready", provider.name()),
            Ok(false) => println!("\n  ⚠️  Provider '{}' is not ready", provider.name()),
            Err(e) => println!("\n  ❌ Provider '{}' failed its check: {e}", provider.name()),
        },
        Err(e) => println!("\n  ❌ {e}"),
    }

    if path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file, using defaults. Run `cbc-tutor onboard` to create one");
    }

    Ok(())
}
