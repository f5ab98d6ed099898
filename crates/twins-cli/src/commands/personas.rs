use anyhow::Result;
use colored::Colorize;
use twins_application::PersonaCatalog;
use twins_core::persona::PersonaSource;
use twins_core::service::GenerationService;

pub async fn list(service: &dyn GenerationService, builtin_only: bool) -> Result<()> {
    let mut catalog = PersonaCatalog::builtin();
    if !builtin_only && !catalog.refresh(service).await {
        println!("{}", "Service catalog unavailable, showing built-in personas".yellow());
    }

    for persona in catalog.all() {
        let source = match persona.source {
            PersonaSource::BuiltIn => "built-in",
            PersonaSource::Remote => "remote",
        };
        println!(
            "{:<16} {} {}",
            persona.id.bold(),
            persona.display_name.cyan(),
            format!("({})", source).dimmed()
        );
        if let Some(description) = &persona.description {
            println!("{:<16} {}", "", description);
        }
    }

    Ok(())
}
