use anyhow::Context;
use clap::{Parser, Subcommand};
use medsim_core::codec::{DocumentFormat, EventDocument, TemplateDocument};
use medsim_core::config::{
    invite_expiration_days_from_env_value, page_size_from_env_value, resolve_reference_data,
};
use medsim_core::constants::{
    INVITE_EXPIRATION_DAYS_ENV, PAGE_SIZE_ENV, REFERENCE_DATA_ENV,
};
use medsim_core::{
    list_events, validate, AccountContext, AccountRole, ActionType, CoreConfig, Event,
    EventCategory, EventEditor, EventFilter, InMemoryStore,
};
use medsim_types::{NonEmptyText, PatientType};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medsim")]
#[command(about = "Scenario authoring tools for medical training simulations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check an event document for missing required fields
    Validate {
        /// Event file (.yaml, .yml or .json)
        event_file: PathBuf,
    },
    /// List the actions of an event document
    Actions {
        /// Event file (.yaml, .yml or .json)
        event_file: PathBuf,
    },
    /// Show the normal ranges of a lab item
    Ranges {
        /// Lab item name, e.g. "Hb"
        lab_name: String,
        /// Only show the range used for this patient type
        #[arg(long)]
        patient_type: Option<String>,
    },
    /// List the symptom categories for a patient type
    Categories {
        /// Patient type, e.g. "Adult_Male" or "newborn"
        patient_type: String,
    },
    /// Add every lab item of a specimen to a symptom template
    AddSpecimen {
        /// Symptom template file (.yaml, .yml or .json)
        template_file: PathBuf,
        /// Specimen name, e.g. "EDTA -CBC"
        specimen: String,
        /// Write the result back to the template file instead of printing it
        #[arg(long)]
        write: bool,
    },
    /// List the event documents in a directory, newest first
    List {
        /// Directory holding event files (.yaml, .yml or .json)
        dir: PathBuf,
        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Case-insensitive text to look for in key, name and description
        #[arg(long)]
        search: Option<String>,
        /// Only show events of this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Print a new event document
    NewEvent {
        /// Event category, e.g. "npc_event"
        category: String,
        /// Action types to append, in order
        #[arg(long = "action")]
        actions: Vec<String>,
    },
}

/// Resolve configuration from the process environment.
///
/// This is the only place environment variables are read.
fn config_from_env() -> anyhow::Result<CoreConfig> {
    let overlay = std::env::var(REFERENCE_DATA_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let reference = resolve_reference_data(overlay)?;
    let days = invite_expiration_days_from_env_value(std::env::var(INVITE_EXPIRATION_DAYS_ENV).ok())?;
    let page_size = page_size_from_env_value(std::env::var(PAGE_SIZE_ENV).ok())?;
    Ok(CoreConfig::new(reference, days, page_size)?)
}

/// The CLI acts as a local instructor account.
fn cli_account() -> anyhow::Result<AccountContext> {
    Ok(AccountContext::new(
        NonEmptyText::new("cli")?,
        AccountRole::Instructor,
    ))
}

/// Reads every event document directly inside `dir`. Files with other extensions are skipped.
fn read_event_dir(dir: &Path) -> anyhow::Result<Vec<Event>> {
    let mut events = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || DocumentFormat::from_path(&path).is_err() {
            continue;
        }
        events.push(EventDocument::read(&path)?);
    }
    tracing::debug!(dir = %dir.display(), events = events.len(), "read event directory");
    Ok(events)
}

fn run(command: Commands, config: &CoreConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Validate { event_file } => {
            let event = EventDocument::read(&event_file)?;
            let report = validate(&event);
            if report.is_valid {
                writeln!(out, "{}: valid", event_file.display())?;
            } else {
                writeln!(out, "{}: invalid", event_file.display())?;
                for error in report.errors() {
                    writeln!(out, "  - {error}")?;
                }
                anyhow::bail!("{} validation error(s)", report.issues.len());
            }
        }
        Commands::Actions { event_file } => {
            let event = EventDocument::read(&event_file)?;
            if event.actions.is_empty() {
                writeln!(out, "No actions.")?;
            }
            for (index, action) in event.actions.iter().enumerate() {
                writeln!(
                    out,
                    "{:>3}. [{}] {} (repeat: {:?})",
                    index + 1,
                    action.action_type(),
                    action.params.summary(),
                    action.repeat_settings.kind
                )?;
            }
        }
        Commands::Ranges {
            lab_name,
            patient_type,
        } => {
            let item = config
                .reference()
                .lab_item(&lab_name)
                .with_context(|| format!("unknown lab item {lab_name:?}"))?;
            let patient_types = match patient_type {
                Some(pt) => vec![PatientType::parse(&pt)?],
                None => PatientType::ALL.to_vec(),
            };
            writeln!(out, "{} ({}) [{}]", item.name, item.specimen, item.unit)?;
            for pt in patient_types {
                let range = item.normal_range(pt).unwrap_or("-");
                writeln!(out, "  {:<15} {range}", pt.as_str())?;
            }
        }
        Commands::Categories { patient_type } => {
            let pt = PatientType::parse(&patient_type)?;
            let categories = config.reference().symptom_categories(pt);
            if categories.is_empty() {
                writeln!(out, "No categories for {pt}.")?;
            }
            for category in categories {
                writeln!(out, "{category}")?;
            }
        }
        Commands::AddSpecimen {
            template_file,
            specimen,
            write,
        } => {
            if config
                .reference()
                .lab_items_for_specimen(&specimen)
                .next()
                .is_none()
            {
                anyhow::bail!("unknown specimen {specimen:?}");
            }
            let mut template = TemplateDocument::read(&template_file)?;
            let added = template
                .data
                .add_specimen_panel(&specimen, config.reference());
            tracing::info!(
                specimen = %specimen,
                added,
                template = %template_file.display(),
                "added specimen panel"
            );
            if write {
                TemplateDocument::write(&template_file, &template)?;
                writeln!(out, "Added {added} lab result(s) to {}", template_file.display())?;
            } else {
                let format = DocumentFormat::from_path(&template_file)?;
                write!(out, "{}", TemplateDocument::render(&template, format)?)?;
            }
        }
        Commands::List {
            dir,
            page,
            search,
            category,
        } => {
            let filter = EventFilter {
                search,
                category: category.as_deref().map(EventCategory::parse).transpose()?,
                ..Default::default()
            };
            let store = InMemoryStore::with_records(read_event_dir(&dir)?);
            let listing = list_events(&store, &filter, page, config)?;
            writeln!(
                out,
                "Page {}/{} ({} events)",
                listing.page,
                listing.page_count.max(1),
                listing.total
            )?;
            for event in &listing.items {
                writeln!(
                    out,
                    "  {:<24} {} [{}]",
                    event.key,
                    event.display_name,
                    event.category.as_str()
                )?;
            }
        }
        Commands::NewEvent { category, actions } => {
            let category = EventCategory::parse(&category)?;
            let mut editor = EventEditor::create(&cli_account()?, category)?;
            for action in &actions {
                editor.add_action(ActionType::parse(action)?);
            }
            write!(
                out,
                "{}",
                EventDocument::render(editor.draft(), DocumentFormat::Yaml)?
            )?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("medsim=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'medsim --help' for commands");
        return Ok(());
    };

    let config = config_from_env()?;
    let stdout = std::io::stdout();
    run(command, &config, &mut stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medsim_core::SymptomTemplate;

    fn run_to_string(command: Commands) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(command, &CoreConfig::default(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn new_event_prints_actions_in_order() {
        let yaml = run_to_string(Commands::NewEvent {
            category: "npc_event".into(),
            actions: vec!["play_voice".into(), "quiz".into()],
        })
        .unwrap();
        let event = EventDocument::parse(&yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(event.category, EventCategory::NpcEvent);
        let types: Vec<ActionType> = event.actions.iter().map(|a| a.action_type()).collect();
        assert_eq!(types, [ActionType::PlayVoice, ActionType::Quiz]);
    }

    #[test]
    fn new_event_rejects_unknown_action() {
        let err = run_to_string(Commands::NewEvent {
            category: "npc_event".into(),
            actions: vec!["teleport".into()],
        })
        .unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn validate_lists_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.json");
        std::fs::write(&path, r#"{"trigger":"npc_spawn"}"#).unwrap();

        let mut out = Vec::new();
        let err = run(
            Commands::Validate {
                event_file: path.clone(),
            },
            &CoreConfig::default(),
            &mut out,
        )
        .unwrap_err();
        let text = String::from_utf8(out).unwrap();
        assert!(err.to_string().contains("3 validation error(s)"));
        assert!(text.contains("Event key is required"));
        assert!(text.contains("Description is required"));
        assert!(!text.contains("Trigger is required"));
    }

    #[test]
    fn ranges_fall_back_to_adult_male() {
        let text = run_to_string(Commands::Ranges {
            lab_name: "MCHC".into(),
            patient_type: Some("newborn".into()),
        })
        .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].trim_start().starts_with("Newborn"));
        assert!(!lines[1].trim_end().ends_with('-'));
    }

    #[test]
    fn categories_for_newborn_include_jaundice() {
        let text = run_to_string(Commands::Categories {
            patient_type: "Newborn".into(),
        })
        .unwrap();
        assert!(text.lines().any(|l| l == "Jaundice"));
    }

    #[test]
    fn add_specimen_writes_template_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anemia.yaml");
        let mut template = SymptomTemplate::new(PatientType::AdultMale);
        template.key = "anemia".into();
        TemplateDocument::write(&path, &template).unwrap();

        let text = run_to_string(Commands::AddSpecimen {
            template_file: path.clone(),
            specimen: "EDTA -CBC".into(),
            write: true,
        })
        .unwrap();
        assert!(text.contains("Added 7 lab result(s)"));

        let saved = TemplateDocument::read(&path).unwrap();
        assert_eq!(saved.data.lab_results.len(), 7);
        assert_eq!(saved.key, "anemia");
    }

    #[test]
    fn add_specimen_rejects_unknown_specimen_without_touching_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.yaml");
        TemplateDocument::write(&path, &SymptomTemplate::new(PatientType::AdultMale)).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = run_to_string(Commands::AddSpecimen {
            template_file: path.clone(),
            specimen: "Spinal fluid".into(),
            write: true,
        })
        .unwrap_err();
        assert!(err.to_string().contains("Spinal fluid"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    fn write_event(dir: &Path, file: &str, key: &str, category: EventCategory) {
        let mut event = Event::new(category);
        event.key = key.into();
        event.display_name = key.to_uppercase();
        EventDocument::write(&dir.join(file), &event).unwrap();
    }

    #[test]
    fn list_pages_with_the_configured_page_size() {
        let dir = tempfile::tempdir().unwrap();
        write_event(dir.path(), "a.yaml", "alpha", EventCategory::NpcEvent);
        write_event(dir.path(), "b.json", "bravo", EventCategory::NpcEvent);
        write_event(dir.path(), "c.yml", "charlie", EventCategory::PlayerEvent);
        std::fs::write(dir.path().join("notes.txt"), "not an event").unwrap();

        let config = CoreConfig::new(medsim_core::ReferenceData::builtin(), 7, 2).unwrap();
        let mut out = Vec::new();
        run(
            Commands::List {
                dir: dir.path().to_path_buf(),
                page: 1,
                search: None,
                category: None,
            },
            &config,
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Page 1/2 (3 events)"), "{text}");
        assert_eq!(text.lines().count(), 3);

        let filtered = run_to_string(Commands::List {
            dir: dir.path().to_path_buf(),
            page: 1,
            search: None,
            category: Some("player_event".into()),
        })
        .unwrap();
        assert!(filtered.contains("charlie"));
        assert!(!filtered.contains("alpha"));
    }
}
