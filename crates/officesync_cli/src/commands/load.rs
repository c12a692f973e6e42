//! Load command implementation.

use super::{CommandResult, Format};
use officesync_engine::{load, Backend, SyncConfig};
use officesync_model::Slice;

/// Runs the load command: prints what bootstrap would hydrate.
pub async fn run<B: Backend + ?Sized>(
    backend: &B,
    config: &SyncConfig,
    format: Format,
) -> CommandResult<String> {
    let Some(partial) = load(config, backend).await else {
        return Ok(match format {
            Format::Json => "null".to_string(),
            Format::Text => "nothing to load".to_string(),
        });
    };

    Ok(match format {
        Format::Json => serde_json::to_string_pretty(&partial)?,
        Format::Text => {
            let mut lines = Vec::new();
            for slice in partial.slices() {
                let count = match slice {
                    Slice::Rooms => partial.rooms.as_ref().map_or(0, Vec::len),
                    Slice::Avatars => partial.avatars.as_ref().map_or(0, Vec::len),
                    Slice::Projects => partial.projects.as_ref().map_or(0, Vec::len),
                    Slice::TeamTemplates => partial.team_templates.as_ref().map_or(0, Vec::len),
                    Slice::Tasks => partial.tasks.as_ref().map_or(0, Vec::len),
                    Slice::Settings => 1,
                };
                lines.push(format!("{:<16} {count}", slice.table()));
            }
            if let Some(settings) = &partial.settings {
                lines.push(format!("office name      {}", settings.office_name));
            }
            lines.join("\n")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_backend::FileBackend;
    use officesync_engine::seed;
    use officesync_model::OfficeState;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn empty_file_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path().join("office.json")).unwrap();
        let out = run(&backend, &SyncConfig::new(), Format::Json).await.unwrap();
        assert_eq!(out, "null");
    }

    #[tokio::test]
    async fn lists_loaded_slices() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path().join("office.json")).unwrap();
        let config = SyncConfig::new();
        seed(&config, &backend, &OfficeState::default()).await;
        backend
            .upsert(
                "settings",
                vec![json!({"id": "default", "office_name": "Annex"})
                    .as_object()
                    .cloned()
                    .unwrap()],
            )
            .await
            .unwrap();

        let out = run(&backend, &config, Format::Text).await.unwrap();
        assert!(out.contains("avatars"), "{out}");
        assert!(out.contains("office name      Annex"), "{out}");
    }
}
