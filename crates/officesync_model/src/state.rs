//! The top-level store value.

use crate::codec::RowCodec;
use crate::entity::{Avatar, Project, Room, Settings, Task, TeamTemplate, Theme};
use crate::row::Row;
use crate::slice::{Slice, StoreKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the scene camera behaves. UI-only; never synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Orbit around the office.
    #[default]
    Orbit,
    /// Look straight down.
    TopDown,
    /// Follow the selected avatar.
    Follow,
}

/// The complete application state held by the store.
///
/// Collections are shared behind `Arc`, so cloning a state is cheap and a
/// mutation only copies the collection it touches. Every mutable accessor
/// bumps the revision stamp of its store key; comparing stamps between
/// two states tells which keys were replaced.
#[derive(Debug, Clone)]
pub struct OfficeState {
    rooms: Arc<Vec<Room>>,
    avatars: Arc<Vec<Avatar>>,
    projects: Arc<Vec<Project>>,
    team_templates: Arc<Vec<TeamTemplate>>,
    tasks: Arc<Vec<Task>>,
    office_name: String,
    theme: Theme,
    show_grid: bool,
    sound_enabled: bool,
    camera_speed: f64,
    selected_avatar: Option<String>,
    camera_mode: CameraMode,
    revisions: [u64; StoreKey::COUNT],
}

impl OfficeState {
    /// Creates a state with no content and default settings.
    pub fn empty() -> Self {
        let settings = Settings::default();
        Self {
            rooms: Arc::default(),
            avatars: Arc::default(),
            projects: Arc::default(),
            team_templates: Arc::default(),
            tasks: Arc::default(),
            office_name: settings.office_name,
            theme: settings.theme,
            show_grid: settings.show_grid,
            sound_enabled: settings.sound_enabled,
            camera_speed: settings.camera_speed,
            selected_avatar: None,
            camera_mode: CameraMode::default(),
            revisions: [0; StoreKey::COUNT],
        }
    }

    fn touch(&mut self, key: StoreKey) {
        self.revisions[key.index()] += 1;
    }

    /// Returns the revision stamp of a store key.
    pub fn revision(&self, key: StoreKey) -> u64 {
        self.revisions[key.index()]
    }

    /// Keys whose value was replaced between `prev` and `self`.
    pub fn changed_keys<'a>(&'a self, prev: &'a OfficeState) -> impl Iterator<Item = StoreKey> + 'a {
        StoreKey::ALL
            .into_iter()
            .filter(move |key| self.revision(*key) != prev.revision(*key))
    }

    /// Rooms.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Mutable rooms.
    pub fn rooms_mut(&mut self) -> &mut Vec<Room> {
        self.touch(StoreKey::Rooms);
        Arc::make_mut(&mut self.rooms)
    }

    /// Avatars.
    pub fn avatars(&self) -> &[Avatar] {
        &self.avatars
    }

    /// Mutable avatars.
    pub fn avatars_mut(&mut self) -> &mut Vec<Avatar> {
        self.touch(StoreKey::Avatars);
        Arc::make_mut(&mut self.avatars)
    }

    /// Mutable access to one avatar. Only touches the key if it exists.
    pub fn avatar_mut(&mut self, id: &str) -> Option<&mut Avatar> {
        let index = self.avatars.iter().position(|a| a.id == id)?;
        Some(&mut self.avatars_mut()[index])
    }

    /// Projects.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Mutable projects.
    pub fn projects_mut(&mut self) -> &mut Vec<Project> {
        self.touch(StoreKey::Projects);
        Arc::make_mut(&mut self.projects)
    }

    /// Team templates.
    pub fn team_templates(&self) -> &[TeamTemplate] {
        &self.team_templates
    }

    /// Mutable team templates.
    pub fn team_templates_mut(&mut self) -> &mut Vec<TeamTemplate> {
        self.touch(StoreKey::TeamTemplates);
        Arc::make_mut(&mut self.team_templates)
    }

    /// Tasks in board order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Mutable tasks.
    pub fn tasks_mut(&mut self) -> &mut Vec<Task> {
        self.touch(StoreKey::Tasks);
        Arc::make_mut(&mut self.tasks)
    }

    /// Office name.
    pub fn office_name(&self) -> &str {
        &self.office_name
    }

    /// Sets the office name.
    pub fn set_office_name(&mut self, name: impl Into<String>) {
        self.touch(StoreKey::OfficeName);
        self.office_name = name.into();
    }

    /// Theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Sets the theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.touch(StoreKey::Theme);
        self.theme = theme;
    }

    /// Whether the floor grid is drawn.
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Toggles the floor grid.
    pub fn set_show_grid(&mut self, show: bool) {
        self.touch(StoreKey::ShowGrid);
        self.show_grid = show;
    }

    /// Whether ambient sound plays.
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Toggles ambient sound.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.touch(StoreKey::SoundEnabled);
        self.sound_enabled = enabled;
    }

    /// Camera speed multiplier.
    pub fn camera_speed(&self) -> f64 {
        self.camera_speed
    }

    /// Sets the camera speed multiplier.
    pub fn set_camera_speed(&mut self, speed: f64) {
        self.touch(StoreKey::CameraSpeed);
        self.camera_speed = speed;
    }

    /// Currently selected avatar.
    pub fn selected_avatar(&self) -> Option<&str> {
        self.selected_avatar.as_deref()
    }

    /// Selects an avatar.
    pub fn set_selected_avatar(&mut self, id: Option<String>) {
        self.touch(StoreKey::SelectedAvatar);
        self.selected_avatar = id;
    }

    /// Camera mode.
    pub fn camera_mode(&self) -> CameraMode {
        self.camera_mode
    }

    /// Sets the camera mode.
    pub fn set_camera_mode(&mut self, mode: CameraMode) {
        self.touch(StoreKey::CameraMode);
        self.camera_mode = mode;
    }

    /// Collects the settings keys into their persisted bag.
    pub fn settings(&self) -> Settings {
        Settings {
            office_name: self.office_name.clone(),
            theme: self.theme,
            show_grid: self.show_grid,
            sound_enabled: self.sound_enabled,
            camera_speed: self.camera_speed,
        }
    }

    /// Spreads a settings bag over the flat settings keys.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.set_office_name(settings.office_name);
        self.set_theme(settings.theme);
        self.set_show_grid(settings.show_grid);
        self.set_sound_enabled(settings.sound_enabled);
        self.set_camera_speed(settings.camera_speed);
    }

    /// Number of entities in a slice. The settings slice always has one.
    pub fn slice_len(&self, slice: Slice) -> usize {
        match slice {
            Slice::Rooms => self.rooms.len(),
            Slice::Avatars => self.avatars.len(),
            Slice::Projects => self.projects.len(),
            Slice::TeamTemplates => self.team_templates.len(),
            Slice::Tasks => self.tasks.len(),
            Slice::Settings => 1,
        }
    }

    /// Encodes one slice into backend rows.
    pub fn encode_slice(&self, slice: Slice) -> Vec<Row> {
        match slice {
            Slice::Rooms => self.rooms.iter().map(|r| r.to_row(())).collect(),
            Slice::Avatars => self.avatars.iter().map(|a| a.to_row(())).collect(),
            Slice::Projects => self.projects.iter().map(|p| p.to_row(())).collect(),
            Slice::TeamTemplates => self.team_templates.iter().map(|t| t.to_row(())).collect(),
            Slice::Tasks => self
                .tasks
                .iter()
                .enumerate()
                .map(|(index, task)| task.to_row(index))
                .collect(),
            Slice::Settings => vec![self.settings().to_row(())],
        }
    }

    /// Replaces every slice present in `partial`. Absent slices keep
    /// their current value.
    pub fn apply_partial(&mut self, partial: PartialState) {
        let PartialState {
            rooms,
            avatars,
            projects,
            team_templates,
            tasks,
            settings,
        } = partial;

        if let Some(rooms) = rooms {
            *self.rooms_mut() = rooms;
        }
        if let Some(avatars) = avatars {
            *self.avatars_mut() = avatars;
        }
        if let Some(projects) = projects {
            *self.projects_mut() = projects;
        }
        if let Some(team_templates) = team_templates {
            *self.team_templates_mut() = team_templates;
        }
        if let Some(tasks) = tasks {
            *self.tasks_mut() = tasks;
        }
        if let Some(settings) = settings {
            self.apply_settings(settings);
        }
    }
}

/// A state covering only some slices, as produced by the bootstrap loader.
///
/// Callers must not assume every slice is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialState {
    /// Loaded rooms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Vec<Room>>,
    /// Loaded avatars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatars: Option<Vec<Avatar>>,
    /// Loaded projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    /// Loaded team templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_templates: Option<Vec<TeamTemplate>>,
    /// Loaded tasks, in board order.
    #[serde(rename = "mcTasks", skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    /// Loaded settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl PartialState {
    /// Returns true when the slice is present.
    pub fn contains(&self, slice: Slice) -> bool {
        match slice {
            Slice::Rooms => self.rooms.is_some(),
            Slice::Avatars => self.avatars.is_some(),
            Slice::Projects => self.projects.is_some(),
            Slice::TeamTemplates => self.team_templates.is_some(),
            Slice::Tasks => self.tasks.is_some(),
            Slice::Settings => self.settings.is_some(),
        }
    }

    /// Slices present, in declaration order.
    pub fn slices(&self) -> Vec<Slice> {
        Slice::ALL
            .into_iter()
            .filter(|s| self.contains(*s))
            .collect()
    }

    /// Returns true when no slice is present.
    pub fn is_empty(&self) -> bool {
        self.slices().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Vec3;

    #[test]
    fn mutable_access_bumps_only_its_key() {
        let prev = OfficeState::empty();
        let mut next = prev.clone();
        next.rooms_mut().push(Room::new("r1", "Lab"));

        let changed: Vec<_> = next.changed_keys(&prev).collect();
        assert_eq!(changed, vec![StoreKey::Rooms]);
        assert_eq!(prev.rooms().len(), 0);
        assert_eq!(next.rooms().len(), 1);
    }

    #[test]
    fn untouched_collections_are_shared() {
        let mut state = OfficeState::empty();
        state.projects_mut().push(Project::new("p1", "Atlas"));
        let mut next = state.clone();
        next.set_theme(Theme::Light);
        assert!(Arc::ptr_eq(&state.projects, &next.projects));
    }

    #[test]
    fn avatar_mut_ignores_unknown_ids() {
        let mut state = OfficeState::empty();
        state.avatars_mut().push(Avatar::new("a1", "Ada", "Engineer"));
        let before = state.revision(StoreKey::Avatars);

        assert!(state.avatar_mut("nobody").is_none());
        assert_eq!(state.revision(StoreKey::Avatars), before);

        state.avatar_mut("a1").unwrap().position = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(state.revision(StoreKey::Avatars), before + 1);
    }

    #[test]
    fn settings_bag_spans_flat_keys() {
        let prev = OfficeState::empty();
        let mut next = prev.clone();
        let mut settings = next.settings();
        settings.office_name = "HQ".into();
        next.apply_settings(settings);

        assert_eq!(next.office_name(), "HQ");
        assert!(next
            .changed_keys(&prev)
            .all(|k| k.slice() == Some(Slice::Settings)));
    }

    #[test]
    fn tasks_encode_with_board_position() {
        let mut state = OfficeState::empty();
        state
            .tasks_mut()
            .extend([Task::new("a", "first"), Task::new("b", "second")]);
        let rows = state.encode_slice(Slice::Tasks);
        assert_eq!(Task::row_sort_order(&rows[0]), 0);
        assert_eq!(Task::row_sort_order(&rows[1]), 1);
        assert_eq!(state.encode_slice(Slice::Settings).len(), 1);
    }

    #[test]
    fn apply_partial_keeps_absent_slices() {
        let mut state = OfficeState::empty();
        state.rooms_mut().push(Room::new("r1", "Lab"));

        let partial = PartialState {
            projects: Some(vec![Project::new("p1", "Atlas")]),
            ..PartialState::default()
        };
        assert_eq!(partial.slices(), vec![Slice::Projects]);
        state.apply_partial(partial);

        assert_eq!(state.rooms().len(), 1);
        assert_eq!(state.projects().len(), 1);
        assert!(PartialState::default().is_empty());
    }
}
