//! Slices, debounce tiers and store keys.

use std::fmt;

/// Debounce tier a slice belongs to.
///
/// Membership is static per slice. Slices whose values change on every
/// pointer-move frame during a drag live in the position tier with a
/// long settle window; everything else uses the short normal window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// High-frequency positional updates.
    Position,
    /// Everything else.
    Normal,
}

impl Tier {
    /// All tiers.
    pub const ALL: [Tier; 2] = [Tier::Position, Tier::Normal];

    /// Returns the tier name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Position => "position",
            Tier::Normal => "normal",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named top-level partition of state mapped to one backend table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slice {
    /// Office rooms.
    Rooms,
    /// Team member avatars.
    Avatars,
    /// Projects.
    Projects,
    /// Team templates.
    TeamTemplates,
    /// Mission-control kanban tasks.
    Tasks,
    /// Flattened settings, stored as a singleton row.
    Settings,
}

impl Slice {
    /// Every slice, in declaration order.
    pub const ALL: [Slice; 6] = [
        Slice::Rooms,
        Slice::Avatars,
        Slice::Projects,
        Slice::TeamTemplates,
        Slice::Tasks,
        Slice::Settings,
    ];

    /// Slices backed by a multi-row table.
    pub const CONTENT: [Slice; 5] = [
        Slice::Rooms,
        Slice::Avatars,
        Slice::Projects,
        Slice::TeamTemplates,
        Slice::Tasks,
    ];

    /// Seed order. Each wave only references tables written by earlier
    /// waves, so a wave is awaited before the next one starts.
    pub const SEED_WAVES: [&'static [Slice]; 3] = [
        &[Slice::Projects, Slice::TeamTemplates, Slice::Settings],
        &[Slice::Rooms, Slice::Tasks],
        &[Slice::Avatars],
    ];

    /// Returns the backend table name.
    pub fn table(&self) -> &'static str {
        match self {
            Slice::Rooms => "rooms",
            Slice::Avatars => "avatars",
            Slice::Projects => "projects",
            Slice::TeamTemplates => "team_templates",
            Slice::Tasks => "mc_tasks",
            Slice::Settings => "settings",
        }
    }

    /// Returns the debounce tier.
    pub fn tier(&self) -> Tier {
        match self {
            Slice::Rooms | Slice::Avatars => Tier::Position,
            Slice::Projects | Slice::TeamTemplates | Slice::Tasks | Slice::Settings => {
                Tier::Normal
            }
        }
    }

    /// Returns true for the singleton settings slice.
    pub fn is_singleton(&self) -> bool {
        matches!(self, Slice::Settings)
    }

    /// Slices whose rows this slice references by foreign key.
    pub fn references(&self) -> &'static [Slice] {
        match self {
            Slice::Rooms => &[Slice::Projects],
            Slice::Avatars => &[Slice::Rooms],
            Slice::Tasks => &[Slice::Projects],
            Slice::Projects | Slice::TeamTemplates | Slice::Settings => &[],
        }
    }

    /// Looks a slice up by table name.
    pub fn from_table(table: &str) -> Option<Slice> {
        Slice::ALL.into_iter().find(|s| s.table() == table)
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A top-level key of the store.
///
/// Settings are flattened on the store into several keys that share one
/// slice. UI-only keys have no slice and never leave the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    /// `rooms`
    Rooms,
    /// `avatars`
    Avatars,
    /// `projects`
    Projects,
    /// `teamTemplates`
    TeamTemplates,
    /// `mcTasks`
    Tasks,
    /// `officeName`
    OfficeName,
    /// `theme`
    Theme,
    /// `showGrid`
    ShowGrid,
    /// `soundEnabled`
    SoundEnabled,
    /// `cameraSpeed`
    CameraSpeed,
    /// `selectedAvatarId` (UI only)
    SelectedAvatar,
    /// `cameraMode` (UI only)
    CameraMode,
}

impl StoreKey {
    /// Number of store keys.
    pub const COUNT: usize = 12;

    /// Every store key.
    pub const ALL: [StoreKey; StoreKey::COUNT] = [
        StoreKey::Rooms,
        StoreKey::Avatars,
        StoreKey::Projects,
        StoreKey::TeamTemplates,
        StoreKey::Tasks,
        StoreKey::OfficeName,
        StoreKey::Theme,
        StoreKey::ShowGrid,
        StoreKey::SoundEnabled,
        StoreKey::CameraSpeed,
        StoreKey::SelectedAvatar,
        StoreKey::CameraMode,
    ];

    /// Dense index used for revision stamps.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The slice this key is synchronized through, if any.
    ///
    /// This is the allow-list: keys returning `None` are never written.
    pub fn slice(&self) -> Option<Slice> {
        match self {
            StoreKey::Rooms => Some(Slice::Rooms),
            StoreKey::Avatars => Some(Slice::Avatars),
            StoreKey::Projects => Some(Slice::Projects),
            StoreKey::TeamTemplates => Some(Slice::TeamTemplates),
            StoreKey::Tasks => Some(Slice::Tasks),
            StoreKey::OfficeName
            | StoreKey::Theme
            | StoreKey::ShowGrid
            | StoreKey::SoundEnabled
            | StoreKey::CameraSpeed => Some(Slice::Settings),
            StoreKey::SelectedAvatar | StoreKey::CameraMode => None,
        }
    }

    /// Returns the store-side (camelCase) key name.
    pub fn name(&self) -> &'static str {
        match self {
            StoreKey::Rooms => "rooms",
            StoreKey::Avatars => "avatars",
            StoreKey::Projects => "projects",
            StoreKey::TeamTemplates => "teamTemplates",
            StoreKey::Tasks => "mcTasks",
            StoreKey::OfficeName => "officeName",
            StoreKey::Theme => "theme",
            StoreKey::ShowGrid => "showGrid",
            StoreKey::SoundEnabled => "soundEnabled",
            StoreKey::CameraSpeed => "cameraSpeed",
            StoreKey::SelectedAvatar => "selectedAvatarId",
            StoreKey::CameraMode => "cameraMode",
        }
    }
}
