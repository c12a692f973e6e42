//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random entities that a store could
//! actually hold: non-empty ids, finite coordinates, ephemeral fields at
//! their decoded default.

use officesync_model::{
    Avatar, AvatarStatus, Project, ProjectStatus, Room, RoomSize, Settings, Task, TaskPriority,
    TaskStatus, TeamTemplate, TemplateRole, Theme, Vec3,
};
use proptest::prelude::*;

/// Strategy for generating entity ids.
pub fn id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9][a-z0-9-]{0,15}").expect("Invalid regex")
}

/// Strategy for generating free text, including the empty string.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,24}").expect("Invalid regex")
}

/// Strategy for generating `#rrggbb` colors.
pub fn color_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("#[0-9a-f]{6}").expect("Invalid regex")
}

/// Strategy for generating short string lists.
pub fn tags_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::string::string_regex("[a-z]{1,10}").expect("Invalid regex"),
        0..4,
    )
}

/// Strategy for generating finite scene coordinates.
pub fn vec3_strategy() -> impl Strategy<Value = Vec3> {
    (-500.0f64..500.0, 0.0f64..10.0, -500.0f64..500.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Strategy for generating rooms.
pub fn room_strategy() -> impl Strategy<Value = Room> {
    (
        id_strategy(),
        text_strategy(),
        proptest::option::of(id_strategy()),
        vec3_strategy(),
        (1.0f64..40.0, 1.0f64..40.0),
        color_strategy(),
        tags_strategy(),
    )
        .prop_map(|(id, name, project_id, position, (width, depth), color, features)| Room {
            id,
            name,
            project_id,
            position,
            size: RoomSize { width, depth },
            color,
            features,
        })
}

/// Strategy for generating avatars as they decode: status is always idle.
pub fn avatar_strategy() -> impl Strategy<Value = Avatar> {
    (
        id_strategy(),
        text_strategy(),
        text_strategy(),
        color_strategy(),
        proptest::option::of(id_strategy()),
        vec3_strategy(),
        tags_strategy(),
    )
        .prop_map(|(id, name, role, color, room_id, position, skills)| Avatar {
            id,
            name,
            role,
            color,
            room_id,
            position,
            skills,
            status: AvatarStatus::Idle,
        })
}

/// Strategy for generating avatar statuses.
pub fn avatar_status_strategy() -> impl Strategy<Value = AvatarStatus> {
    prop_oneof![
        Just(AvatarStatus::Idle),
        Just(AvatarStatus::Working),
        Just(AvatarStatus::Meeting),
        Just(AvatarStatus::Away),
    ]
}

/// Strategy for generating projects.
pub fn project_strategy() -> impl Strategy<Value = Project> {
    (
        id_strategy(),
        text_strategy(),
        text_strategy(),
        color_strategy(),
        prop_oneof![
            Just(ProjectStatus::Active),
            Just(ProjectStatus::Paused),
            Just(ProjectStatus::Archived),
        ],
        text_strategy(),
    )
        .prop_map(|(id, name, description, color, status, created_at)| Project {
            id,
            name,
            description,
            color,
            status,
            created_at,
        })
}

/// Strategy for generating team templates.
pub fn team_template_strategy() -> impl Strategy<Value = TeamTemplate> {
    (
        id_strategy(),
        text_strategy(),
        text_strategy(),
        proptest::option::of(text_strategy()),
        prop::collection::vec(
            (text_strategy(), 0u32..20).prop_map(|(title, count)| TemplateRole { title, count }),
            0..5,
        ),
    )
        .prop_map(|(id, name, description, icon, roles)| TeamTemplate {
            id,
            name,
            description,
            icon,
            roles,
        })
}

/// Strategy for generating tasks.
pub fn task_strategy() -> impl Strategy<Value = Task> {
    let status = prop_oneof![
        Just(TaskStatus::Backlog),
        Just(TaskStatus::Todo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Review),
        Just(TaskStatus::Done),
    ];
    let priority = prop_oneof![
        Just(TaskPriority::Low),
        Just(TaskPriority::Medium),
        Just(TaskPriority::High),
        Just(TaskPriority::Urgent),
    ];
    (
        (id_strategy(), text_strategy(), text_strategy()),
        (status, priority),
        (
            proptest::option::of(id_strategy()),
            proptest::option::of(id_strategy()),
        ),
        tags_strategy(),
        (proptest::option::of(text_strategy()), text_strategy()),
    )
        .prop_map(
            |(
                (id, title, description),
                (status, priority),
                (project_id, assignee_id),
                tags,
                (due_date, created_at),
            )| Task {
                id,
                title,
                description,
                status,
                priority,
                project_id,
                assignee_id,
                tags,
                due_date,
                created_at,
            },
        )
}

/// Strategy for generating settings bags.
pub fn settings_strategy() -> impl Strategy<Value = Settings> {
    (
        text_strategy(),
        prop_oneof![Just(Theme::Dark), Just(Theme::Light)],
        any::<bool>(),
        any::<bool>(),
        0.1f64..5.0,
    )
        .prop_map(
            |(office_name, theme, show_grid, sound_enabled, camera_speed)| Settings {
                office_name,
                theme,
                show_grid,
                sound_enabled,
                camera_speed,
            },
        )
}

/// Strategy for generating a board of tasks with unique ids.
pub fn task_board_strategy() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(task_strategy(), 0..12).prop_map(|tasks| {
        tasks
            .into_iter()
            .enumerate()
            .map(|(i, mut task)| {
                task.id = format!("{}-{i}", task.id);
                task
            })
            .collect()
    })
}
