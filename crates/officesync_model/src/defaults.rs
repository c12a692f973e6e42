//! The starter office shipped with the application.
//!
//! This is what a fresh client shows before anything was persisted, and
//! what the seeder writes to an empty backend.

use crate::entity::{
    Avatar, Project, ProjectStatus, Room, RoomSize, Task, TaskPriority, TaskStatus, TeamTemplate,
    TemplateRole, Vec3,
};
use crate::state::OfficeState;

const CREATED_AT: &str = "2025-01-06T09:00:00Z";

fn projects() -> Vec<Project> {
    let mut platform = Project::new("proj-platform", "Platform");
    platform.description = "Core services and infrastructure".into();
    platform.color = "#6366f1".into();
    platform.created_at = CREATED_AT.into();

    let mut launch = Project::new("proj-launch", "Launch");
    launch.description = "Public launch campaign".into();
    launch.color = "#ec4899".into();
    launch.status = ProjectStatus::Paused;
    launch.created_at = CREATED_AT.into();

    vec![platform, launch]
}

fn rooms() -> Vec<Room> {
    let mut engineering = Room::new("room-eng", "Engineering");
    engineering.project_id = Some("proj-platform".into());
    engineering.position = Vec3::new(-6.0, 0.0, 0.0);
    engineering.size = RoomSize {
        width: 10.0,
        depth: 8.0,
    };
    engineering.features = vec!["desks".into(), "whiteboard".into()];

    let mut studio = Room::new("room-studio", "Studio");
    studio.project_id = Some("proj-launch".into());
    studio.position = Vec3::new(6.0, 0.0, 0.0);
    studio.color = "#ec4899".into();
    studio.features = vec!["screens".into()];

    let mut lounge = Room::new("room-lounge", "Lounge");
    lounge.position = Vec3::new(0.0, 0.0, 9.0);
    lounge.color = "#14b8a6".into();
    lounge.features = vec!["sofa".into(), "coffee".into()];

    vec![engineering, studio, lounge]
}

fn avatars() -> Vec<Avatar> {
    let mut ada = Avatar::new("av-ada", "Ada", "Backend Engineer");
    ada.room_id = Some("room-eng".into());
    ada.position = Vec3::new(-7.0, 0.0, 1.0);
    ada.skills = vec!["rust".into(), "postgres".into()];

    let mut lin = Avatar::new("av-lin", "Lin", "Product Designer");
    lin.room_id = Some("room-studio".into());
    lin.position = Vec3::new(5.0, 0.0, -1.0);
    lin.color = "#f97316".into();
    lin.skills = vec!["figma".into()];

    let mut sam = Avatar::new("av-sam", "Sam", "Project Manager");
    sam.room_id = Some("room-lounge".into());
    sam.position = Vec3::new(0.5, 0.0, 8.0);
    sam.color = "#a855f7".into();

    vec![ada, lin, sam]
}

fn team_templates() -> Vec<TeamTemplate> {
    let mut squad = TeamTemplate::new("tpl-squad", "Feature Squad");
    squad.description = "A cross-functional delivery team".into();
    squad.icon = Some("rocket".into());
    squad.roles = vec![
        TemplateRole::new("Engineer", 3),
        TemplateRole::new("Designer", 1),
        TemplateRole::new("Project Manager", 1),
    ];

    let mut research = TeamTemplate::new("tpl-research", "Research Pod");
    research.roles = vec![TemplateRole::new("Researcher", 2)];

    vec![squad, research]
}

fn tasks() -> Vec<Task> {
    let mut schema = Task::new("task-schema", "Design the storage schema");
    schema.status = TaskStatus::InProgress;
    schema.priority = TaskPriority::High;
    schema.project_id = Some("proj-platform".into());
    schema.assignee_id = Some("av-ada".into());
    schema.tags = vec!["backend".into()];
    schema.created_at = CREATED_AT.into();

    let mut landing = Task::new("task-landing", "Landing page mockups");
    landing.status = TaskStatus::Todo;
    landing.project_id = Some("proj-launch".into());
    landing.assignee_id = Some("av-lin".into());
    landing.due_date = Some("2025-02-01".into());
    landing.created_at = CREATED_AT.into();

    let mut retro = Task::new("task-retro", "Schedule the sprint retro");
    retro.priority = TaskPriority::Low;
    retro.created_at = CREATED_AT.into();

    vec![schema, landing, retro]
}

impl Default for OfficeState {
    fn default() -> Self {
        let mut state = OfficeState::empty();
        *state.projects_mut() = projects();
        *state.rooms_mut() = rooms();
        *state.avatars_mut() = avatars();
        *state.team_templates_mut() = team_templates();
        *state.tasks_mut() = tasks();
        state
    }
}

#[cfg(test)]
mod tests {
    use crate::slice::Slice;
    use crate::state::OfficeState;

    #[test]
    fn starter_office_references_resolve() {
        let state = OfficeState::default();
        for slice in Slice::CONTENT {
            assert!(state.slice_len(slice) > 0, "{slice} is empty");
        }

        let project_ids: Vec<_> = state.projects().iter().map(|p| p.id.as_str()).collect();
        let room_ids: Vec<_> = state.rooms().iter().map(|r| r.id.as_str()).collect();

        for room in state.rooms() {
            if let Some(project) = &room.project_id {
                assert!(project_ids.contains(&project.as_str()));
            }
        }
        for avatar in state.avatars() {
            if let Some(room) = &avatar.room_id {
                assert!(room_ids.contains(&room.as_str()));
            }
        }
    }
}
