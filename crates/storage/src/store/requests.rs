#![forbid(unsafe_code)]

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertProjectRequest {
    pub owner_id: String,
    pub project_id: String,
    /// `None` appends under the owner's root.
    pub parent_id: Option<String>,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveProjectRequest {
    pub owner_id: String,
    pub project_id: String,
    pub target_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteSubtreeRequest {
    pub owner_id: String,
    pub project_id: String,
    pub force: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListProjectsRequest {
    pub owner_id: String,
    pub include_system: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameProjectRequest {
    pub owner_id: String,
    pub project_id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetProjectColorRequest {
    pub owner_id: String,
    pub project_id: String,
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetProjectCompletedRequest {
    pub owner_id: String,
    pub project_id: String,
    pub completed: bool,
}
