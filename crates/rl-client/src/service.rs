//! Data service contracts and their GraphQL implementation

use crate::client::Client;
use crate::documents;
use crate::error::{Error, Result};
use async_trait::async_trait;
use rl_common::{CircleId, GroupId, LocalGroup, Role, RoleId, RoleInput, WorkingCircle};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Variables of the paged role query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub limit: u32,
    pub offset: u32,
    pub local_group_ids: Vec<GroupId>,
    pub working_circle_ids: Vec<CircleId>,
    pub time_commitment_min: u32,
    pub time_commitment_max: u32,
    /// `ILIKE` pattern, already wildcard-wrapped
    pub search: String,
}

impl PageQuery {
    /// Wrap free text as a substring match pattern
    pub fn search_pattern(text: &str) -> String {
        format!("%{}%", text)
    }
}

/// Role CRUD and listing
#[async_trait]
pub trait RoleService: Send + Sync {
    /// Insert a role and return the server's copy
    async fn create(&self, input: &RoleInput) -> Result<Role>;

    /// Overwrite the role with `id` and return the server's copy
    async fn update(&self, id: RoleId, input: &RoleInput) -> Result<Role>;

    async fn delete(&self, id: RoleId) -> Result<()>;

    async fn query_page(&self, query: &PageQuery) -> Result<Vec<Role>>;

    /// Ids of every role on the server
    async fn query_all_ids(&self) -> Result<Vec<RoleId>>;
}

/// Lookup of the categories roles are filed under
#[async_trait]
pub trait GroupService: Send + Sync {
    async fn local_groups(&self) -> Result<Vec<LocalGroup>>;

    async fn working_circles(&self) -> Result<Vec<WorkingCircle>>;
}

#[derive(Deserialize)]
struct Returning {
    returning: Vec<Role>,
}

#[derive(Deserialize)]
struct InsertRoleData {
    insert_role: Returning,
}

#[derive(Deserialize)]
struct UpdateRoleData {
    update_role: Returning,
}

#[derive(Deserialize)]
struct AffectedRows {
    affected_rows: u64,
}

#[derive(Deserialize)]
struct DeleteRoleData {
    delete_role: AffectedRows,
}

#[derive(Deserialize)]
struct RolesData {
    roles: Vec<Role>,
}

#[derive(Deserialize)]
struct IdOnly {
    id: RoleId,
}

#[derive(Deserialize)]
struct RoleIdsData {
    roles: Vec<IdOnly>,
}

#[derive(Deserialize)]
struct LocalGroupsData {
    local_groups: Vec<LocalGroup>,
}

#[derive(Deserialize)]
struct WorkingCirclesData {
    working_circles: Vec<WorkingCircle>,
}

#[async_trait]
impl RoleService for Client {
    async fn create(&self, input: &RoleInput) -> Result<Role> {
        let data: InsertRoleData = self
            .execute_once(
                "CreateRole",
                documents::CREATE_ROLE_MUTATION,
                json!({ "input": [input] }),
            )
            .await?;

        data.insert_role
            .returning
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingData("insert_role returned no rows".into()))
    }

    async fn update(&self, id: RoleId, input: &RoleInput) -> Result<Role> {
        let data: UpdateRoleData = self
            .execute_once(
                "UpdateRole",
                documents::UPDATE_ROLE_MUTATION,
                json!({ "id": id, "input": input }),
            )
            .await?;

        data.update_role
            .returning
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("role {}", id)))
    }

    async fn delete(&self, id: RoleId) -> Result<()> {
        let data: DeleteRoleData = self
            .execute_once(
                "DeleteRole",
                documents::DELETE_ROLE_MUTATION,
                json!({ "id": id }),
            )
            .await?;

        debug!(role_id = %id, affected_rows = data.delete_role.affected_rows, "Role deleted");
        Ok(())
    }

    async fn query_page(&self, query: &PageQuery) -> Result<Vec<Role>> {
        let data: RolesData = self
            .execute("Roles", documents::ROLES_QUERY, query)
            .await?;
        Ok(data.roles)
    }

    async fn query_all_ids(&self) -> Result<Vec<RoleId>> {
        let data: RoleIdsData = self
            .execute("AllRoleIds", documents::ALL_ROLE_IDS_QUERY, json!({}))
            .await?;
        Ok(data.roles.into_iter().map(|r| r.id).collect())
    }
}

#[async_trait]
impl GroupService for Client {
    async fn local_groups(&self) -> Result<Vec<LocalGroup>> {
        let data: LocalGroupsData = self
            .execute("LocalGroups", documents::LOCAL_GROUPS_QUERY, json!({}))
            .await?;
        Ok(data.local_groups)
    }

    async fn working_circles(&self) -> Result<Vec<WorkingCircle>> {
        let data: WorkingCirclesData = self
            .execute("WorkingCircles", documents::WORKING_CIRCLES_QUERY, json!({}))
            .await?;
        Ok(data.working_circles)
    }
}
