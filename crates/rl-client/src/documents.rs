//! GraphQL documents for the role schema

macro_rules! role_fields {
    () => {
        "id name description local_group_id working_circle_id time_commitment_min time_commitment_max created_at"
    };
}

/// One page of roles matching the filters, newest first
pub const ROLES_QUERY: &str = concat!(
    "query Roles($limit: Int!, $offset: Int!, $localGroupIds: [Int!]!, $workingCircleIds: [Int!]!, ",
    "$timeCommitmentMin: Int!, $timeCommitmentMax: Int!, $search: String!) { ",
    "roles: role(limit: $limit, offset: $offset, order_by: {created_at: desc}, where: {_and: [",
    "{local_group_id: {_in: $localGroupIds}}, ",
    "{working_circle_id: {_in: $workingCircleIds}}, ",
    "{time_commitment_min: {_gte: $timeCommitmentMin}}, ",
    "{time_commitment_max: {_lte: $timeCommitmentMax}}, ",
    "{name: {_ilike: $search}}",
    "]}) { ",
    role_fields!(),
    " } }"
);

pub const ALL_ROLE_IDS_QUERY: &str = "query AllRoleIds { roles: role { id } }";

pub const CREATE_ROLE_MUTATION: &str = concat!(
    "mutation CreateRole($input: [role_insert_input!]!) { ",
    "insert_role(objects: $input) { returning { ",
    role_fields!(),
    " } } }"
);

pub const UPDATE_ROLE_MUTATION: &str = concat!(
    "mutation UpdateRole($id: Int!, $input: role_set_input!) { ",
    "update_role(where: {id: {_eq: $id}}, _set: $input) { returning { ",
    role_fields!(),
    " } } }"
);

pub const DELETE_ROLE_MUTATION: &str =
    "mutation DeleteRole($id: Int!) { delete_role(where: {id: {_eq: $id}}) { affected_rows } }";

pub const LOCAL_GROUPS_QUERY: &str =
    "query LocalGroups { local_groups: local_group(order_by: {name: asc}) { id name } }";

pub const WORKING_CIRCLES_QUERY: &str = "query WorkingCircles { working_circles: working_circle(order_by: {name: asc}) { id name local_group_id } }";
