use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{pool_members, pools};

// --- Pool ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = pools)]
pub struct Pool {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pools)]
pub struct NewPool {
    pub name: String,
    pub location: Option<String>,
}

// --- PoolMember ---

#[derive(Debug, Queryable, Serialize, Clone)]
#[diesel(table_name = pool_members)]
pub struct PoolMember {
    pub pool_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pool_members)]
pub struct NewPoolMember {
    pub pool_id: Uuid,
    pub user_id: Uuid,
}
