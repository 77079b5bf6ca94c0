//! Owner-scoped resources projecting the read tools.

use crate::builtins::activity::{ActivityQuery, list_activities};
use crate::builtins::profile::fetch_profile;
use crate::{Resource, ToolContext};
use async_trait::async_trait;
use lifetracker_protocol::{ToolError, ToolResponse};

/// `profile://{owner}`: the owner's profile.
#[derive(Debug, Default)]
pub struct ProfileResource;

#[async_trait]
impl Resource for ProfileResource {
    fn scheme(&self) -> &str {
        "profile"
    }

    fn name(&self) -> &str {
        "user_profile"
    }

    fn description(&self) -> &str {
        "User profile as context for the assistant"
    }

    async fn read(&self, ctx: &ToolContext, owner: &str) -> Result<ToolResponse, ToolError> {
        fetch_profile(ctx, owner).await
    }
}

/// `recent-activities://{owner}`: the owner's latest activity logs.
#[derive(Debug, Default)]
pub struct RecentActivitiesResource;

#[async_trait]
impl Resource for RecentActivitiesResource {
    fn scheme(&self) -> &str {
        "recent-activities"
    }

    fn name(&self) -> &str {
        "recent_activities"
    }

    fn description(&self) -> &str {
        "Most recent activity logs as context for the assistant"
    }

    async fn read(&self, ctx: &ToolContext, owner: &str) -> Result<ToolResponse, ToolError> {
        let limit = i64::try_from(ctx.limits().recent_activity_limit).unwrap_or(i64::MAX);
        let query = ActivityQuery {
            owner: owner.to_string(),
            limit: Some(limit),
            ..ActivityQuery::default()
        };
        list_activities(ctx, query).await
    }
}
