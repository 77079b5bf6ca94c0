//! Owner-scoped read-only resources addressed as `scheme://{owner}`.

use crate::context::ToolContext;
use async_trait::async_trait;
use lifetracker_protocol::{ToolError, ToolResponse};
use log::{debug, warn};
use parking_lot::RwLock;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Resource metadata for discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSpec {
    /// URI template, e.g. `profile://{owner}`.
    pub uri_template: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// Read-only projection of a tool for one owner.
#[async_trait]
pub trait Resource: Send + Sync + Debug {
    /// URI scheme this resource answers to.
    fn scheme(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    async fn read(&self, ctx: &ToolContext, owner: &str) -> Result<ToolResponse, ToolError>;

    fn uri_template(&self) -> String {
        format!("{}://{{owner}}", self.scheme())
    }

    fn spec(&self) -> ResourceSpec {
        ResourceSpec {
            uri_template: self.uri_template(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            mime_type: "application/json".to_string(),
        }
    }
}

/// Split `scheme://owner` into its parts, percent-decoding the owner.
///
/// Clients expand `{owner}` as a URI template, so `user@example.com` may
/// arrive as `user%40example.com`. The decoded owner must be non-empty valid
/// UTF-8 without path separators.
pub fn parse_resource_uri(uri: &str) -> Option<(&str, String)> {
    let (scheme, rest) = uri.split_once("://")?;
    let raw = rest.strip_suffix('/').unwrap_or(rest);
    if scheme.is_empty() || raw.contains('/') {
        return None;
    }
    let owner = percent_decode_str(raw).decode_utf8().ok()?;
    if owner.trim().is_empty() || owner.contains('/') {
        return None;
    }
    Some((scheme, owner.into_owned()))
}

/// Registry of resources keyed by scheme.
#[derive(Default, Clone)]
pub struct ResourceRegistry {
    resources: Arc<RwLock<HashMap<String, Arc<dyn Resource>>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, resource: Arc<dyn Resource>) {
        debug!("registering resource (template={})", resource.uri_template());
        self.resources
            .write()
            .insert(resource.scheme().to_string(), resource);
    }

    /// Specs for all registered resources, sorted by template.
    pub fn specs(&self) -> Vec<ResourceSpec> {
        let mut specs: Vec<ResourceSpec> = self
            .resources
            .read()
            .values()
            .map(|resource| resource.spec())
            .collect();
        specs.sort_by(|left, right| left.uri_template.cmp(&right.uri_template));
        specs
    }

    /// Match `uri` against the registered templates.
    pub fn resolve(&self, uri: &str) -> Result<(Arc<dyn Resource>, String), ToolError> {
        let (scheme, owner) =
            parse_resource_uri(uri).ok_or_else(|| ToolError::ResourceNotFound(uri.to_string()))?;
        let resource = self
            .resources
            .read()
            .get(scheme)
            .cloned()
            .ok_or_else(|| ToolError::ResourceNotFound(uri.to_string()))?;
        Ok((resource, owner))
    }

    /// Read a resource by URI.
    ///
    /// Unmatched URIs are an error; failures while reading become a failure
    /// envelope like any tool call.
    pub async fn read(&self, ctx: &ToolContext, uri: &str) -> Result<ToolResponse, ToolError> {
        let (resource, owner) = self.resolve(uri)?;
        let ctx = ctx.for_tool(resource.name());
        match resource.read(&ctx, &owner).await {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!("resource read failed (uri={uri}): {err}");
                Ok(ToolResponse::failure(&err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_resource_uri;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_owner_from_uri() {
        assert_eq!(
            parse_resource_uri("profile://user@example.com"),
            Some(("profile", "user@example.com".to_string()))
        );
        assert_eq!(
            parse_resource_uri("recent-activities://u1/"),
            Some(("recent-activities", "u1".to_string()))
        );
    }

    #[test]
    fn decodes_template_expanded_owner() {
        assert_eq!(
            parse_resource_uri("recent-activities://user%40example.com"),
            Some(("recent-activities", "user@example.com".to_string()))
        );
        assert_eq!(
            parse_resource_uri("profile://J%C3%BCrgen"),
            Some(("profile", "Jürgen".to_string()))
        );
        assert_eq!(parse_resource_uri("profile://u1%2Fextra"), None);
        assert_eq!(parse_resource_uri("profile://%FF%FE"), None);
        assert_eq!(parse_resource_uri("profile://%20"), None);
    }

    #[test]
    fn rejects_malformed_uris() {
        assert_eq!(parse_resource_uri("profile:/u1"), None);
        assert_eq!(parse_resource_uri("profile://"), None);
        assert_eq!(parse_resource_uri("profile://u1/extra"), None);
        assert_eq!(parse_resource_uri("://u1"), None);
    }
}
