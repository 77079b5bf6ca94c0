//! MCP server binding over the tool and resource registries.

use crate::service::Service;
use lifetracker_protocol::{ToolError, ToolResponse};
use lifetracker_tools::{ResourceSpec, ToolSpec};
use log::{debug, info};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ListResourceTemplatesResult, ListToolsResult,
    PaginatedRequestParams, ReadResourceRequestParams, ReadResourceResult, ResourceTemplate,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use serde_json::{Value, json};

const INSTRUCTIONS: &str = "Log food, drink and exercise, keep a user profile, and save \
memory entries and quick actions. Every tool takes the user's id or email as `owner`. \
Read `profile://{owner}` or `recent-activities://{owner}` for context.";

/// MCP server exposing the LifeTracker tool catalogue and resources.
#[derive(Clone)]
pub struct LifeTrackerServer {
    service: Service,
}

impl LifeTrackerServer {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Serve over stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        info!(
            "starting MCP server (tools={}, resources={})",
            self.service.tools().list().len(),
            self.service.resources().specs().len()
        );
        let running = self.serve(rmcp::transport::stdio()).await?;
        let reason = running.waiting().await?;
        info!("MCP server stopped (reason={reason:?})");
        Ok(())
    }
}

pub(crate) fn mcp_tool(spec: &ToolSpec) -> Result<Tool, serde_json::Error> {
    serde_json::from_value(json!({
        "name": spec.name,
        "description": spec.description,
        "inputSchema": spec.args_schema,
    }))
}

pub(crate) fn mcp_resource_template(
    spec: &ResourceSpec,
) -> Result<ResourceTemplate, serde_json::Error> {
    serde_json::from_value(json!({
        "uriTemplate": spec.uri_template,
        "name": spec.name,
        "description": spec.description,
        "mimeType": spec.mime_type,
    }))
}

/// Envelope as MCP tool output; failure envelopes set `isError`.
pub(crate) fn call_result(response: &ToolResponse) -> CallToolResult {
    let content = vec![Content::text(response.to_json_string())];
    if response.success {
        CallToolResult::success(content)
    } else {
        CallToolResult::error(content)
    }
}

pub(crate) fn read_result(
    uri: &str,
    response: &ToolResponse,
) -> Result<ReadResourceResult, serde_json::Error> {
    serde_json::from_value(json!({
        "contents": [{
            "uri": uri,
            "mimeType": "application/json",
            "text": response.to_json_string(),
        }]
    }))
}

fn internal_error(err: serde_json::Error) -> ErrorData {
    ErrorData::internal_error(err.to_string(), None)
}

impl ServerHandler for LifeTrackerServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder()
            .enable_tools()
            .enable_resources()
            .build();
        info.server_info.name = env!("CARGO_PKG_NAME").to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self
            .service
            .tools()
            .specs()
            .iter()
            .map(mcp_tool)
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal_error)?;
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!("received tool call (name={})", request.name);
        let args = Value::Object(request.arguments.unwrap_or_default());
        let response = self.service.call_tool(&request.name, args).await;
        Ok(call_result(&response))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        let templates = self
            .service
            .resources()
            .specs()
            .iter()
            .map(mcp_resource_template)
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal_error)?;
        Ok(ListResourceTemplatesResult::with_all_items(templates))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        debug!("received resource read (uri={})", request.uri);
        match self.service.read_resource(&request.uri).await {
            Ok(response) => read_result(&request.uri, &response).map_err(internal_error),
            Err(err @ ToolError::ResourceNotFound(_)) => Err(ErrorData::resource_not_found(
                err.to_string(),
                Some(json!({ "uri": request.uri })),
            )),
            Err(err) => Err(ErrorData::internal_error(err.to_string(), None)),
        }
    }
}
