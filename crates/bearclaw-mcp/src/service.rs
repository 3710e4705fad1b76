//! rmcp service exposing Bear note tools.
//!
//! Read tools query the SQLite store through [`BearDb`]; write tools go
//! through Bear's x-callback-url scheme. Tool failures are reported as
//! tool results carrying `isError`, never as protocol-level errors, since
//! some MCP clients tear down the whole session on a protocol error.

use rmcp::{ErrorData as McpError, model::*, tool, tool_router, handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter}};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use schemars::JsonSchema;
use serde::Deserialize;

use bearclaw_core::{normalize_tag, SearchOptions, SortField};
use bearclaw_sqlite::BearDb;

use crate::format;
use crate::xcallback::{encode_tags, XCallbackClient};

fn tool_text(text: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text.into())]))
}

fn tool_error(text: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(text.into())]))
}

/// Parses a `YYYY-MM-DD` day as midnight UTC.
fn parse_day(value: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Which timestamp column list and date tools work over.
#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Created,
    #[default]
    Modified,
}

impl From<SortBy> for SortField {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Created => SortField::Created,
            SortBy::Modified => SortField::Modified,
        }
    }
}

/// Where added text lands relative to the existing note body.
#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AddMode {
    #[default]
    Append,
    Prepend,
    Replace,
}

impl AddMode {
    fn as_str(self) -> &'static str {
        match self {
            AddMode::Append => "append",
            AddMode::Prepend => "prepend",
            AddMode::Replace => "replace",
        }
    }
}

fn default_search_limit() -> u32 {
    20
}

fn default_recent_limit() -> u32 {
    10
}

fn default_date_limit() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OpenNoteParams {
    /// Note title or unique identifier
    query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchNotesParams {
    /// Text to match against note titles and bodies
    term: Option<String>,
    /// Tag to filter by, with or without the leading #
    tag: Option<String>,
    /// Maximum number of results
    #[serde(default = "default_search_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTagsParams {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OpenTagParams {
    /// Tag name, with or without the leading #
    tag: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecentNotesParams {
    /// Maximum number of notes, capped at 50
    #[serde(default = "default_recent_limit")]
    limit: u32,
    /// Whether pinned notes appear in the list
    #[serde(default = "default_true")]
    include_pinned: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PinnedNotesParams {
    /// Sort by creation or modification date
    #[serde(default)]
    sort_by: SortBy,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NotesByDateParams {
    /// Range start as YYYY-MM-DD, inclusive from midnight UTC
    start_date: String,
    /// Range end as YYYY-MM-DD, inclusive at midnight UTC
    end_date: String,
    /// Which timestamp the range filters on
    #[serde(default)]
    date_type: SortBy,
    /// Maximum number of notes, capped at 100
    #[serde(default = "default_date_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetNoteStatsParams {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateNoteParams {
    /// Title rendered as a leading H1 heading
    title: Option<String>,
    /// Markdown body of the new note
    content: String,
    /// Tags to attach; entries may be comma-separated
    tags: Option<Vec<String>>,
    /// Pin the note after creating it
    #[serde(default)]
    pin: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTextParams {
    /// Unique identifier of the target note
    id: String,
    /// Text to add
    text: String,
    /// append, prepend, or replace
    #[serde(default)]
    mode: AddMode,
    /// Bring the note to the foreground in Bear afterwards
    #[serde(default)]
    open_note: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TrashNoteParams {
    /// Unique identifier of the note to trash
    id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenameTagParams {
    /// Current tag name, with or without the leading #
    old_name: String,
    /// New tag name, with or without the leading #
    new_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTagParams {
    /// Tag name to delete, with or without the leading #
    name: String,
}

/// Bear MCP service.
///
/// Holds the read-only database handle and the x-callback-url client for
/// writes. Cheap to clone; rmcp clones the service per connection.
#[derive(Clone)]
pub struct BearclawService {
    db: BearDb,
    bear: XCallbackClient,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BearclawService {
    /// Service over the given database, driving Bear through the system
    /// `open` command.
    pub fn new(db: BearDb) -> Self {
        Self {
            db,
            bear: XCallbackClient::system(),
            tool_router: Self::tool_router(),
        }
    }

    /// Service with a custom x-callback-url client. Tests use this to
    /// capture outgoing Bear commands instead of launching them.
    pub fn with_client(db: BearDb, bear: XCallbackClient) -> Self {
        Self {
            db,
            bear,
            tool_router: Self::tool_router(),
        }
    }

    /// Fetch one note by exact title or identifier.
    #[tool(description = "[READ] Open a note by its exact title or unique identifier and return its full content")]
    async fn open_note(
        &self,
        Parameters(params): Parameters<OpenNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.db.note_by_title_or_id(params.query.trim()).await {
            Ok(Some(note)) => tool_text(format::note_details(&note)),
            Ok(None) => tool_text(format!(
                "No note found with title or ID: \"{}\"",
                params.query.trim()
            )),
            Err(e) => tool_error(e.to_string()),
        }
    }

    /// Search notes by a text term, a tag, or both.
    #[tool(description = "[READ] Search notes by a text term or by tag; at least one filter is required")]
    async fn search_notes(
        &self,
        Parameters(params): Parameters<SearchNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        let term = params
            .term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);
        let tag = params
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);

        let scope = match (&term, &tag) {
            (Some(term), _) => format!("matching \"{term}\""),
            (None, Some(tag)) => format!("with tag #{}", normalize_tag(tag)),
            (None, None) => {
                return tool_error("Error: Please provide either a search term or a tag")
            }
        };

        let options = SearchOptions {
            term,
            tag,
            limit: Some(params.limit),
        };
        match self.db.search_notes(options).await {
            Ok(notes) if notes.is_empty() => tool_text(format!("No notes found {scope}")),
            Ok(notes) => tool_text(format::search_results(&notes, &scope)),
            Err(e) => tool_error(e.to_string()),
        }
    }

    /// Every tag in the database with usage counts.
    #[tool(description = "[READ] List every tag in the Bear database grouped by how many notes use it")]
    async fn get_tags(
        &self,
        Parameters(_params): Parameters<GetTagsParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.db.all_tags().await {
            Ok(tags) if tags.is_empty() => tool_text("No tags found in your Bear notes"),
            Ok(tags) => tool_text(format::tag_overview(&tags)),
            Err(e) => tool_error(e.to_string()),
        }
    }

    /// All notes carrying one tag.
    #[tool(description = "[READ] List all notes carrying a specific tag")]
    async fn open_tag(
        &self,
        Parameters(params): Parameters<OpenTagParams>,
    ) -> Result<CallToolResult, McpError> {
        let tag = normalize_tag(params.tag.trim());
        if tag.is_empty() {
            return tool_error("Error: Tag name is required");
        }
        match self.db.notes_by_tag(tag).await {
            Ok(notes) if notes.is_empty() => tool_text(format!("No notes found with tag #{tag}")),
            Ok(notes) => tool_text(format::notes_with_tag(tag, &notes)),
            Err(e) => tool_error(e.to_string()),
        }
    }

    /// Most recently modified notes.
    #[tool(description = "[READ] List the most recently modified notes, optionally excluding pinned ones")]
    async fn get_recent_notes(
        &self,
        Parameters(params): Parameters<RecentNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        // Zero falls back to the default rather than returning nothing.
        let limit = if params.limit == 0 {
            default_recent_limit()
        } else {
            params.limit.min(50)
        };
        match self.db.recent_notes(limit, params.include_pinned).await {
            Ok(notes) if notes.is_empty() => tool_text("No recent notes found"),
            Ok(notes) => tool_text(format::recent_list(&notes)),
            Err(e) => tool_error(e.to_string()),
        }
    }

    /// Pinned notes sorted by creation or modification date.
    #[tool(description = "[READ] List pinned notes sorted by creation or modification date")]
    async fn get_pinned_notes(
        &self,
        Parameters(params): Parameters<PinnedNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.db.pinned_notes(params.sort_by.into()).await {
            Ok(notes) if notes.is_empty() => tool_text("No pinned notes found"),
            Ok(notes) => tool_text(format::pinned_list(&notes)),
            Err(e) => tool_error(e.to_string()),
        }
    }

    /// Notes created or modified inside a date range.
    #[tool(description = "[READ] List notes created or modified between two YYYY-MM-DD dates")]
    async fn get_notes_by_date(
        &self,
        Parameters(params): Parameters<NotesByDateParams>,
    ) -> Result<CallToolResult, McpError> {
        let (Some(start), Some(end)) = (parse_day(&params.start_date), parse_day(&params.end_date))
        else {
            return tool_error("Error: Invalid date format. Please use YYYY-MM-DD");
        };
        if start > end {
            return tool_error("Error: Start date must be before end date");
        }
        // Zero falls back to the default rather than returning nothing.
        let limit = if params.limit == 0 {
            default_date_limit()
        } else {
            params.limit.min(100)
        };
        let field = SortField::from(params.date_type);
        match self.db.notes_by_date_range(start, end, field, limit).await {
            Ok(notes) if notes.is_empty() => tool_text(format!(
                "No notes found between {} and {}",
                params.start_date, params.end_date
            )),
            Ok(notes) => tool_text(format::date_range_list(
                &notes,
                field,
                &params.start_date,
                &params.end_date,
            )),
            Err(e) => tool_error(e.to_string()),
        }
    }

    /// Summary statistics over the whole database.
    #[tool(description = "[READ] Summary statistics: note counts, recent activity, top tags, length distribution")]
    async fn get_note_stats(
        &self,
        Parameters(_params): Parameters<GetNoteStatsParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.db.statistics().await {
            Ok(stats) => tool_text(format::stats_report(&stats)),
            Err(e) => tool_error(e.to_string()),
        }
    }

    /// Create a note through Bear.
    #[tool(description = "[WRITE] Create a new note in Bear with optional title, tags, and pin")]
    async fn create_note(
        &self,
        Parameters(params): Parameters<CreateNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        let content = params.content.trim();
        if content.is_empty() {
            return tool_error("Error: Content is required");
        }
        let title = params
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let text = match title {
            Some(title) => format!("# {title}\n\n{content}"),
            None => content.to_string(),
        };
        let tags = params.tags.as_deref().and_then(encode_tags);

        let result = self
            .bear
            .execute(
                "create",
                &[
                    ("text", Some(text.as_str())),
                    ("tags", tags.as_deref()),
                    ("pin", params.pin.then_some("yes")),
                ],
            )
            .await;
        if result.success {
            let suffix = title.map(|t| format!(": {t}")).unwrap_or_default();
            tool_text(format!("Note created successfully{suffix}"))
        } else {
            tool_error(format!("Failed to create note: {}", result.failure_text()))
        }
    }

    /// Add text to an existing note.
    #[tool(description = "[WRITE] Append, prepend, or replace text in an existing note by ID")]
    async fn add_text(
        &self,
        Parameters(params): Parameters<AddTextParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = params.id.trim();
        if id.is_empty() || params.text.is_empty() {
            return tool_error("Error: Note ID and text are required");
        }
        let result = self
            .bear
            .execute(
                "add-text",
                &[
                    ("id", Some(id)),
                    ("text", Some(params.text.as_str())),
                    ("mode", Some(params.mode.as_str())),
                    ("open_note", params.open_note.then_some("yes")),
                ],
            )
            .await;
        if result.success {
            tool_text(format!(
                "Text added to note successfully ({})",
                params.mode.as_str()
            ))
        } else {
            tool_error(format!(
                "Failed to add text to note: {}",
                result.failure_text()
            ))
        }
    }

    /// Move a note to Bear's trash.
    #[tool(description = "[WRITE] Move a note to Bear's trash by ID")]
    async fn trash_note(
        &self,
        Parameters(params): Parameters<TrashNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = params.id.trim();
        if id.is_empty() {
            return tool_error("Error: Note ID is required");
        }
        let result = self.bear.execute("trash", &[("id", Some(id))]).await;
        if result.success {
            tool_text("Note moved to trash successfully")
        } else {
            tool_error(format!("Failed to trash note: {}", result.failure_text()))
        }
    }

    /// Rename a tag everywhere it appears.
    #[tool(description = "[WRITE] Rename a tag across all notes that use it")]
    async fn rename_tag(
        &self,
        Parameters(params): Parameters<RenameTagParams>,
    ) -> Result<CallToolResult, McpError> {
        let old_name = normalize_tag(params.old_name.trim());
        let new_name = normalize_tag(params.new_name.trim());
        if old_name.is_empty() || new_name.is_empty() {
            return tool_error("Error: Both old and new tag names are required");
        }
        let result = self
            .bear
            .execute(
                "rename-tag",
                &[("name", Some(old_name)), ("new_name", Some(new_name))],
            )
            .await;
        if result.success {
            tool_text(format!(
                "Tag renamed successfully from #{old_name} to #{new_name}"
            ))
        } else {
            tool_error(format!("Failed to rename tag: {}", result.failure_text()))
        }
    }

    /// Remove a tag from every note.
    #[tool(description = "[WRITE] Delete a tag from all notes that use it")]
    async fn delete_tag(
        &self,
        Parameters(params): Parameters<DeleteTagParams>,
    ) -> Result<CallToolResult, McpError> {
        let name = normalize_tag(params.name.trim());
        if name.is_empty() {
            return tool_error("Error: Tag name is required");
        }
        let result = self.bear.execute("delete-tag", &[("name", Some(name))]).await;
        if result.success {
            tool_text(format!("Tag deleted successfully: #{name}"))
        } else {
            tool_error(format!("Failed to delete tag: {}", result.failure_text()))
        }
    }
}

impl ServerHandler for BearclawService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bearclaw-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Bearclaw MCP Server".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MCP server for Bear.app notes. Read tools query the Bear SQLite database \
                 directly and work even when Bear is closed. Write tools go through Bear's \
                 x-callback-url scheme and need Bear installed and running on this Mac."
                    .to_string(),
            ),
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        use rmcp::handler::server::tool::ToolCallContext;
        let tcc = ToolCallContext::new(self, request, context);
        self.tool_router.call(tcc).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_router.list_all()))
    }
}

impl BearclawService {
    /// Serve over stdio until the client disconnects.
    pub async fn serve_stdio(self) -> Result<(), anyhow::Error> {
        use rmcp::ServiceExt;

        let _service = self
            .serve((tokio::io::stdin(), tokio::io::stdout()))
            .await?;

        // The service handles requests until EOF or error; park this task.
        std::future::pending::<()>().await;
        Ok(())
    }
}
