use lectio_core::{
    Canon, Direction, InsightIndex, Lens, LensPartition, NavigationResolver, ParsedReference,
    ReferenceParser, Testament,
};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

#[derive(Debug, Deserialize)]
struct McpRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    #[serde(default)]
    params: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
}

impl McpResponse {
    fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<serde_json::Value>, code: i32, message: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.to_string(),
            }),
        }
    }

    fn text(id: Option<serde_json::Value>, text: &str) -> Self {
        Self::success(
            id,
            serde_json::json!({
                "content": [{
                    "type": "text",
                    "text": text
                }]
            }),
        )
    }
}

#[derive(Debug, Serialize)]
struct ToolDefinition {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: serde_json::Value,
}

fn reference_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

fn get_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "parse_reference".to_string(),
            description: "Parse a Bible reference (e.g., 'John 3:16', '1 Cor 13:4-7', 'Psalm 23')".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "reference": reference_schema("Bible reference to parse")
                },
                "required": ["reference"]
            }),
        },
        ToolDefinition {
            name: "verse_insights".to_string(),
            description: "Get the study insights attached to a verse, grouped by lens".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "reference": reference_schema("Verse reference (e.g., 'John 1:1')"),
                    "lens": {
                        "type": "string",
                        "description": "Optional lens filter: 'theology', 'question', 'connection', or 'greek'"
                    }
                },
                "required": ["reference"]
            }),
        },
        ToolDefinition {
            name: "nearest_insight".to_string(),
            description: "Find the next (or previous) verse in the same chapter that has insights".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "reference": reference_schema("Verse to search from (e.g., 'John 1:3')"),
                    "direction": {
                        "type": "string",
                        "description": "'forward' (default) or 'backward'",
                        "default": "forward"
                    }
                },
                "required": ["reference"]
            }),
        },
        ToolDefinition {
            name: "resolve_reference".to_string(),
            description: "Resolve a reference to a navigation target (book id, chapter, verse to highlight)".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "reference": reference_schema("Reference to navigate to")
                },
                "required": ["reference"]
            }),
        },
        ToolDefinition {
            name: "list_books".to_string(),
            description: "List all books with chapter counts, optionally filtered by testament".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "testament": {
                        "type": "string",
                        "description": "Optional testament filter: 'OT' or 'NT'"
                    }
                }
            }),
        },
    ]
}

/// Read-only state the tools answer from
pub struct ToolContext<'a> {
    pub canon: &'a Canon,
    pub index: &'a InsightIndex,
}

fn handle_initialize(id: Option<serde_json::Value>) -> McpResponse {
    McpResponse::success(
        id,
        serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "lectio",
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

fn handle_tools_list(id: Option<serde_json::Value>) -> McpResponse {
    McpResponse::success(
        id,
        serde_json::json!({
            "tools": get_tools()
        }),
    )
}

fn handle_tool_call(
    id: Option<serde_json::Value>,
    params: &serde_json::Value,
    ctx: &ToolContext<'_>,
) -> McpResponse {
    let tool_name = params
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let arguments = params.get("arguments").cloned().unwrap_or(serde_json::json!({}));

    match tool_name {
        "parse_reference" => handle_parse_reference(id, &arguments, ctx),
        "verse_insights" => handle_verse_insights(id, &arguments, ctx),
        "nearest_insight" => handle_nearest_insight(id, &arguments, ctx),
        "resolve_reference" => handle_resolve_reference(id, &arguments, ctx),
        "list_books" => handle_list_books(id, &arguments, ctx),
        _ => McpResponse::error(id, -32601, &format!("Unknown tool: {}", tool_name)),
    }
}

/// Pull `reference` out of the arguments and parse it, or build the error response
fn parse_argument<'c>(
    id: &Option<serde_json::Value>,
    args: &serde_json::Value,
    canon: &'c Canon,
) -> Result<ParsedReference<'c>, McpResponse> {
    let reference = args
        .get("reference")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpResponse::error(id.clone(), -32602, "Missing 'reference' parameter"))?;

    ReferenceParser::new(canon).parse(reference).map_err(|e| {
        McpResponse::error(
            id.clone(),
            -32602,
            &format!("Could not parse reference '{}': {}", reference, e),
        )
    })
}

fn handle_parse_reference(
    id: Option<serde_json::Value>,
    args: &serde_json::Value,
    ctx: &ToolContext<'_>,
) -> McpResponse {
    let parsed = match parse_argument(&id, args, ctx.canon) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let result = serde_json::json!({
        "display": parsed.to_string(),
        "book_id": parsed.book_id(),
        "book": parsed.book.name,
        "chapter": parsed.chapter,
        "verse_start": parsed.verse_start,
        "verse_end": parsed.verse_end,
        "testament": Testament::of(parsed.book_id()).as_str(),
    });
    McpResponse::text(id, &result.to_string())
}

fn handle_verse_insights(
    id: Option<serde_json::Value>,
    args: &serde_json::Value,
    ctx: &ToolContext<'_>,
) -> McpResponse {
    let parsed = match parse_argument(&id, args, ctx.canon) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let Some(location) = parsed.location() else {
        return McpResponse::error(id, -32602, "Reference must name a verse, not a whole chapter");
    };

    let lens_filter = match args.get("lens").and_then(|v| v.as_str()) {
        Some(name) => match Lens::from_str(name) {
            Some(lens) => Some(lens),
            None => return McpResponse::error(id, -32602, &format!("Unknown lens: {}", name)),
        },
        None => None,
    };

    let partition = LensPartition::classify(ctx.index.insights_for(location));
    if partition.is_empty() {
        return McpResponse::text(id, &format!("No insights for {}", parsed));
    }

    let lenses = match lens_filter {
        Some(lens) => vec![lens],
        None => partition.available_lenses(),
    };

    let mut result = String::new();
    for lens in lenses {
        let insights = partition.get(lens);
        if insights.is_empty() {
            continue;
        }
        result.push_str(&format!("## {}\n", lens.display_name()));
        for insight in insights {
            result.push_str(&format!("- {}: {}\n", insight.title, insight.content));
            for source in &insight.sources {
                result.push_str(&format!("  ({}) {}\n", source.kind.as_str(), source.reference));
            }
        }
        result.push('\n');
    }

    if result.is_empty() {
        return McpResponse::text(id, &format!("No insights for {} in that lens", parsed));
    }
    McpResponse::text(id, &format!("{}\n\n{}", parsed, result.trim()))
}

fn handle_nearest_insight(
    id: Option<serde_json::Value>,
    args: &serde_json::Value,
    ctx: &ToolContext<'_>,
) -> McpResponse {
    let parsed = match parse_argument(&id, args, ctx.canon) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let Some(from) = parsed.location() else {
        return McpResponse::error(id, -32602, "Reference must name a verse, not a whole chapter");
    };

    let direction = match args.get("direction").and_then(|v| v.as_str()) {
        Some(name) => match Direction::from_str(name) {
            Some(d) => d,
            None => return McpResponse::error(id, -32602, &format!("Unknown direction: {}", name)),
        },
        None => Direction::Forward,
    };

    let chapter = from.chapter_ref();
    let verses = chapter.verses(ctx.canon);
    let text = match ctx.index.nearest_verse_with_insights(from, direction, &verses) {
        Some(verse) => format!("{}:{}", chapter.display(ctx.canon), verse),
        None => {
            let side = match direction {
                Direction::Forward => "after",
                Direction::Backward => "before",
            };
            format!("No verse {} {} has insights", side, parsed)
        }
    };
    McpResponse::text(id, &text)
}

fn handle_resolve_reference(
    id: Option<serde_json::Value>,
    args: &serde_json::Value,
    ctx: &ToolContext<'_>,
) -> McpResponse {
    let reference = match args.get("reference").and_then(|v| v.as_str()) {
        Some(r) => r,
        None => return McpResponse::error(id, -32602, "Missing 'reference' parameter"),
    };

    // An unresolvable reference is a no-op navigation, not an error
    let target = NavigationResolver::new(ctx.canon).resolve(reference);
    McpResponse::text(id, &serde_json::json!({ "target": target }).to_string())
}

fn handle_list_books(
    id: Option<serde_json::Value>,
    args: &serde_json::Value,
    ctx: &ToolContext<'_>,
) -> McpResponse {
    let testaments = match args.get("testament").and_then(|v| v.as_str()) {
        Some(filter) => match Testament::from_str(filter) {
            Some(t) => vec![t],
            None => {
                return McpResponse::error(
                    id,
                    -32602,
                    &format!("Testament not found: {}. Available: OT, NT", filter),
                )
            }
        },
        None => vec![Testament::Old, Testament::New],
    };

    let mut result = String::new();
    for testament in testaments {
        result.push_str(&format!("## {}\n", testament.display_name()));
        for book in ctx.canon.books_in(testament) {
            result.push_str(&format!(
                "- {} ({}, {} chapters)\n",
                book.name, book.abbreviation, book.chapter_count
            ));
        }
        result.push('\n');
    }

    McpResponse::text(id, result.trim())
}

/// Answer one line of input; notifications get no response
fn handle_line(line: &str, ctx: &ToolContext<'_>) -> Option<McpResponse> {
    let request: McpRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            return Some(McpResponse::error(None, -32700, &format!("Parse error: {}", e)));
        }
    };

    tracing::debug!(method = %request.method, "tool server request");
    let response = match request.method.as_str() {
        "initialize" => handle_initialize(request.id),
        "notifications/initialized" => return None,
        "tools/list" => handle_tools_list(request.id),
        "tools/call" => handle_tool_call(request.id, &request.params, ctx),
        _ => McpResponse::error(request.id, -32601, &format!("Method not found: {}", request.method)),
    };
    Some(response)
}

pub fn serve<R: BufRead, W: Write>(ctx: &ToolContext<'_>, input: R, mut output: W) {
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        if line.trim().is_empty() {
            continue;
        }

        if let Some(response) = handle_line(&line, ctx) {
            let _ = serde_json::to_writer(&mut output, &response);
            let _ = writeln!(output);
            let _ = output.flush();
        }
    }
}

pub fn run_mcp_server(canon: &Canon, index: &InsightIndex) {
    tracing::info!(insights = index.len(), "tool server listening on stdio");
    let ctx = ToolContext { canon, index };
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(&ctx, stdin.lock(), stdout.lock());
}
