//! Tool registry and dispatch.
//!
//! Every tool takes a map of named arguments and returns a JSON record:
//! either a payload carrying `"success": true`, or an `"error"` record with
//! the failure message (occasionally with advisory extras alongside).
//! Handler failures never escape as transport errors; they are folded into
//! the record so the client always sees a well-formed result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info};
use serde_json::{json, Map, Value};

use oxitex_core::compile::{CompileRequest, Compiler};
use oxitex_core::error::ToolError;
use oxitex_lint::validate;
use oxitex_workspace::{files, template, Workspace};

/// Owns the collaborators tools need: the workspace root and the compiler.
pub struct ToolHost {
    workspace: Arc<Workspace>,
    compiler: Compiler,
}

impl ToolHost {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self {
            workspace,
            compiler: Compiler::new(),
        }
    }

    /// Tool descriptors advertised through `tools/list`.
    pub fn descriptors() -> Value {
        json!([
            {
                "name": "create_latex_file",
                "description": "Create a new LaTeX file with optional template",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "filename": {"type": "string", "description": "Name of the file to create"},
                        "content": {"type": "string", "description": "Content of the file"},
                        "template": {"type": "string", "description": "Template type (article, report, book, beamer, etc.)"},
                        "path": {"type": "string", "description": "Path relative to workspace"}
                    },
                    "required": ["filename"]
                }
            },
            {
                "name": "read_latex_file",
                "description": "Read content of a LaTeX file",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "filename": {"type": "string", "description": "Name of the file to read"},
                        "path": {"type": "string", "description": "Path relative to workspace"}
                    },
                    "required": ["filename"]
                }
            },
            {
                "name": "edit_latex_file",
                "description": "Edit an existing LaTeX file",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "filename": {"type": "string", "description": "Name of the file to edit"},
                        "content": {"type": "string", "description": "New content of the file"},
                        "path": {"type": "string", "description": "Path relative to workspace"}
                    },
                    "required": ["filename", "content"]
                }
            },
            {
                "name": "compile_latex",
                "description": "Compile a LaTeX document",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "filename": {"type": "string", "description": "Main .tex file to compile"},
                        "engine": {"type": "string", "description": "LaTeX engine (pdflatex, lualatex, xelatex)"},
                        "bibtex": {"type": "boolean", "description": "Run BibTeX/Biber"},
                        "path": {"type": "string", "description": "Path relative to workspace"}
                    },
                    "required": ["filename"]
                }
            },
            {
                "name": "validate_latex_syntax",
                "description": "Validate LaTeX syntax and check for common errors",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "filename": {"type": "string", "description": "File to validate"},
                        "path": {"type": "string", "description": "Path relative to workspace"}
                    },
                    "required": ["filename"]
                }
            },
            {
                "name": "list_latex_files",
                "description": "List all LaTeX-related files in a directory",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "path": {"type": "string", "description": "Path to list files from"},
                        "include_auxiliary": {"type": "boolean", "description": "Include auxiliary files"}
                    }
                }
            },
            {
                "name": "clean_latex_auxiliary",
                "description": "Clean auxiliary files generated during compilation",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "path": {"type": "string", "description": "Path to clean"},
                        "keep_pdf": {"type": "boolean", "description": "Keep PDF files"}
                    }
                }
            },
            {
                "name": "get_latex_template",
                "description": "Get a LaTeX template for a specific document type",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "document_class": {"type": "string", "description": "Document class"},
                        "options": {"type": "object", "description": "Template options"}
                    },
                    "required": ["document_class"]
                }
            },
            {
                "name": "change_workspace",
                "description": "Change the current workspace directory for LaTeX operations",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "new_workspace": {"type": "string", "description": "Path to the new workspace directory"}
                    },
                    "required": ["new_workspace"]
                }
            }
        ])
    }

    /// Runs the named tool, folding every failure into the returned record.
    pub async fn call(&self, name: &str, arguments: &Map<String, Value>) -> Value {
        info!("executing tool: {name}");
        let result = match name {
            "create_latex_file" => self.create_latex_file(arguments).await,
            "read_latex_file" => self.read_latex_file(arguments).await,
            "edit_latex_file" => self.edit_latex_file(arguments).await,
            "compile_latex" => self.compile_latex(arguments).await,
            "validate_latex_syntax" => self.validate_latex_syntax(arguments).await,
            "list_latex_files" => self.list_latex_files(arguments),
            "clean_latex_auxiliary" => self.clean_latex_auxiliary(arguments),
            "get_latex_template" => self.get_latex_template(arguments),
            "change_workspace" => self.change_workspace(arguments),
            _ => return json!({ "error": format!("Unknown tool: {name}") }),
        };
        match result {
            Ok(record) => record,
            Err(err) => {
                error!("tool {name} failed ({}): {err}", err.kind());
                json!({ "error": err.to_string() })
            }
        }
    }

    async fn create_latex_file(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let filename = required_str(arguments, "filename")?;
        let template_name = optional_str(arguments, "template");
        let path = self
            .workspace
            .resolve(filename, optional_str(arguments, "path"));

        let content = match optional_str(arguments, "content") {
            Some(content) => content.to_string(),
            None => template::template_for(template_name.unwrap_or("article")).to_string(),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(internal("Failed to create file"))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(internal("Failed to create file"))?;

        Ok(json!({
            "success": true,
            "message": format!("Created LaTeX file: {}", path.display()),
            "path": path.display().to_string(),
            "template_used": template_name.unwrap_or("article"),
        }))
    }

    async fn read_latex_file(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let filename = required_str(arguments, "filename")?;
        let path = self
            .workspace
            .resolve(filename, optional_str(arguments, "path"));
        if !path.exists() {
            return Err(not_found(&path));
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(internal("Failed to read file"))?;

        Ok(json!({
            "success": true,
            "path": path.display().to_string(),
            "size": content.len(),
            "lines": content.split('\n').count(),
            "content": content,
        }))
    }

    async fn edit_latex_file(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let filename = required_str(arguments, "filename")?;
        let content = required_str(arguments, "content")?;
        let path = self
            .workspace
            .resolve(filename, optional_str(arguments, "path"));

        let existed = path.exists();
        if existed {
            tokio::fs::copy(&path, backup_path(&path))
                .await
                .map_err(internal("Failed to edit file"))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(internal("Failed to edit file"))?;

        Ok(json!({
            "success": true,
            "message": format!("Updated LaTeX file: {}", path.display()),
            "path": path.display().to_string(),
            "backup_created": existed,
        }))
    }

    async fn compile_latex(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let filename = required_str(arguments, "filename")?;
        let engine = optional_str(arguments, "engine").unwrap_or("pdflatex");
        let bibliography = optional_bool(arguments, "bibtex", false);
        let source = self
            .workspace
            .resolve(filename, optional_str(arguments, "path"));

        let request = CompileRequest {
            source,
            engine: engine.to_string(),
            bibliography,
        };
        let outcome = self.compiler.compile(&request).await?;
        serde_json::to_value(outcome)
            .map_err(|e| ToolError::Internal(format!("Compilation failed: {e}")))
    }

    async fn validate_latex_syntax(
        &self,
        arguments: &Map<String, Value>,
    ) -> Result<Value, ToolError> {
        let filename = required_str(arguments, "filename")?;
        let path = self
            .workspace
            .resolve(filename, optional_str(arguments, "path"));
        if !path.exists() {
            return Err(not_found(&path));
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(internal("Validation failed"))?;
        let report = validate(&content);

        Ok(json!({
            "success": true,
            "path": path.display().to_string(),
            "errors": report.errors,
            "warnings": report.warnings,
            "is_valid": report.is_valid,
            "structure_complete": report.structure_complete,
        }))
    }

    fn list_latex_files(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let dir = self.workspace.resolve_dir(optional_str(arguments, "path"));
        if !dir.exists() {
            return Err(dir_not_found(&dir));
        }
        let include_auxiliary = optional_bool(arguments, "include_auxiliary", false);
        let listing = files::list_directory(&dir, include_auxiliary)
            .map_err(internal("Failed to list files"))?;

        let total_source = listing.source_files.len();
        let total_output = listing.output_files.len();
        let total_auxiliary = listing.auxiliary_files.len();
        Ok(json!({
            "success": true,
            "directory": dir.display().to_string(),
            "files": listing,
            "total_source": total_source,
            "total_output": total_output,
            "total_auxiliary": total_auxiliary,
        }))
    }

    fn clean_latex_auxiliary(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let dir = self.workspace.resolve_dir(optional_str(arguments, "path"));
        if !dir.exists() {
            return Err(dir_not_found(&dir));
        }
        let keep_pdf = optional_bool(arguments, "keep_pdf", true);
        let report =
            files::clean_directory(&dir, keep_pdf).map_err(internal("Failed to clean files"))?;

        Ok(json!({
            "success": true,
            "directory": dir.display().to_string(),
            "removed_files": report.removed_files,
            "total_files": report.total_files,
            "total_size": report.total_size,
            "pdf_kept": keep_pdf,
        }))
    }

    fn get_latex_template(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let document_class = required_str(arguments, "document_class")?;
        if !template::is_supported(document_class) {
            return Ok(json!({
                "error": format!("Unsupported document class: {document_class}"),
                "supported_classes": template::DOCUMENT_CLASSES,
            }));
        }
        let options = arguments
            .get("options")
            .cloned()
            .unwrap_or_else(|| json!({}));

        Ok(json!({
            "success": true,
            "document_class": document_class,
            "template": template::template_for(document_class),
            "options": options,
        }))
    }

    fn change_workspace(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let new_workspace = required_str(arguments, "new_workspace")?;
        let (old, new) = self
            .workspace
            .change_root(new_workspace)
            .map_err(internal("Failed to change workspace"))?;
        info!(
            "workspace changed from {} to {}",
            old.display(),
            new.display()
        );

        Ok(json!({
            "success": true,
            "message": "Workspace changed successfully",
            "old_workspace": old.display().to_string(),
            "new_workspace": new.display().to_string(),
        }))
    }
}

fn required_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidInput(format!("Missing required argument: {key}")))
}

fn optional_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(Value::as_str)
}

fn optional_bool(arguments: &Map<String, Value>, key: &str, default: bool) -> bool {
    arguments.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn internal(prefix: &'static str) -> impl Fn(std::io::Error) -> ToolError {
    move |e| ToolError::Internal(format!("{prefix}: {e}"))
}

fn not_found(path: &Path) -> ToolError {
    ToolError::NotFound(format!("File does not exist: {}", path.display()))
}

fn dir_not_found(dir: &Path) -> ToolError {
    ToolError::NotFound(format!("Directory does not exist: {}", dir.display()))
}

/// Sibling path with `.bak` appended to the full file name, so `main.tex`
/// backs up to `main.tex.bak`.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}
