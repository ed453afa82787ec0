pub mod models;
pub mod repo;
pub mod routes;
pub mod validation;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Migration, Module};
use serde_json::json;

/// Books module: CRUD over the `books` table
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        routes::router(ctx.db.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_ref = json!({ "$ref": "#/components/schemas/Book" });
        let error_ref = json!({ "$ref": "#/components/schemas/ErrorResponse" });
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let payload_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookPayload" }
                }
            }
        });
        let json_response = |description: &str, schema: &serde_json::Value| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": schema } }
            })
        };

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": json_response(
                                "List of books",
                                &json!({ "type": "array", "items": book_ref })
                            ),
                            "500": json_response("Internal server error", &error_ref)
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": payload_body,
                        "responses": {
                            "200": json_response("Created book", &book_ref),
                            "422": json_response("Validation error", &error_ref)
                        }
                    },
                    "delete": {
                        "summary": "Delete all books",
                        "tags": ["Books"],
                        "responses": {
                            "200": json_response(
                                "Confirmation message",
                                &json!({
                                    "type": "object",
                                    "properties": { "message": { "type": "string" } },
                                    "required": ["message"]
                                })
                            )
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": json_response("The book", &book_ref),
                            "404": json_response("Book not found", &error_ref)
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "requestBody": payload_body,
                        "responses": {
                            "200": json_response("Updated book", &book_ref),
                            "404": json_response("Book not found", &error_ref),
                            "422": json_response("Validation error", &error_ref)
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": json_response("The deleted book", &book_ref),
                            "404": json_response("Book not found", &error_ref)
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string", "minLength": 1, "maxLength": 255 },
                            "author": { "type": "string", "minLength": 1, "maxLength": 255 },
                            "description": { "type": "string", "minLength": 1, "maxLength": 255 },
                            "rating": { "type": "integer", "minimum": 0, "maximum": 5 }
                        },
                        "required": ["id", "title", "author", "description", "rating"]
                    },
                    "BookPayload": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1, "maxLength": 255 },
                            "author": { "type": "string", "minLength": 1, "maxLength": 255 },
                            "description": { "type": "string", "minLength": 1, "maxLength": 255 },
                            "rating": { "type": "integer", "minimum": 0, "maximum": 5 }
                        },
                        "required": ["title", "author", "description", "rating"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    title       TEXT    NOT NULL CHECK (title <> '' AND length(title) <= 255),
                    author      TEXT    NOT NULL CHECK (author <> '' AND length(author) <= 255),
                    description TEXT    NOT NULL CHECK (description <> '' AND length(description) <= 255),
                    rating      INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 5)
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
