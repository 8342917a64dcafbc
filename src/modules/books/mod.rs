pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::DbPool;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use service::BookService;
use store::{BookStore, SqlBookStore};

/// Books resource: CRUD over the `books` table keyed by isbn.
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> anyhow::Result<Self> {
        Ok(Self {
            service: Arc::new(BookService::new(store)?),
        })
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.service.health().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        store::MIGRATIONS.to_vec()
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module backed by the shared SQL pool
pub fn create_module(pool: DbPool) -> anyhow::Result<Arc<dyn Module>> {
    let store: Arc<dyn BookStore> = Arc::new(SqlBookStore::new(pool));
    Ok(Arc::new(BooksModule::new(store)?))
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": { "book": { "$ref": "#/components/schemas/Book" } },
                    "required": ["book"]
                }
            }
        }
    })
}

fn isbn_parameter() -> serde_json::Value {
    json!({
        "name": "isbn",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "minLength": 1, "maxLength": schema::MAX_ISBN_LEN }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let mut book_schema = schema::create_schema();
    let mut update_schema = schema::update_schema();
    for s in [&mut book_schema, &mut update_schema] {
        if let Some(obj) = s.as_object_mut() {
            obj.remove("$schema");
        }
    }
    // Boolean subschemas do not survive the utoipa round trip.
    if let Some(props) = update_schema
        .get_mut("properties")
        .and_then(|p| p.as_object_mut())
    {
        props.remove("isbn");
    }

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books ordered by title",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "All books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "books": {
                                                "type": "array",
                                                "items": { "$ref": "#/components/schemas/Book" }
                                            }
                                        },
                                        "required": ["books"]
                                    }
                                }
                            }
                        },
                        "500": error_response("Store unavailable")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/Book" }
                            }
                        }
                    },
                    "responses": {
                        "201": book_response("Created book"),
                        "400": error_response("Validation error"),
                        "409": error_response("isbn already exists")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        },
                        "500": error_response("Store unavailable")
                    }
                }
            },
            "/{isbn}": {
                "get": {
                    "summary": "Fetch a book by isbn",
                    "tags": ["Books"],
                    "parameters": [isbn_parameter()],
                    "responses": {
                        "200": book_response("The book"),
                        "400": error_response("Malformed isbn"),
                        "404": error_response("isbn not found")
                    }
                },
                "put": {
                    "summary": "Update a book",
                    "tags": ["Books"],
                    "parameters": [isbn_parameter()],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/BookUpdate" }
                            }
                        }
                    },
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("Validation error"),
                        "404": error_response("isbn not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [isbn_parameter()],
                    "responses": {
                        "200": {
                            "description": "Deleted",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "message": { "type": "string" } },
                                        "required": ["message"]
                                    }
                                }
                            }
                        },
                        "404": error_response("isbn not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": book_schema,
                "BookUpdate": update_schema
            }
        }
    })
}
