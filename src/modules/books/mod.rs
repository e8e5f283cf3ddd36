pub mod handlers;
pub mod models;
pub mod repository;
pub mod sanitize;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, put},
    Router,
};
use serde_json::json;

use folio_authz::AuthorizationPort;
use folio_kernel::{InitCtx, Module, RecordTypeDef};
use folio_media::MediaImport;
use folio_store::ContentStore;

use handlers::BooksState;
use repository::BookRepository;

/// REST CRUD module for the `book` content type.
pub struct BooksModule {
    state: Arc<BooksState>,
}

impl BooksModule {
    pub fn new(
        store: Arc<dyn ContentStore>,
        importer: Arc<dyn MediaImport>,
        authz: Arc<dyn AuthorizationPort>,
    ) -> Self {
        Self {
            state: Arc::new(BooksState {
                repo: BookRepository::new(store),
                importer,
                authz,
            }),
        }
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

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/",
                get(handlers::list_books).post(handlers::create_book),
            )
            .route(
                "/{id}",
                put(handlers::update_book)
                    .patch(handlers::update_book)
                    .delete(handlers::delete_book),
            )
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "per_page",
                                "in": "query",
                                "schema": { "type": "integer", "default": 10 }
                            },
                            {
                                "name": "page",
                                "in": "query",
                                "schema": { "type": "integer", "default": 1 }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Paginated list of books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/BookList"
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Page number exceeds available pages",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "responses": {
                            "201": {
                                "description": "Created book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/Book"
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing or invalid input",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            },
                            "403": {
                                "description": "Caller may not create books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "id",
                                "in": "path",
                                "required": true,
                                "schema": { "type": "integer", "minimum": 1 }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Updated book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/Book"
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Invalid id or thumbnail failure",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            },
                            "403": {
                                "description": "Caller may not edit this book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "id",
                                "in": "path",
                                "required": true,
                                "schema": { "type": "integer", "minimum": 1 }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Deletion confirmation",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/BookDeleted"
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "Book not found",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "content": { "type": "string" },
                            "excerpt": { "type": "string" },
                            "status": { "type": "string" },
                            "permalink": { "type": "string" },
                            "thumbnail_url": { "type": "string", "nullable": true }
                        },
                        "required": ["id", "title", "status", "permalink"]
                    },
                    "BookList": {
                        "type": "object",
                        "properties": {
                            "data": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            },
                            "meta": {
                                "type": "object",
                                "properties": {
                                    "total": { "type": "integer" },
                                    "pages": { "type": "integer" },
                                    "per_page": { "type": "integer" },
                                    "current": { "type": "integer" }
                                }
                            }
                        },
                        "required": ["data", "meta"]
                    },
                    "BookDeleted": {
                        "type": "object",
                        "properties": {
                            "deleted": { "type": "boolean" },
                            "id": { "type": "integer" },
                            "message": { "type": "string" }
                        },
                        "required": ["deleted", "id", "message"]
                    }
                }
            }
        }))
    }

    fn record_types(&self) -> Vec<RecordTypeDef> {
        vec![RecordTypeDef {
            kind: repository::BOOK_KIND,
            rewrite_slug: "book",
            label: "Book",
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
pub fn create_module(
    store: Arc<dyn ContentStore>,
    importer: Arc<dyn MediaImport>,
    authz: Arc<dyn AuthorizationPort>,
) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, importer, authz))
}
