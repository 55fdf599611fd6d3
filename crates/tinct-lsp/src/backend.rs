//! LSP backend: document store, color provider, and hover.

use std::collections::HashMap;
use std::sync::Arc;

use tinct_core::Catalog;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::config::ServerConfig;
use crate::document::Document;
use crate::logging::{init_logging, LoggingConfig};

// ── Backend ───────────────────────────────────────────────────────────────────

/// Settings fixed at `initialize`.
struct Settings {
    config: ServerConfig,
    catalog: Arc<Catalog>,
}

impl Settings {
    fn new(config: ServerConfig) -> Self {
        let catalog = Arc::new(Catalog::builtin(&config.catalog));
        Self { config, catalog }
    }
}

pub struct Backend {
    client: Client,
    settings: Arc<RwLock<Settings>>,
    docs: Arc<RwLock<HashMap<Url, Document>>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            settings: Arc::new(RwLock::new(Settings::new(ServerConfig::default()))),
            docs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn update(&self, uri: Url, text: String) {
        let (catalog, limits) = {
            let settings = self.settings.read().await;
            (settings.catalog.clone(), settings.config.limits)
        };
        let doc = Document::new(text, &catalog, limits);
        if doc.is_truncated() {
            log::info!("{uri}: scan limit reached; later colors are not reported");
        }
        self.docs.write().await.insert(uri, doc);
    }
}

// ── LanguageServer impl ───────────────────────────────────────────────────────

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let parsed = ServerConfig::from_options(params.initialization_options.as_ref());
        let config = parsed.as_ref().cloned().unwrap_or_default();
        init_logging(LoggingConfig { env_filter: config.log_filter.clone(), ..Default::default() });

        if let Err(e) = &parsed {
            log::warn!("ignoring initializationOptions: {e:#}");
            self.client
                .log_message(MessageType::WARNING, format!("tinct-lsp: {e:#}; using defaults"))
                .await;
        }
        log::debug!("configuration: {config:?}");
        *self.settings.write().await = Settings::new(config);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                color_provider: Some(ColorProviderCapability::Simple(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "tinct-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "tinct-lsp ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    // ── Document lifecycle ────────────────────────────────────────────────────

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.update(params.text_document.uri, params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // FULL sync: the last change holds the whole text.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.update(params.text_document.uri, change.text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.docs.write().await.remove(&params.text_document.uri);
    }

    // ── Colors ────────────────────────────────────────────────────────────────

    async fn document_color(&self, params: DocumentColorParams) -> Result<Vec<ColorInformation>> {
        let docs = self.docs.read().await;
        Ok(docs
            .get(&params.text_document.uri)
            .map(Document::colors)
            .unwrap_or_default())
    }

    async fn color_presentation(
        &self,
        params: ColorPresentationParams,
    ) -> Result<Vec<ColorPresentation>> {
        let docs = self.docs.read().await;
        let Some(doc) = docs.get(&params.text_document.uri) else {
            return Ok(Vec::new());
        };
        match doc.presentations(params.range, params.color) {
            Ok(presentations) => Ok(presentations),
            Err(e) => {
                log::info!("{}: {e}", params.text_document.uri);
                self.client.log_message(MessageType::INFO, format!("tinct-lsp: {e}")).await;
                Ok(Vec::new())
            }
        }
    }

    // ── Hover ─────────────────────────────────────────────────────────────────

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let pos = params.text_document_position_params.position;

        let docs = self.docs.read().await;
        Ok(docs.get(uri).and_then(|doc| doc.hover(pos)))
    }
}
