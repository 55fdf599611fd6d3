use tower_lsp::{LspService, Server};

mod backend;
mod config;
mod document;
mod logging;
mod position;

use backend::Backend;

// Logging starts in `initialize`, once the client's `logFilter` is known.
#[tokio::main]
async fn main() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
