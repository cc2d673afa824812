use std::sync::Arc;

use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::{
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    trace::TraceLayer,
};

use atelier_blob::GalleryAdapter;

use crate::{rest, AtelierState};

/// Assembled HTTP application for the gallery backend
pub struct AtelierApp {
    pub router: Router<()>,
}

impl AtelierApp {
    pub fn new(adapter: GalleryAdapter) -> Self {
        let state = AtelierState {
            adapter: Arc::new(adapter),
        };
        let router = rest::media_router(state)
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http());
        Self { router }
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "atelier listening");
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
