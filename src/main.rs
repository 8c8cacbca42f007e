// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use deepcrawl::application::use_cases::crawl_use_case::CrawlUseCase;
use deepcrawl::config::settings::Settings;
use deepcrawl::domain::services::crawl_coordinator::CrawlCoordinator;
use deepcrawl::domain::services::politeness::PolitenessGate;
use deepcrawl::engines::reqwest_engine::ReqwestEngine;
use deepcrawl::engines::traits::HttpFetcher;
use deepcrawl::infrastructure::metrics::init_metrics;
use deepcrawl::presentation::routes;
use deepcrawl::queue::job_registry::JobRegistry;
use deepcrawl::utils::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    init_telemetry();
    info!("Starting deepcrawl...");

    // 2. Initialize Prometheus metrics
    init_metrics();

    // 3. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 4. Build the fetch engine and politeness controls
    let engine: Arc<dyn HttpFetcher> = Arc::new(ReqwestEngine::new(
        &settings.crawler.user_agent,
        settings.crawler.max_body_bytes,
    )?);
    info!("Fetch engine ready: {}", engine.name());
    let politeness = Arc::new(PolitenessGate::new(&settings.crawler));

    // 5. Wire the coordinator, job registry and use case
    let coordinator = Arc::new(CrawlCoordinator::new(
        engine,
        politeness,
        &settings.crawler,
    ));
    let registry = Arc::new(JobRegistry::new(coordinator));
    let use_case = Arc::new(CrawlUseCase::new(registry, settings.clone()));

    // 6. Start the HTTP server
    let app = routes::routes(use_case);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
