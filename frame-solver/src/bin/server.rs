//! Frame Solver HTTP Server

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use frame_solver::prelude::*;

const DEFAULT_ADDR: &str = "0.0.0.0:8086";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    model: ModelFile,
    #[serde(default)]
    options: AnalysisOptions,
    /// Points per member diagram in the response
    #[serde(default = "default_samples")]
    samples: usize,
}

fn default_samples() -> usize {
    21
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<ResultsData>,
}

#[derive(Debug, Serialize)]
struct ResultsData {
    total_dofs: usize,
    free_dofs: usize,
    combos: Vec<ComboData>,
}

#[derive(Debug, Serialize)]
struct ComboData {
    name: String,
    node_displacements: Vec<NodeDisplacementResult>,
    reactions: Vec<ReactionResult>,
    members: Vec<MemberResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    statics: Option<StaticsReport>,
}

#[derive(Debug, Serialize)]
struct NodeDisplacementResult {
    node: String,
    #[serde(flatten)]
    displacement: NodeDisplacement,
}

#[derive(Debug, Serialize)]
struct ReactionResult {
    node: String,
    #[serde(flatten)]
    reaction: Reactions,
}

#[derive(Debug, Serialize)]
struct MemberResult {
    member: String,
    length: f64,
    forces_i: MemberForces,
    forces_j: MemberForces,
    diagrams: Vec<DiagramData>,
}

#[derive(Debug, Serialize)]
struct DiagramData {
    diagram: &'static str,
    x: Vec<f64>,
    values: Vec<f64>,
    min: Extreme,
    max: Extreme,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn analyze(Json(request): Json<AnalysisRequest>) -> impl IntoResponse {
    log::info!("Received analysis request");

    let outcome = tokio::task::spawn_blocking(move || run_analysis(request)).await;
    let (status, response) = match outcome {
        Ok(Ok(results)) => (
            StatusCode::OK,
            AnalysisResponse {
                success: true,
                error: None,
                results: Some(results),
            },
        ),
        Ok(Err(e)) => {
            log::warn!("Analysis failed: {}", e);
            let status = if e.is_instability() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::BAD_REQUEST
            };
            (
                status,
                AnalysisResponse {
                    success: false,
                    error: Some(e.to_string()),
                    results: None,
                },
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            AnalysisResponse {
                success: false,
                error: Some(format!("analysis task failed: {}", e)),
                results: None,
            },
        ),
    };

    (status, Json(response))
}

fn run_analysis(request: AnalysisRequest) -> FrameResult<ResultsData> {
    if request.samples < 2 {
        return Err(FrameError::InvalidInput(format!(
            "samples must be at least 2, got {}",
            request.samples
        )));
    }

    let model = request.model.into_model()?;
    let analysis = model.solve(&request.options)?;

    let combos = analysis
        .combos()
        .map(|combo| combo_data(combo, request.samples))
        .collect::<FrameResult<Vec<_>>>()?;

    Ok(ResultsData {
        total_dofs: analysis.total_dofs(),
        free_dofs: analysis.free_dofs(),
        combos,
    })
}

fn combo_data(combo: &ComboResults, samples: usize) -> FrameResult<ComboData> {
    let node_displacements = combo
        .displacements
        .iter()
        .map(|(node, d)| NodeDisplacementResult {
            node: node.clone(),
            displacement: *d,
        })
        .collect();

    let reactions = combo
        .reactions
        .iter()
        .map(|(node, r)| ReactionResult {
            node: node.clone(),
            reaction: *r,
        })
        .collect();

    let mut members = Vec::with_capacity(combo.members.len());
    for (name, result) in &combo.members {
        let mut diagrams = Vec::with_capacity(Diagram::ALL.len());
        for diagram in Diagram::ALL {
            let (x, values): (Vec<f64>, Vec<f64>) = result.sample(diagram, samples)?.into_iter().unzip();
            let (min, max) = result.extremes(diagram);
            diagrams.push(DiagramData {
                diagram: diagram.label(),
                x,
                values,
                min,
                max,
            });
        }
        members.push(MemberResult {
            member: name.clone(),
            length: result.length,
            forces_i: result.forces_i(),
            forces_j: result.forces_j(),
            diagrams,
        });
    }

    Ok(ComboData {
        name: combo.name.clone(),
        node_displacements,
        reactions,
        members,
        statics: combo.statics.clone(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/analyze", post(analyze))
        .layer(cors);

    let addr: SocketAddr = std::env::var("FRAME_SOLVER_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .context("FRAME_SOLVER_ADDR is not a valid socket address")?;

    log::info!("Frame Solver Server listening on http://{}", addr);
    log::info!("  Health check: GET  /health");
    log::info!("  Analysis:     POST /api/v1/analyze");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
