// Copyright 2025 Lablup Inc. and Jeongkyu Shin
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

use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::mock::controller::MockController;
use crate::mock::Args;

pub type SharedController = Arc<MockController>;

type JsonResult = Result<Json<Value>, StatusCode>;

/// Routes of the mock Redfish service.
pub fn router(controller: SharedController) -> Router {
    Router::new()
        .route("/redfish/v1/Chassis/{chassis}/Sensors", get(sensor_directory))
        .route("/redfish/v1/Chassis/{chassis}/Sensors/{id}", get(sensor))
        .route("/redfish/v1/Chassis/{chassis}/Thermal", get(thermal))
        .route(
            "/redfish/v1/Chassis/{chassis}/Thermal/{group}/{id}",
            get(thermal_member),
        )
        .layer(middleware::from_fn(require_authorization))
        .with_state(controller)
        .layer(TraceLayer::new_for_http())
}

async fn require_authorization(request: Request, next: Next) -> Response {
    if request.headers().contains_key(header::AUTHORIZATION) {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, "Authorization required").into_response()
    }
}

async fn sensor_directory(
    State(controller): State<SharedController>,
    Path(chassis): Path<String>,
) -> JsonResult {
    controller.sensor_directory(&chassis).map(Json)
}

async fn sensor(
    State(controller): State<SharedController>,
    Path((chassis, id)): Path<(String, String)>,
) -> JsonResult {
    controller.sensor(&chassis, &id).map(Json)
}

async fn thermal(
    State(controller): State<SharedController>,
    Path(chassis): Path<String>,
) -> JsonResult {
    controller.thermal(&chassis).map(Json)
}

async fn thermal_member(
    State(controller): State<SharedController>,
    Path((chassis, group, id)): Path<(String, String, String)>,
) -> JsonResult {
    controller.thermal_member(&chassis, &group, &id).map(Json)
}

/// Build the controller described by `args` and serve it until the process
/// is stopped.
pub async fn start_server(args: Args) -> std::io::Result<()> {
    let controller = Arc::new(MockController::new(args.layout()));
    for id in &args.failing_sensors {
        controller.fail_sensor(id.as_str());
    }
    controller.set_thermal_failing(args.fail_thermal);

    let listener = TcpListener::bind(args.bind).await?;
    info!(
        "Mock BMC for chassis {} listening on http://{}",
        args.chassis,
        listener.local_addr()?
    );
    axum::serve(listener, router(controller)).await
}
