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

//! End-to-end collection against the mock BMC.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use bmc_stats::cli::{CollectArgs, Scheme};
use bmc_stats::collect::{
    standard_collectors, CategoryCollector, PowerCollector, Scheduler, ThermalCollector,
};
use bmc_stats::error::Error;
use bmc_stats::mock::{router, MockController, MockLayout};
use bmc_stats::network::{discover_endpoints, ControllerClient};
use bmc_stats::sensor::{Category, Reading};
use bmc_stats::storage::{read_records, DatasetStore};
use bmc_stats::{AppConfig, CollectorConfig, CycleBudget};
use tempfile::tempdir;
use tokio::net::TcpListener;
use tokio::sync::watch;

async fn spawn_mock(controller: Arc<MockController>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(controller)).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr, output_dir: &Path) -> CollectorConfig {
    let args = CollectArgs {
        bmc_ip: addr.to_string(),
        bmc_username: "admin".to_string(),
        probe_every: 15,
        collect_for: Some(1),
        output_dir: output_dir.to_path_buf(),
        chassis: AppConfig::DEFAULT_CHASSIS.to_string(),
        scheme: Scheme::Http,
        request_timeout: 5,
    };
    CollectorConfig::from_args(&args, "secret".to_string()).unwrap()
}

#[tokio::test]
async fn test_discovery_partitions_psus() {
    let controller = Arc::new(MockController::new(MockLayout::default()));
    let addr = spawn_mock(controller).await;
    let dir = tempdir().unwrap();
    let config = config_for(addr, dir.path());
    let client = ControllerClient::new(&config).unwrap();

    let inventory = discover_endpoints(&client, &config).await.unwrap();
    assert_eq!(inventory.accelerator_tray().len(), 4);
    assert_eq!(inventory.compute_tray().len(), 2);
    assert_eq!(inventory.len(), 6);
    assert_eq!(inventory.compute_tray()[0].member_id(), "power_PWR_MB_PSU1");
}

#[tokio::test]
async fn test_discovery_failure_is_reported() {
    let controller = Arc::new(MockController::new(MockLayout {
        chassis: "Other_Chassis".to_string(),
        ..MockLayout::default()
    }));
    let addr = spawn_mock(controller).await;
    let dir = tempdir().unwrap();
    let config = config_for(addr, dir.path());
    let client = ControllerClient::new(&config).unwrap();

    let err = discover_endpoints(&client, &config).await.unwrap_err();
    assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 404));
}

#[tokio::test]
async fn test_requests_without_credentials_are_rejected() {
    let controller = Arc::new(MockController::new(MockLayout::default()));
    let addr = spawn_mock(controller).await;

    let response = reqwest::get(format!(
        "http://{addr}/redfish/v1/Chassis/Miramar_Sensor/Sensors"
    ))
    .await
    .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn test_failing_psu_is_isolated() {
    let controller = Arc::new(MockController::new(MockLayout {
        gpu_tray_psus: 3,
        cpu_tray_psus: 2,
        ..MockLayout::default()
    }));
    controller.fail_sensor("power_PWR_PDB_PSU2");
    let addr = spawn_mock(controller).await;
    let dir = tempdir().unwrap();
    let config = config_for(addr, dir.path());
    let client = ControllerClient::new(&config).unwrap();
    let inventory = Arc::new(discover_endpoints(&client, &config).await.unwrap());
    assert_eq!(inventory.len(), 5);

    let batch = PowerCollector::new(client, inventory).collect().await.unwrap();
    assert_eq!(batch.len(), 5);

    let (total, psus) = batch.split_last().unwrap();
    assert_eq!(total.name, AppConfig::TOTAL_POWER_NAME);
    let mut names: Vec<&str> = psus.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["CPU_TRAY_PSU1", "CPU_TRAY_PSU2", "GPU_TRAY_PSU1", "GPU_TRAY_PSU3"]
    );

    let sum: f64 = psus.iter().filter_map(|r| r.reading.value()).sum();
    let reported = total.reading.value().unwrap();
    assert!((reported - sum).abs() < 1e-6);
}

#[tokio::test]
async fn test_thermal_names_are_normalized() {
    let controller = Arc::new(MockController::new(MockLayout {
        fans: 2,
        temperatures: 3,
        ..MockLayout::default()
    }));
    controller.fail_sensor("SPD_FAN1_R");
    let addr = spawn_mock(controller).await;
    let dir = tempdir().unwrap();
    let config = config_for(addr, dir.path());
    let client = ControllerClient::new(&config).unwrap();

    let mut fans = ThermalCollector::fans(client.clone(), &config)
        .collect()
        .await
        .unwrap();
    fans.sort_by(|a, b| a.name.cmp(&b.name));
    let fan_names: Vec<&str> = fans.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(fan_names, vec!["FAN1 Front", "FAN1 Rear"]);
    assert!(fans[0].reading.value().is_some());
    assert_eq!(fans[1].reading, Reading::Unavailable);

    let mut temperatures = ThermalCollector::temperatures(client, &config)
        .collect()
        .await
        .unwrap();
    temperatures.sort_by(|a, b| a.name.cmp(&b.name));
    let temp_names: Vec<&str> = temperatures.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        temp_names,
        vec!["TEMP_CPU_TRAY_PSU1", "TEMP_GPU1", "TEMP_GPU_TRAY_PSU1"]
    );
}

#[tokio::test]
async fn test_linked_thermal_entries_are_followed() {
    let controller = Arc::new(MockController::new(MockLayout {
        temperatures: 4,
        inline_thermal: false,
        ..MockLayout::default()
    }));
    controller.fail_sensor("TEMP_GPU2");
    let addr = spawn_mock(controller).await;
    let dir = tempdir().unwrap();
    let config = config_for(addr, dir.path());
    let client = ControllerClient::new(&config).unwrap();

    let temperatures = ThermalCollector::temperatures(client, &config)
        .collect()
        .await
        .unwrap();
    assert_eq!(temperatures.len(), 3);
    assert!(temperatures.iter().all(|r| r.reading.value().is_some()));
    assert!(temperatures.iter().all(|r| r.name != "TEMP_GPU2"));
}

#[tokio::test]
async fn test_thermal_listing_failure_skips_only_thermal_categories() {
    let controller = Arc::new(MockController::new(MockLayout::default()));
    controller.set_thermal_failing(true);
    let addr = spawn_mock(controller).await;
    let dir = tempdir().unwrap();
    let config = config_for(addr, dir.path());
    let client = ControllerClient::new(&config).unwrap();
    let inventory = Arc::new(discover_endpoints(&client, &config).await.unwrap());

    let fans = ThermalCollector::fans(client.clone(), &config).collect().await;
    assert!(matches!(fans, Err(Error::Status { .. })));

    let store = DatasetStore::new(dir.path());
    let (_tx, rx) = watch::channel(false);
    let scheduler = Scheduler::new(
        config.budget,
        store.clone(),
        standard_collectors(&client, inventory, &config),
        rx,
    );
    assert!(scheduler.run_cycle().await);

    assert_eq!(read_records(&store.path_for(Category::Power)).len(), 7);
    assert!(!store.path_for(Category::Fan).exists());
    assert!(!store.path_for(Category::Temperature).exists());
}

#[tokio::test]
async fn test_cycles_accumulate_into_datasets() {
    let controller = Arc::new(MockController::new(MockLayout::default()));
    let addr = spawn_mock(controller).await;
    let dir = tempdir().unwrap();
    let config = config_for(addr, dir.path());
    let client = ControllerClient::new(&config).unwrap();
    let inventory = Arc::new(discover_endpoints(&client, &config).await.unwrap());

    let store = DatasetStore::new(dir.path());
    let (_tx, rx) = watch::channel(false);
    let scheduler = Scheduler::new(
        CycleBudget::from_secs(15, Some(30)).unwrap(),
        store.clone(),
        standard_collectors(&client, inventory, &config),
        rx,
    );
    assert!(scheduler.run_cycle().await);
    assert!(scheduler.run_cycle().await);

    let power = read_records(&store.path_for(Category::Power));
    assert_eq!(power.len(), 2 * 7);
    assert_eq!(power[6]["Name"], AppConfig::TOTAL_POWER_NAME);
    assert_eq!(power[13]["Name"], AppConfig::TOTAL_POWER_NAME);
    assert_eq!(read_records(&store.path_for(Category::Fan)).len(), 2 * 8);
    assert_eq!(read_records(&store.path_for(Category::Temperature)).len(), 2 * 6);

    let summary = bmc_stats::summary::summarize(dir.path(), 1).unwrap();
    assert!(summary.period.is_some());
    assert!(summary.peak_total_power.unwrap() > 0.0);
}
