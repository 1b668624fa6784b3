//! Test helpers for writing optimize requests into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Value, json};
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write fixture file");
}

pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Three orders north-east of central Berlin and one van, in wire format.
pub(super) fn berlin_request() -> Value {
    json!({
        "date": "2024-05-06",
        "orders": [
            {
                "id": 1,
                "number": "ORD-001",
                "pickup": { "latitude": 52.5200, "longitude": 13.4050 },
                "delivery": { "latitude": 52.5300, "longitude": 13.4200 },
                "weight_kg": 120,
                "requested_date": "2024-05-06"
            },
            {
                "id": 2,
                "pickup": { "latitude": 52.5250, "longitude": 13.4100 },
                "delivery": { "latitude": 52.5350, "longitude": 13.4250 },
                "weight_kg": 80,
                "requested_date": "2024-05-06",
                "priority": "urgent"
            },
            {
                "id": 3,
                "pickup": { "latitude": 52.5400, "longitude": 13.4100 },
                "delivery": { "latitude": 52.5500, "longitude": 13.4300 },
                "weight_kg": 200,
                "requested_date": "2024-05-06",
                "status": "pending"
            }
        ],
        "vehicles": [
            { "id": 7, "license_plate": "B-FR 1007", "capacity_kg": 1500 }
        ]
    })
}

pub(super) fn write_request(path: &Utf8Path, request: &Value) {
    let payload = serde_json::to_vec_pretty(request).expect("serialize request");
    write_utf8(path, &payload);
}
