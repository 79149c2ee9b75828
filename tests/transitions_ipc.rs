use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

struct Sidecar {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    next_id: u64,
}

impl Sidecar {
    fn spawn(workspace_env: Option<&Path>) -> Self {
        let exe = env!("CARGO_BIN_EXE_hosteld");
        let mut cmd = Command::new(exe);
        cmd.env_remove("HOSTELD_WORKSPACE").env_remove("HOSTELD_SEED");
        if let Some(ws) = workspace_env {
            cmd.env("HOSTELD_WORKSPACE", ws);
        }
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn hosteld");
        let stdin = child.stdin.take().expect("child stdin");
        let stdout = child.stdout.take().expect("child stdout");
        Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
            next_id: 0,
        }
    }

    fn call(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        self.next_id += 1;
        let id = self.next_id.to_string();
        writeln!(
            self.stdin,
            "{}",
            json!({ "id": id, "method": method, "params": params })
        )
        .expect("write request");
        self.stdin.flush().expect("flush request");
        let mut line = String::new();
        self.reader.read_line(&mut line).expect("read response line");
        let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
        assert_eq!(value["id"], id.as_str());
        value
    }

    fn ok(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let resp = self.call(method, params);
        assert_eq!(resp["ok"], true, "{} failed: {}", method, resp);
        resp["result"].clone()
    }

    fn error_code(&mut self, method: &str, params: serde_json::Value) -> String {
        let resp = self.call(method, params);
        assert_eq!(resp["ok"], false, "{} unexpectedly succeeded: {}", method, resp);
        resp["error"]["code"].as_str().unwrap_or_default().to_string()
    }

    fn close(self) {
        let Sidecar { mut child, stdin, .. } = self;
        drop(stdin);
        let _ = child.wait();
    }
}

fn signed_in(workspace: &Path, username: &str, password: &str) -> Sidecar {
    let mut s = Sidecar::spawn(None);
    s.ok("workspace.select", json!({ "path": workspace.to_string_lossy() }));
    s.ok("auth.login", json!({ "username": username, "password": password }));
    s
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn find<'a>(rows: &'a serde_json::Value, id: &str) -> &'a serde_json::Value {
    rows.as_array()
        .expect("rows array")
        .iter()
        .find(|r| r["id"] == id)
        .unwrap_or_else(|| panic!("row {} not listed", id))
}

/// Rewrites one stored fee's owner, keeping the document revision.
fn reassign_fee(workspace: &Path, fee_id: &str, student_name: &str) {
    let conn = rusqlite::Connection::open(workspace.join("hostel.sqlite3")).expect("open db");
    let payload: String = conn
        .query_row("SELECT payload FROM documents WHERE key = 'fees'", [], |r| r.get(0))
        .expect("fees document");
    let mut fees: serde_json::Value = serde_json::from_str(&payload).expect("fees json");
    for fee in fees.as_array_mut().expect("fees array") {
        if fee["id"] == fee_id {
            fee["studentName"] = json!(student_name);
        }
    }
    conn.execute(
        "UPDATE documents SET payload = ? WHERE key = 'fees'",
        [serde_json::to_string(&fees).expect("encode fees")],
    )
    .expect("rewrite fees");
}

#[test]
fn student_pays_own_pending_fee() {
    let workspace = temp_dir("hosteld-tx-pay");
    let mut admin = signed_in(&workspace, "admin", "admin123");
    admin.ok("fees.list", json!({}));
    assert_eq!(admin.error_code("fees.pay", json!({ "id": "2" })), "forbidden");
    admin.close();

    reassign_fee(&workspace, "2", "Alex Thompson");

    let mut s = signed_in(&workspace, "student", "student123");
    let before = s.ok("fees.list", json!({}));
    assert_eq!(find(&before["fees"], "2")["status"], "Pending");

    let paid = s.ok("fees.pay", json!({ "id": "2" }));
    assert_eq!(paid["changed"], true);
    assert_eq!(paid["revision"], 2);

    let after = s.ok("fees.list", json!({}));
    let fee = find(&after["fees"], "2");
    assert_eq!(fee["status"], "Paid");
    assert_eq!(fee["paidDate"], today().as_str());
    assert_eq!(fee["paymentMethod"], "UPI");
    assert!(fee["transactionId"].as_str().map_or(false, |t| t.starts_with("TXN") && t.len() > 3));
    assert_eq!(fee["amount"], 12000);

    // Paying again is a no-op and does not write.
    let again = s.ok("fees.pay", json!({ "id": "2" }));
    assert_eq!(again["changed"], false);
    assert_eq!(again["revision"], 2);
    s.close();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn warden_rejects_block_request() {
    let workspace = temp_dir("hosteld-tx-reject");
    let mut s = signed_in(&workspace, "warden", "warden123");

    let rejected = s.ok("requests.reject", json!({ "id": "1" }));
    assert_eq!(rejected["changed"], true);

    let listed = s.ok("requests.list", json!({}));
    let req = find(&listed["requests"], "1");
    assert_eq!(req["status"], "Rejected");
    assert_eq!(req["processedBy"], "Warden");
    assert_eq!(req["processedDate"], today().as_str());
    assert_eq!(req["studentName"], "John Doe");
    assert_eq!(req["roomNumber"], "A-101");
    assert_eq!(req["submittedDate"], "2024-04-01");

    let missing = s.ok("requests.approve", json!({ "id": "nope" }));
    assert_eq!(missing["changed"], false);
    assert_eq!(s.error_code("requests.approve", json!({})), "bad_params");
    s.close();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn stale_expected_revision_is_a_conflict() {
    let workspace = temp_dir("hosteld-tx-conflict");
    let mut s = signed_in(&workspace, "admin", "admin123");

    let rev = s.ok("fees.list", json!({}))["revision"].as_i64().expect("revision");
    let first = s.ok("fees.applyPenalty", json!({ "id": "2", "amount": 200, "expectedRevision": rev }));
    assert_eq!(first["revision"], rev + 1);

    let stale = s.call("fees.applyPenalty", json!({ "id": "2", "amount": 200, "expectedRevision": rev }));
    assert_eq!(stale["ok"], false);
    assert_eq!(stale["error"]["code"], "conflict");
    assert_eq!(stale["error"]["details"]["expectedRevision"], rev);
    assert_eq!(stale["error"]["details"]["actualRevision"], rev + 1);

    let fee = s.ok("fees.list", json!({}));
    let fee = find(&fee["fees"], "2");
    assert_eq!(fee["status"], "Overdue");
    assert_eq!(fee["penalty"], 200);
    s.close();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn oversized_penalty_and_unpadded_dates_keep_the_daemon_consistent() {
    let workspace = temp_dir("hosteld-tx-inputs");
    let mut s = signed_in(&workspace, "admin", "admin123");

    let rev = s.ok("fees.list", json!({}))["revision"].clone();
    assert_eq!(
        s.error_code("fees.applyPenalty", json!({ "id": "3", "amount": u64::MAX })),
        "bad_params"
    );
    let fees = s.ok("fees.list", json!({}));
    assert_eq!(fees["revision"], rev);
    assert_eq!(find(&fees["fees"], "3")["penalty"], 500);

    let before = s.ok("attendance.list", json!({}))["records"].as_array().expect("records").len();
    s.ok("attendance.mark", json!({ "studentId": "ST002", "date": "2024-4-1", "status": "Present" }));
    let all = s.ok("attendance.list", json!({}));
    assert_eq!(all["records"].as_array().expect("records").len(), before);
    let day = s.ok("attendance.list", json!({ "date": "2024-4-1", "search": "Mike" }));
    let rows = day["records"].as_array().expect("records");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["date"], "2024-04-01");
    assert_eq!(rows[0]["status"], "Present");
    s.close();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn staff_transitions_update_records() {
    let workspace = temp_dir("hosteld-tx-staff");
    let mut s = signed_in(&workspace, "admin", "admin123");

    assert_eq!(
        s.error_code("rooms.setStatus", json!({ "id": "1", "status": "Available" })),
        "bad_params"
    );
    s.ok("rooms.setStatus", json!({ "id": "2", "status": "Reserved" }));
    let rooms = s.ok("rooms.list", json!({ "status": "Reserved" }));
    assert_eq!(rooms["rooms"].as_array().unwrap().len(), 1);

    s.ok("attendance.mark", json!({ "studentId": "ST003", "date": "2024-04-01", "status": "Present" }));
    let day = s.ok("attendance.list", json!({ "date": "2024-04-01", "search": "Alice" }));
    assert_eq!(day["records"][0]["status"], "Present");
    assert_eq!(day["records"][0]["method"], "Manual");

    let scanned = s.ok("attendance.scan", json!({ "studentId": "ST002", "date": "2024-04-02", "method": "Biometric" }));
    assert_eq!(scanned["changed"], true);
    let day = s.ok("attendance.list", json!({ "date": "2024-04-02" }));
    assert_eq!(day["records"][0]["studentName"], "Mike Smith");
    assert_eq!(day["records"][0]["location"], "Block A Entry");

    let unknown = s.ok("attendance.mark", json!({ "studentId": "ST999", "status": "Absent" }));
    assert_eq!(unknown["changed"], false);

    let created = s.ok(
        "students.create",
        json!({ "name": "Nair, Priya", "room": "C-104", "course": "Chemistry", "year": 1 }),
    );
    assert_eq!(created["id"], "STU006");
    s.ok("assets.remove", json!({ "id": "2" }));
    assert_eq!(s.ok("assets.list", json!({}))["assets"].as_array().unwrap().len(), 4);
    s.close();

    let mut m = signed_in(&workspace, "management", "mgmt123");
    for (method, params) in [
        ("fees.applyPenalty", json!({ "id": "2", "amount": 100 })),
        ("students.remove", json!({ "id": "STU001" })),
        ("rooms.setStatus", json!({ "id": "2", "status": "Available" })),
        ("settings.update", json!({ "wardenBlock": "Block C" })),
    ] {
        assert_eq!(m.error_code(method, params), "forbidden", "{}", method);
    }
    m.close();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn csv_export_quotes_fields_and_writes_file() {
    let workspace = temp_dir("hosteld-tx-csv");
    let out = workspace.join("out").join("students.csv");
    let mut s = signed_in(&workspace, "admin", "admin123");
    s.ok(
        "students.create",
        json!({ "name": "Nair, Priya", "room": "C-104", "course": "Chemistry \"Hons\"", "year": 2 }),
    );

    let exported = s.ok(
        "students.exportCsv",
        json!({ "search": "priya", "outPath": out.to_string_lossy() }),
    );
    assert_eq!(exported["fileName"], "students.csv");
    assert_eq!(exported["rowCount"], 1);
    let content = exported["content"].as_str().expect("csv content");
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("ID,Name,Email,Phone,Room,Block,Course,Year,Status,Fee Status")
    );
    assert_eq!(
        lines.next(),
        Some("STU006,\"Nair, Priya\",,,C-104,C,\"Chemistry \"\"Hons\"\"\",2,Active,Pending")
    );
    assert_eq!(std::fs::read_to_string(&out).expect("written csv"), content);

    s.close();
    let mut w = signed_in(&workspace, "warden", "warden123");
    let scoped = w.ok("students.exportCsv", json!({}));
    assert_eq!(scoped["rowCount"], 2);
    w.close();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn seeding_can_be_disabled_per_workspace() {
    let workspace = temp_dir("hosteld-tx-noseed");
    let mut s = signed_in(&workspace, "admin", "admin123");
    s.ok("settings.update", json!({ "seedFixtures": false }));
    assert_eq!(s.ok("settings.get", json!({}))["effectiveSeedFixtures"], false);
    assert_eq!(s.ok("fees.list", json!({}))["fees"], json!([]));
    assert_eq!(s.ok("students.list", json!({}))["stats"]["total"], 0);
    s.close();
    let _ = std::fs::remove_dir_all(workspace);
}
