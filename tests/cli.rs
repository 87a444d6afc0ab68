use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn receipt(fecha_pago: &str, totals: [&str; 5]) -> String {
    let [percepciones, sueldos, exento, gravado, retenidos] = totals;
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4" xmlns:nomina12="http://www.sat.gob.mx/nomina12" Version="4.0">
  <cfdi:Complemento>
    <nomina12:Nomina Version="1.2" FechaPago="{fecha_pago}" TotalPercepciones="{percepciones}">
      <nomina12:Percepciones TotalSueldos="{sueldos}" TotalExento="{exento}" TotalGravado="{gravado}"/>
      <nomina12:Deducciones TotalImpuestosRetenidos="{retenidos}"/>
    </nomina12:Nomina>
  </cfdi:Complemento>
</cfdi:Comprobante>"#
    )
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn cfdi_nomina(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cfdi-nomina").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg(data_dir)
        .args(["--output-format", "plain", "--quiet"]);
    cmd
}

#[test]
fn prints_totals_for_a_single_receipt() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "enero/recibo.xml",
        &receipt("2024-01-15", ["15000.50", "12000.00", "1000.00", "11000.00", "1800.25"]),
    );

    cfdi_nomina(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid CFDIs: 1"))
        .stdout(predicate::str::contains(
            "Percepciones: $15,000.50\nSueldos: $12,000.00\nExento: $1,000.00\nGravado: $11,000.00\nImpuestos Retenidos: $1,800.25",
        ));
}

#[test]
fn malformed_document_is_skipped_and_logged() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.xml", &receipt("2024-01-15", ["100", "90", "10", "80", "5"]));
    write(temp_dir.path(), "b.xml", &receipt("2024-01-31", ["100", "90", "10", "80", "5"]));
    write(temp_dir.path(), "broken.xml", "<cfdi:Comprobante><sin-cerrar>");

    cfdi_nomina(temp_dir.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Valid CFDIs: 2"))
        .stdout(predicate::str::contains("Percepciones: $200.00"))
        .stdout(predicate::str::contains("Documents with errors: 1"))
        .stderr(predicate::str::contains("error parsing CFDI"))
        .stderr(predicate::str::contains("broken.xml"));
}

#[test]
fn empty_directory_reports_no_data() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "notas.txt", "sin recibos");

    cfdi_nomina(temp_dir.path())
        .assert()
        .code(3)
        .stdout(predicate::str::contains("No valid CFDI data found."))
        .stdout(predicate::str::contains("$").not());
}

#[test]
fn missing_directory_reports_no_data() {
    let temp_dir = TempDir::new().unwrap();

    cfdi_nomina(&temp_dir.path().join("data"))
        .assert()
        .code(3)
        .stdout(predicate::str::contains("No valid CFDI data found."));
}

#[test]
fn receipts_from_other_payroll_namespaces_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let foreign = receipt("2024-01-15", ["100", "90", "10", "80", "5"])
        .replace("http://www.sat.gob.mx/nomina12", "http://www.sat.gob.mx/nomina");
    write(temp_dir.path(), "viejo.xml", &foreign);

    cfdi_nomina(temp_dir.path())
        .assert()
        .code(3)
        .stdout(predicate::str::contains("No valid CFDI data found."));
}

#[test]
fn json_report_contains_summary() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.xml", &receipt("2024-03-15", ["10.10", "10", "0.10", "10", "1"]));

    let output = Command::cargo_bin("cfdi-nomina")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg(temp_dir.path())
        .args(["--output-format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files_found"], 1);
    assert_eq!(report["summary"]["documents"], 1);
    assert_eq!(report["summary"]["period"]["first"], "2024-03-15");
}

#[test]
fn dry_run_lists_candidates_without_parsing() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "2024/recibo.xml", "<no es xml");

    Command::cargo_bin("cfdi-nomina")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg(temp_dir.path())
        .args(["--output-format", "plain", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recibo.xml"))
        .stdout(predicate::str::contains("Valid CFDIs").not());
}

#[test]
fn generate_config_writes_sample() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("cfdi-nomina.toml");

    Command::cargo_bin("cfdi-nomina")
        .unwrap()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[scan]"));
    assert!(content.contains("currency_symbol"));
}

#[test]
fn config_file_changes_currency_symbol() {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path().join("data");
    write(&data, "a.xml", &receipt("2024-01-15", ["1234.5", "1000", "0", "1000", "100"]));

    let config_path = temp_dir.path().join("custom.toml");
    fs::write(
        &config_path,
        r#"
[scan]
extensions = ["xml"]
max_file_size = 1048576
max_depth = 8
exclude_dirs = []
exclude_patterns = []

[report]
currency_symbol = "MXN "
show_period = false
"#,
    )
    .unwrap();

    cfdi_nomina(&data)
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Percepciones: MXN 1,234.50"))
        .stdout(predicate::str::contains("Periodo").not());
}

#[test]
fn plain_stdout_is_only_the_report_without_quiet() {
    let temp_dir = TempDir::new().unwrap();

    Command::cargo_bin("cfdi-nomina")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg(temp_dir.path())
        .args(["--output-format", "plain"])
        .assert()
        .code(3)
        .stdout("No valid CFDI data found.\n")
        .stderr(predicate::str::contains("STARTING: Scanning"));
}

#[test]
fn plain_totals_are_not_preceded_by_status_lines() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.xml", &receipt("2024-01-15", ["100", "90", "10", "80", "5"]));

    Command::cargo_bin("cfdi-nomina")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg(temp_dir.path())
        .args(["--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Valid CFDIs: 1\n"));
}

#[test]
fn default_scan_reaches_hidden_and_build_named_directories() {
    let temp_dir = TempDir::new().unwrap();
    let content = receipt("2024-01-15", ["100", "90", "10", "80", "5"]);
    write(temp_dir.path(), "a.xml", &content);
    write(temp_dir.path(), "target/b.xml", &content);
    write(temp_dir.path(), ".hist/c.xml", &content);

    cfdi_nomina(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid CFDIs: 3"))
        .stdout(predicate::str::contains("Percepciones: $300.00"));
}

#[test]
fn exponent_and_signed_amounts_fail_only_their_document() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.xml", &receipt("2024-01-15", ["100", "90", "10", "80", "5"]));
    write(
        temp_dir.path(),
        "exponente.xml",
        &receipt("2024-01-15", ["100", "90", "1E+3000000", "80", "5"]),
    );
    write(
        temp_dir.path(),
        "negativo.xml",
        &receipt("2024-01-15", ["-100", "90", "10", "80", "5"]),
    );

    cfdi_nomina(temp_dir.path())
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Valid CFDIs: 1"))
        .stdout(predicate::str::contains("Percepciones: $100.00"))
        .stdout(predicate::str::contains("Documents with errors: 2"))
        .stderr(predicate::str::contains("exponente.xml"))
        .stderr(predicate::str::contains("negativo.xml"));
}
