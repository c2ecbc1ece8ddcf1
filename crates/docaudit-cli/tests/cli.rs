use std::fs;
use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;
use pretty_assertions::assert_eq;

const IT_RETURN: &str = "INDIAN INCOME TAX RETURN ACKNOWLEDGEMENT\n\
                         Assessment Year: 2024-25\n\
                         Total Income: 6,00,000\n";

const PAYSLIP: &str = "ACME Pvt Ltd\nPayslip\nPay Period: March 2023\nNet Pay: Rs. 45,000\n";

/// The binary with an isolated configuration directory.
fn docaudit(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docaudit").unwrap();
    cmd.env("XDG_CONFIG_HOME", home).env("HOME", home);
    cmd
}

/// A one-page PDF with each line drawn below the previous one.
fn text_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("Td", vec![0.into(), (-30).into()]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

#[test]
fn audit_text_from_stdin_as_json() {
    let home = tempfile::tempdir().unwrap();

    docaudit(home.path())
        .args(["audit-text", "--type", "IT Return", "--period", "2024-2025"])
        .write_stdin(IT_RETURN)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"document_type\": \"IT Return\""))
        .stdout(predicate::str::contains("\"month_year\": \"2024-2025\""))
        .stdout(predicate::str::contains("\"estimated_monthly_salary\": \"50000.00\""));
}

#[test]
fn audit_text_file_as_text() {
    let home = tempfile::tempdir().unwrap();
    let input = home.path().join("march.txt");
    fs::write(&input, PAYSLIP).unwrap();

    docaudit(home.path())
        .args(["audit-text", "--type", "payslip", "--period", "03/2023", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Document Type: Payslip\nMonth/Year: March 2023\nValidation: Pass\nEstimated Monthly Salary: 45000",
        ));
}

#[test]
fn type_mismatch_reports_not_applicable() {
    let home = tempfile::tempdir().unwrap();

    docaudit(home.path())
        .args(["audit-text", "--type", "IT Return", "--period", "2024-25", "--format", "csv"])
        .write_stdin(PAYSLIP)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<stdin>,Payslip,Not Applicable,FailTypeMismatch,Not Applicable",
        ));
}

#[test]
fn invalid_period_is_rejected_up_front() {
    let home = tempfile::tempdir().unwrap();

    docaudit(home.path())
        .args(["audit-text", "--type", "IT Return", "--period", "2024-2026"])
        .write_stdin(IT_RETURN)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid period"));
}

#[test]
fn report_gets_one_row_per_run() {
    let home = tempfile::tempdir().unwrap();
    let report = home.path().join("summary.csv");

    for _ in 0..2 {
        docaudit(home.path())
            .args(["audit-text", "--type", "ITR", "--period", "AY 2024-25", "--name", "itr.pdf"])
            .arg("--report")
            .arg(&report)
            .write_stdin(IT_RETURN)
            .assert()
            .success();
    }

    let content = fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Filename,Document Type,Month/Year,Validation,Estimated Monthly Salary",
            "itr.pdf,IT Return,2024-2025,Pass,50000.00",
            "itr.pdf,IT Return,2024-2025,Pass,50000.00",
        ]
    );
}

#[test]
fn batch_isolates_failures() {
    let home = tempfile::tempdir().unwrap();
    let docs = home.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::create_dir(docs.join("nested")).unwrap();
    fs::write(docs.join("notes.txt"), PAYSLIP).unwrap();
    fs::write(docs.join("broken.pdf"), "not a pdf").unwrap();
    let report = home.path().join("summary.csv");

    docaudit(home.path())
        .args(["batch", "--type", "Payslip", "--period", "March 2023"])
        .arg(&docs)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 passed, 0 did not pass, 2 failed"))
        .stdout(predicate::str::contains("notes.txt: unsupported file type"))
        .stdout(predicate::str::contains("broken.pdf: text extraction failed"));

    assert!(!report.exists());
}

#[test]
fn batch_audits_pdfs_concurrently() {
    let home = tempfile::tempdir().unwrap();
    let docs = home.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(
        docs.join("march.pdf"),
        text_pdf(&["Payslip", "Pay Period: March 2023", "Net Pay: 45000"]),
    )
    .unwrap();
    fs::write(
        docs.join("april.pdf"),
        text_pdf(&["Payslip", "Pay Period: April 2023", "Net Pay: 45000"]),
    )
    .unwrap();
    fs::write(
        docs.join("itr.pdf"),
        text_pdf(&["Income Tax Return", "Assessment Year 2024-25", "Total Income 600000"]),
    )
    .unwrap();
    fs::write(docs.join("notes.txt"), PAYSLIP).unwrap();
    let report = home.path().join("summary.csv");

    docaudit(home.path())
        .args(["batch", "--type", "Payslip", "--period", "March 2023", "-j", "3"])
        .arg(&docs)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 4 files"))
        .stdout(predicate::str::contains("1 passed, 2 did not pass, 1 failed"))
        .stdout(predicate::str::contains("notes.txt: unsupported file type"));

    // Rows arrive in completion order
    let content = fs::read_to_string(&report).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("Filename,Document Type,Month/Year,Validation,Estimated Monthly Salary")
    );
    let mut rows: Vec<&str> = lines.collect();
    rows.sort();
    assert_eq!(
        rows,
        vec![
            "april.pdf,Payslip,April 2023,FailPeriodMismatch,Not Applicable",
            "itr.pdf,IT Return,Not Applicable,FailTypeMismatch,Not Applicable",
            "march.pdf,Payslip,March 2023,Pass,45000",
        ]
    );
}

#[test]
fn explain_shows_period_source() {
    let home = tempfile::tempdir().unwrap();

    docaudit(home.path())
        .args(["audit-text", "--type", "Payslip", "--period", "March 2023", "--explain"])
        .write_stdin(PAYSLIP)
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Period March 2023 from \"March 2023\" at bytes 33..43 (confidence 0.95)",
        ));
}

#[test]
fn config_init_and_get() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("docaudit.json");

    docaudit(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();

    docaudit(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "backend.base_url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:11434"));
}
