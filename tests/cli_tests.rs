use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmp_synth() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("cmp-synth").unwrap()
}

#[test]
fn test_generate_into_directory() {
    let temp_dir = TempDir::new().unwrap();

    cmp_synth()
        .arg("generate")
        .arg("--target")
        .arg("com.example.FooImpl")
        .arg("--base")
        .arg("com.example.Foo")
        .arg("--surrogate-identity")
        .arg("--out")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated com.example.FooImpl"));

    let class_path = temp_dir.path().join("com/example/FooImpl.class");
    let bytes = std::fs::read(&class_path).unwrap();
    assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
}

#[test]
fn test_generate_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("FooImpl.class");

    let assert = cmp_synth()
        .args(["--json", "generate", "--target", "com.example.FooImpl"])
        .args(["--base", "com.example.Foo", "--out"])
        .arg(&out)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["class"], "com.example.FooImpl");
    assert_eq!(json["bytes"], std::fs::metadata(&out).unwrap().len());
    assert_eq!(json["sha256"].as_str().unwrap().len(), 64);
}

#[test]
fn test_generate_from_base_spec_then_inspect() {
    let temp_dir = TempDir::new().unwrap();
    let spec = temp_dir.path().join("account.json");
    std::fs::write(
        &spec,
        r#"{
            "name": "com.example.Account",
            "methods": [{"name": "ejbCreate", "parameters": ["java.lang.String", "int"]}],
            "unknown_primary_key": true
        }"#,
    )
    .unwrap();
    let out = temp_dir.path().join("AccountImpl.class");

    cmp_synth()
        .args(["generate", "--target", "com.example.AccountImpl", "--base-spec"])
        .arg(&spec)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let assert = cmp_synth()
        .args(["inspect", "--json"])
        .arg(&out)
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["super_class"], "com/example/Account");
    assert_eq!(json["interfaces"][0], "javax/ejb/EntityBean");
    assert_eq!(json["fields"][0]["name"], "OpenEJB_pk");
    let methods = json["methods"].as_array().unwrap();
    assert!(methods
        .iter()
        .any(|m| m["name"] == "ejbPostCreate" && m["descriptor"] == "(Ljava/lang/String;I)V"));

    cmp_synth()
        .args(["inspect", "--code"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("extends com.example.Account"))
        .stdout(predicate::str::contains("public java.lang.Long OpenEJB_pk;"))
        .stdout(predicate::str::contains("invokespecial"));
}

#[test]
fn test_surrogate_identity_can_be_forced_off() {
    let temp_dir = TempDir::new().unwrap();
    let spec = temp_dir.path().join("order.json");
    std::fs::write(
        &spec,
        r#"{"name": "com.example.Order", "unknown_primary_key": true}"#,
    )
    .unwrap();
    let out = temp_dir.path().join("OrderImpl.class");

    cmp_synth()
        .args(["generate", "--target", "com.example.OrderImpl", "--base-spec"])
        .arg(&spec)
        .arg("--surrogate-identity=false")
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let assert = cmp_synth()
        .args(["--json", "inspect"])
        .arg(&out)
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["fields"].as_array().unwrap().len(), 0);
}

#[test]
fn test_generate_from_request_file() {
    let temp_dir = TempDir::new().unwrap();
    let request = temp_dir.path().join("request.json");
    std::fs::write(
        &request,
        r#"{"target": "com.example.OrderImpl", "base": {"name": "com.example.Order"}}"#,
    )
    .unwrap();

    cmp_synth()
        .arg("generate")
        .arg("--request")
        .arg(&request)
        .arg("--out")
        .arg(temp_dir.path())
        .assert()
        .success();

    assert!(temp_dir.path().join("com/example/OrderImpl.class").exists());
}

#[test]
fn test_generate_self_inheritance_fails() {
    let temp_dir = TempDir::new().unwrap();

    cmp_synth()
        .args(["generate", "--target", "com.example.Foo", "--base", "com.example.Foo"])
        .arg("--out")
        .arg(temp_dir.path().join("Foo.class"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid target name"));

    assert!(!temp_dir.path().join("Foo.class").exists());
}

#[test]
fn test_generate_requires_a_base() {
    let temp_dir = TempDir::new().unwrap();

    cmp_synth()
        .args(["generate", "--target", "com.example.FooImpl", "--out"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--base"));
}

#[test]
fn test_inspect_rejects_non_class_file() {
    let temp_dir = TempDir::new().unwrap();
    let bogus = temp_dir.path().join("bogus.class");
    std::fs::write(&bogus, b"not a class").unwrap();

    cmp_synth()
        .arg("inspect")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a valid class file"));
}
