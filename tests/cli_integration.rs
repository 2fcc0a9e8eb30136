use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// Every test redirects both stores into a fresh temp dir so nothing
// touches the real per-user config, and unauthenticated tests run with
// no credential on disk at all.
fn hackmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hackmd").unwrap();
    cmd.env("HACKMD_CONFIG_DIR", home.path().join("config"))
        .env("HACKMD_TEMPLATES_DIR", home.path().join("templates"));
    cmd
}

#[test]
fn test_note_list_requires_auth() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["note", "list"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Not authenticated"));
}

#[test]
fn test_team_list_requires_auth() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["team", "list"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Not authenticated"));
}

#[test]
fn test_note_create_requires_auth() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["note", "create", "--title", "Draft"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Not authenticated"));
}

#[test]
fn test_status_requires_auth() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["auth", "status"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Not authenticated"));
}

#[test]
fn test_config_set_requires_login() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["config", "set", "default.team", "backend"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Not configured"));
}

#[test]
fn test_login_rejects_empty_token() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["auth", "login", "--token", "   "])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Token cannot be empty"));
}

#[test]
fn test_login_then_status_masks_token() {
    let home = TempDir::new().unwrap();
    let token = "abcdefgh0123456789wxyz";

    // verification against the real API is best-effort and must not
    // fail the command even without network access
    hackmd(&home)
        .args(["auth", "login", "--token", token, "--profile", "work"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Token saved to profile 'work'"));

    hackmd(&home)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Active profile: work"))
        .stdout(predicates::str::contains("abcdefgh...wxyz"))
        .stdout(predicates::str::contains(token).not());
}

#[test]
fn test_config_set_after_login() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["auth", "login", "--token", "some-token-123456"])
        .assert()
        .success();

    hackmd(&home)
        .args(["config", "set", "default.team", "backend"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Set default team to: backend"));
}

#[test]
fn test_template_init_seeds_builtins_once() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["template", "init"])
        .assert()
        .success()
        .stdout(predicates::str::contains("daily-journal"))
        .stdout(predicates::str::contains("weekly-review"));

    hackmd(&home)
        .args(["template", "init"])
        .assert()
        .success()
        .stdout(predicates::str::contains("already present"));
}

#[test]
fn test_template_list_after_init() {
    let home = TempDir::new().unwrap();

    hackmd(&home).args(["template", "init"]).assert().success();

    hackmd(&home)
        .args(["template", "list"])
        .assert()
        .success()
        .stdout("bug-report\ndaily-journal\nmeeting-notes\nproject-readme\nweekly-review\n");
}

#[test]
fn test_template_list_empty() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["template", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("No templates found"));
}

#[test]
fn test_template_create_from_file() {
    let home = TempDir::new().unwrap();
    let source = home.path().join("standup.md");
    std::fs::write(&source, "# Standup {{date}}\n\n- {{team}}\n").unwrap();

    hackmd(&home)
        .args(["template", "create", "standup"])
        .arg("--file")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicates::str::contains("Template saved to"));

    hackmd(&home)
        .args(["template", "list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("standup"));

    // stored byte-for-byte
    let stored = home.path().join("templates").join("standup.md");
    assert_eq!(
        std::fs::read_to_string(stored).unwrap(),
        "# Standup {{date}}\n\n- {{team}}\n"
    );
}

#[test]
fn test_template_create_from_stdin() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["template", "create", "scratch"])
        .write_stdin("just {{one}} line")
        .assert()
        .success();

    let stored = home.path().join("templates").join("scratch.md");
    assert_eq!(std::fs::read_to_string(stored).unwrap(), "just {{one}} line");
}

#[test]
fn test_note_create_with_missing_template() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["auth", "login", "--token", "some-token-123456"])
        .assert()
        .success();

    // template lookup happens before any note API call
    hackmd(&home)
        .args([
            "note", "create", "--title", "X", "--template", "no-such-template",
        ])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Template not found"));
}

#[test]
fn test_note_create_rejects_malformed_var() {
    let home = TempDir::new().unwrap();

    hackmd(&home)
        .args(["auth", "login", "--token", "some-token-123456"])
        .assert()
        .success();

    hackmd(&home)
        .args([
            "note",
            "create",
            "--title",
            "X",
            "--template",
            "meeting-notes",
            "--var",
            "not-a-pair",
        ])
        .assert()
        .failure()
        .stderr(predicates::str::contains("expected KEY=VALUE"));
}
