use std::ffi::OsString;
use std::fs;

use tandem_core::cli::Invocation;
use tandem_core::config::{Config, resolve_data_dir};
use tempfile::tempdir;

#[test]
fn rc_file_overrides_defaults_and_follows_includes() {
    let temp = tempdir().expect("tempdir");

    let extra = temp.path().join("extra.rc");
    fs::write(&extra, "confirmation = off\n").expect("write extra rc");

    let base = temp.path().join("tandemrc");
    fs::write(
        &base,
        "# base config\n\
         data.location = /tmp/tandem-data\n\
         default.command = context  # trailing comment\n\
         include extra.rc\n",
    )
    .expect("write base rc");

    let cfg = Config::load(Some(base.as_path())).expect("load config");

    assert_eq!(cfg.get("data.location").as_deref(), Some("/tmp/tandem-data"));
    assert_eq!(cfg.get("default.command").as_deref(), Some("context"));
    assert_eq!(cfg.get_bool("confirmation"), Some(false));
    // Untouched keys keep their defaults.
    assert_eq!(cfg.get("color").as_deref(), Some("on"));
    assert_eq!(cfg.loaded_files.len(), 2);
}

#[test]
fn cli_overrides_win_and_strip_the_rc_prefix() {
    let temp = tempdir().expect("tempdir");
    let base = temp.path().join("tandemrc");
    fs::write(&base, "color = on\n").expect("write rc");

    let mut cfg = Config::load(Some(base.as_path())).expect("load config");
    cfg.apply_overrides(vec![
        ("rc.color".to_string(), "off".to_string()),
        ("confirmation".to_string(), "off".to_string()),
    ]);

    assert_eq!(cfg.get("color").as_deref(), Some("off"));
    assert_eq!(cfg.get_bool("confirmation"), Some(false));
}

#[test]
fn resolve_data_dir_prefers_the_explicit_override() {
    let temp = tempdir().expect("tempdir");
    let base = temp.path().join("tandemrc");
    let from_config = temp.path().join("from-config");
    fs::write(&base, format!("data.location = {}\n", from_config.display()))
        .expect("write rc");

    let cfg = Config::load(Some(base.as_path())).expect("load config");

    let override_dir = temp.path().join("explicit");
    let resolved =
        resolve_data_dir(&cfg, Some(override_dir.as_path())).expect("resolve with override");
    assert_eq!(resolved, override_dir);
    assert!(override_dir.exists());

    let resolved = resolve_data_dir(&cfg, None).expect("resolve from config");
    assert_eq!(resolved, from_config);
    assert!(from_config.exists());
}

#[test]
fn empty_invocation_runs_the_default_command() {
    let temp = tempdir().expect("tempdir");
    let base = temp.path().join("tandemrc");
    fs::write(&base, "default.command = context\n").expect("write rc");

    let cfg = Config::load(Some(base.as_path())).expect("load config");
    let inv = Invocation::parse(&cfg, vec![]).expect("parse empty invocation");

    assert_eq!(inv.command, "context");
    assert!(inv.args.is_empty());
}

#[test]
fn command_abbreviations_expand_when_unambiguous() {
    let temp = tempdir().expect("tempdir");
    let base = temp.path().join("tandemrc");
    fs::write(&base, "").expect("write rc");
    let cfg = Config::load(Some(base.as_path())).expect("load config");

    let inv = Invocation::parse(
        &cfg,
        vec![OsString::from("ad"), OsString::from("buy milk")],
    )
    .expect("parse abbreviated add");
    assert_eq!(inv.command, "add");
    assert_eq!(inv.args, vec!["buy milk".to_string()]);

    // "d" could be done or delete.
    let err = Invocation::parse(&cfg, vec![OsString::from("d")]);
    assert!(err.is_err());
}
