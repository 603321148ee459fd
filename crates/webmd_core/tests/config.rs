use std::path::PathBuf;

use webmd_core::{default_images_dir, RunConfig, TransportMode};

#[test]
fn images_dir_follows_output_stem() {
    assert_eq!(
        default_images_dir(&PathBuf::from("docs/guide.md")),
        PathBuf::from("images/guide")
    );
    assert_eq!(
        default_images_dir(&PathBuf::from("notes.v2.md")),
        PathBuf::from("images/notes.v2")
    );
}

#[test]
fn defaults_match_documented_values() {
    let config = RunConfig::with_defaults("https://example.com/a");
    assert_eq!(config.out, PathBuf::from("install-ubuntu-server.md"));
    assert_eq!(config.images_dir, PathBuf::from("images/install-ubuntu-server"));
    assert!(config.toc);
    assert!(config.frontmatter);
    assert!(!config.debug);
    assert_eq!(config.transport, TransportMode::Auto);
}

#[test]
fn transport_mode_parses_case_insensitively() {
    assert_eq!("AUTO".parse::<TransportMode>(), Ok(TransportMode::Auto));
    assert_eq!("library".parse::<TransportMode>(), Ok(TransportMode::Library));
    assert_eq!(
        "External-Process".parse::<TransportMode>(),
        Ok(TransportMode::ExternalProcess)
    );
}

#[test]
fn invalid_transport_names_the_value() {
    let err = "carrier-pigeon".parse::<TransportMode>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid --transport value: carrier-pigeon (use auto|library|external-process)"
    );
}
