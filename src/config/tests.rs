use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_quizsim_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("QUIZSIM_PORT");
        env::remove_var("QUIZSIM_BIND_ADDR");
        env::remove_var("QUIZSIM_MODEL");
        env::remove_var("QUIZSIM_MODEL_REVISION");
        env::remove_var("QUIZSIM_CACHE_DIR");
        env::remove_var("QUIZSIM_MAX_SEQ_LEN");
        env::remove_var("QUIZSIM_EMBEDDING_CACHE");
        env::remove_var("QUIZSIM_STUB");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 7000);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))
    );
    assert_eq!(config.model, "upskyy/bge-m3-korean");
    assert_eq!(config.revision, "main");
    assert!(config.cache_dir.is_none());
    assert_eq!(config.max_seq_len, 512);
    assert!(!config.stub);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "0.0.0.0:7000");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "127.0.0.1:3000");
}

#[test]
fn test_socket_addr_ipv6_is_bracketed() {
    let config = Config {
        bind_addr: IpAddr::V6(std::net::Ipv6Addr::LOCALHOST),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "[::1]:7000");
    assert!(config.socket_addr().parse::<std::net::SocketAddr>().is_ok());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_quizsim_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 7000);
    assert_eq!(config.model, "upskyy/bge-m3-korean");
    assert_eq!(config.embedding_cache_capacity, 4096);
}

#[test]
#[serial]
fn test_from_env_custom_port() {
    clear_quizsim_env();

    with_env_vars(&[("QUIZSIM_PORT", "3000")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.port, 3000);
    });
}

#[test]
#[serial]
fn test_from_env_zero_port_rejected() {
    clear_quizsim_env();

    with_env_vars(&[("QUIZSIM_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_unparseable_port() {
    clear_quizsim_env();

    with_env_vars(&[("QUIZSIM_PORT", "seven-thousand")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_ipv6_bind_addr() {
    clear_quizsim_env();

    with_env_vars(&[("QUIZSIM_BIND_ADDR", "::1")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(
            config.bind_addr,
            IpAddr::V6(std::net::Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    });
}

#[test]
#[serial]
fn test_from_env_invalid_bind_addr() {
    clear_quizsim_env();

    with_env_vars(&[("QUIZSIM_BIND_ADDR", "not-an-ip")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_model_and_cache_dir() {
    clear_quizsim_env();

    with_env_vars(
        &[
            ("QUIZSIM_MODEL", "sentence-transformers/all-MiniLM-L6-v2"),
            ("QUIZSIM_CACHE_DIR", "/var/cache/quizsim"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.model, "sentence-transformers/all-MiniLM-L6-v2");
            assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/quizsim")));
        },
    );
}

#[test]
#[serial]
fn test_from_env_blank_model_keeps_default() {
    clear_quizsim_env();

    with_env_vars(&[("QUIZSIM_MODEL", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.model, "upskyy/bge-m3-korean");
    });
}

#[test]
#[serial]
fn test_from_env_invalid_number() {
    clear_quizsim_env();

    with_env_vars(&[("QUIZSIM_MAX_SEQ_LEN", "lots")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                name: "QUIZSIM_MAX_SEQ_LEN",
                ..
            }
        ));
    });
}

#[test]
#[serial]
fn test_from_env_stub_spellings() {
    for (value, expected) in [("1", true), ("TRUE", true), ("on", true), ("no", false)] {
        clear_quizsim_env();
        with_env_vars(&[("QUIZSIM_STUB", value)], || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.stub, expected, "QUIZSIM_STUB={value}");
        });
    }
}

#[test]
#[serial]
fn test_from_env_invalid_stub() {
    clear_quizsim_env();

    with_env_vars(&[("QUIZSIM_STUB", "maybe")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { .. }));
    });
}

#[test]
fn test_validate_default() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_zero_max_seq_len() {
    let config = Config {
        max_seq_len: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroMaxSeqLen)
    ));
}

#[test]
fn test_validate_model_path_must_be_directory() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let config = Config {
        model: file.path().display().to_string(),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_validate_stub_ignores_model() {
    let config = Config {
        model: String::new(),
        stub: true,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_empty_model() {
    let config = Config {
        model: " ".to_string(),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::EmptyModel)));
}
